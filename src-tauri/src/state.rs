//! Application state management
use std::sync::Arc;
use tauri::AppHandle;

use wavebox_core::{AutofillService, Config, Result, RpcRouter, SessionId, ShellBindings, Wavebox};

use crate::guests::{GuestEntry, GuestRegistry};
use crate::shell::TauriShell;

pub struct AppState {
    wavebox: Wavebox,
    router: RpcRouter,
    autofill: AutofillService,
    guests: GuestRegistry,
}

impl AppState {
    pub fn new(app: &AppHandle) -> Result<Self> {
        let wavebox = Wavebox::new(Config::default())?;
        let guests = GuestRegistry::new();
        let shell = Arc::new(TauriShell::new(app.clone(), guests.clone()));

        let router = wavebox.router(ShellBindings {
            host: shell.clone(),
            links: shell.clone(),
            shell: shell.clone(),
            relauncher: shell.clone(),
        });
        // No OS keychain backend is bundled
        let autofill = wavebox.autofill_service(None, shell);

        Ok(Self {
            wavebox,
            router,
            autofill,
            guests,
        })
    }

    pub fn wavebox(&self) -> &Wavebox {
        &self.wavebox
    }

    pub fn router(&self) -> &RpcRouter {
        &self.router
    }

    pub fn autofill(&self) -> &AutofillService {
        &self.autofill
    }

    pub fn guests(&self) -> &GuestRegistry {
        &self.guests
    }

    /// Session for a guest the shell is about to create. The guest may
    /// call privileged channels from its first page load.
    pub fn open_guest(&self, label: &str, window_label: &str, host_url: Option<String>) -> SessionId {
        let session = self.guests.register(label, window_label, host_url);
        self.router.connect(session);
        self.autofill.attach_contents(session.0);
        session
    }

    /// Session for a hidden guest hosting an extension's background page
    pub fn open_extension_background(
        &self,
        label: &str,
        window_label: &str,
        extension_id: &str,
        host_url: String,
    ) -> Result<SessionId> {
        let session = self.open_guest(label, window_label, Some(host_url));
        if let Err(e) = self
            .wavebox
            .extensions()
            .set_background_page(extension_id, Some(session.0))
        {
            self.close_guest(label);
            return Err(e.into());
        }
        Ok(session)
    }

    pub fn close_guest(&self, label: &str) -> Option<GuestEntry> {
        let entry = self.guests.remove_label(label)?;
        self.forget(entry.session);
        Some(entry)
    }

    /// Drop every guest hosted by a destroyed window
    pub fn close_window(&self, window_label: &str) -> usize {
        let removed = self.guests.remove_window(window_label);
        for entry in &removed {
            self.forget(entry.session);
        }
        removed.len()
    }

    fn forget(&self, session: SessionId) {
        self.router.disconnect(session);
        self.autofill.detach_contents(session.0);
        for extension_id in self.wavebox.extensions().clear_background_page(session.0) {
            tracing::info!(session = %session, extension_id = %extension_id, "Extension background page closed");
        }
    }
}
