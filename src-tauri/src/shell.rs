//! Tauri side of the router and autofill seams

use serde::Serialize;
use serde_json::Value;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;

use wavebox_core::{
    AutofillError, ContentHost, ExternalOpener, KeychainWindows, LinkOpener, ManagerMode,
    OpenExternalOptions, ReadingItem, RecentItem, Relauncher, RpcError, SessionId,
};

use crate::commands::ui_webview_label;
use crate::guests::GuestRegistry;

pub const KEYCHAIN_WINDOW: &str = "keychain";

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenLinkPayload<'a, T> {
    session: SessionId,
    guest_label: &'a str,
    service_id: &'a str,
    item: &'a T,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeychainTarget<'a> {
    service_name: &'a str,
    mode: Option<ManagerMode>,
}

#[derive(Clone)]
pub struct TauriShell {
    app: AppHandle,
    guests: GuestRegistry,
}

impl TauriShell {
    pub fn new(app: AppHandle, guests: GuestRegistry) -> Self {
        Self { app, guests }
    }

    fn label(&self, session: SessionId) -> Option<String> {
        self.guests.get(session).map(|entry| entry.label)
    }

    /// Links open in the UI that owns the guest
    fn emit_to_owner<T: Serialize + Clone>(
        &self,
        session: SessionId,
        event: &str,
        service_id: &str,
        item: &T,
    ) -> Result<(), RpcError> {
        let entry = self.guests.get(session).ok_or(RpcError::UnknownSession(session))?;
        let payload = OpenLinkPayload {
            session,
            guest_label: &entry.label,
            service_id,
            item,
        };

        self.app
            .emit_to(ui_webview_label(&entry.window_label).as_str(), event, payload)
            .map_err(|e| RpcError::Shell(e.to_string()))
    }
}

impl ContentHost for TauriShell {
    fn url(&self, session: SessionId) -> Option<String> {
        let label = self.label(session)?;
        let webview = self.app.get_webview(&label)?;
        webview.url().ok().map(|url| url.to_string())
    }

    fn host_url(&self, session: SessionId) -> Option<String> {
        self.guests.get(session).and_then(|entry| entry.host_url)
    }

    fn is_destroyed(&self, session: SessionId) -> bool {
        match self.label(session) {
            Some(label) => self.app.get_webview(&label).is_none(),
            None => true,
        }
    }

    fn send(&self, session: SessionId, channel: &str, payload: Value) -> Result<(), RpcError> {
        let label = self.label(session).ok_or(RpcError::UnknownSession(session))?;
        self.app
            .emit_to(label.as_str(), channel, payload)
            .map_err(|e| RpcError::Shell(e.to_string()))
    }
}

impl LinkOpener for TauriShell {
    fn open_recent_link(
        &self,
        session: SessionId,
        service_id: &str,
        item: &RecentItem,
    ) -> Result<(), RpcError> {
        self.emit_to_owner(session, "open-recent-link", service_id, item)
    }

    fn open_reading_queue_link(
        &self,
        session: SessionId,
        service_id: &str,
        item: &ReadingItem,
    ) -> Result<(), RpcError> {
        self.emit_to_owner(session, "open-reading-queue-link", service_id, item)
    }
}

impl ExternalOpener for TauriShell {
    fn open_external(&self, url: &str, options: &OpenExternalOptions) -> Result<(), RpcError> {
        if options.activate == Some(false) {
            tracing::debug!(url = %url, "Background open not supported, opening in foreground");
        }

        self.app
            .opener()
            .open_url(url, None::<&str>)
            .map_err(|e| RpcError::Shell(e.to_string()))
    }
}

impl Relauncher for TauriShell {
    fn relaunch(&self) {
        tracing::info!("Relaunching");
        self.app.restart();
    }
}

impl KeychainWindows for TauriShell {
    fn focus_existing(
        &self,
        service_name: &str,
        mode: Option<ManagerMode>,
    ) -> Result<bool, AutofillError> {
        let Some(window) = self.app.get_webview_window(KEYCHAIN_WINDOW) else {
            return Ok(false);
        };

        window
            .set_focus()
            .map_err(|e| AutofillError::Window(e.to_string()))?;
        window
            .emit_to(KEYCHAIN_WINDOW, "keychain-service-changed", KeychainTarget { service_name, mode })
            .map_err(|e| AutofillError::Window(e.to_string()))?;
        Ok(true)
    }

    fn open(&self, service_name: &str, mode: Option<ManagerMode>) -> Result<(), AutofillError> {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("service", service_name);
        if let Some(mode) = mode {
            query.append_pair("mode", &mode.to_string());
        }
        let page = format!("keychain.html?{}", query.finish());

        WebviewWindowBuilder::new(&self.app, KEYCHAIN_WINDOW, WebviewUrl::App(page.into()))
            .title("Passwords")
            .inner_size(600.0, 500.0)
            .center()
            .build()
            .map_err(|e| AutofillError::Window(e.to_string()))?;
        Ok(())
    }
}
