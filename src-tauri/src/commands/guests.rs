//! Guest webview commands
//!
//! Each guest is a child webview of the invoking window, connected to the
//! router for its whole lifetime.

use serde::Deserialize;
use tauri::webview::{PageLoadEvent, WebviewBuilder};
use tauri::{AppHandle, LogicalPosition, LogicalSize, Manager, State, Webview, WebviewUrl, Window};

use wavebox_core::SessionId;

use super::CommandResult;
use crate::guests::GuestEntry;
use crate::state::AppState;

/// Exposes the router to guest pages as `window.wbrpc(channel, ...args)`
const GUEST_INIT_SCRIPT: &str = r#"
(() => {
  try {
    const invoke = window.__TAURI_INTERNALS__ && window.__TAURI_INTERNALS__.invoke;
    if (!invoke || window.wbrpc) return;
    Object.defineProperty(window, 'wbrpc', {
      value: (channel, ...args) => invoke('wbrpc', { channel, args }),
      writable: false,
    });
  } catch {}
})();
"#;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GuestBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for GuestBounds {
    fn default() -> Self {
        Self {
            x: 68.0, // sidebar width
            y: 0.0,
            width: 1212.0,
            height: 800.0,
        }
    }
}

/// Add the webview for a guest whose session is already open
pub(super) fn add_guest_webview(
    app: &AppHandle,
    window: &Window,
    label: &str,
    session: SessionId,
    url: url::Url,
    bounds: GuestBounds,
) -> tauri::Result<Webview> {
    let app_for_load = app.clone();
    let builder = WebviewBuilder::new(label, WebviewUrl::External(url))
        .auto_resize()
        .initialization_script(GUEST_INIT_SCRIPT)
        .on_page_load(move |webview, payload| {
            if !matches!(payload.event(), PageLoadEvent::Finished) {
                return;
            }
            let Some(state) = app_for_load.try_state::<AppState>() else {
                return;
            };
            if let Some(script) = state.autofill().password_hint_script(session.0) {
                if let Err(e) = webview.eval(&script) {
                    tracing::warn!(session = %session, error = %e, "Failed to inject password hints");
                }
            }
        });

    window.add_child(
        builder,
        LogicalPosition::new(bounds.x, bounds.y),
        LogicalSize::new(bounds.width, bounds.height),
    )
}

#[tauri::command]
pub async fn create_guest(
    app: AppHandle,
    window: Window,
    url: String,
    bounds: Option<GuestBounds>,
) -> CommandResult<GuestEntry> {
    let Some(state) = app.try_state::<AppState>() else {
        return CommandResult::err("AppState not found".to_string());
    };

    let parsed: url::Url = match url.parse() {
        Ok(u) => u,
        Err(_) => return CommandResult::err(format!("Invalid URL: {}", url)),
    };

    let window_label = window.label().to_string();
    let label = state.guests().guest_label(&window_label);
    let session = state.open_guest(&label, &window_label, Some(parsed.to_string()));

    match add_guest_webview(&app, &window, &label, session, parsed, bounds.unwrap_or_default()) {
        Ok(_) => {
            tracing::info!(label = %label, session = %session, url = %url, "Created guest webview");
            match state.guests().get(session) {
                Some(entry) => CommandResult::ok(entry),
                None => CommandResult::err(format!("Guest closed during creation: {}", label)),
            }
        }
        Err(e) => {
            state.close_guest(&label);
            tracing::error!(label = %label, error = %e, "Failed to create guest webview");
            CommandResult::err(format!("Failed to create guest: {}", e))
        }
    }
}

#[tauri::command]
pub async fn close_guest(app: AppHandle, label: String) -> CommandResult<()> {
    let Some(state) = app.try_state::<AppState>() else {
        return CommandResult::err("AppState not found".to_string());
    };

    match remove_guest(&app, &state, &label) {
        Some(_) => CommandResult::ok(()),
        None => CommandResult::err(format!("No guest: {}", label)),
    }
}

/// Disconnect a guest and close its webview
pub(super) fn remove_guest(app: &AppHandle, state: &AppState, label: &str) -> Option<GuestEntry> {
    let entry = state.close_guest(label)?;

    if let Some(webview) = app.get_webview(label) {
        if let Err(e) = webview.close() {
            tracing::warn!(label = %label, error = %e, "Failed to close guest webview");
        }
    }

    tracing::info!(label = %label, session = %entry.session, "Closed guest webview");
    Some(entry)
}

#[tauri::command]
pub fn list_guests(state: State<AppState>) -> CommandResult<Vec<GuestEntry>> {
    CommandResult::ok(state.guests().list())
}
