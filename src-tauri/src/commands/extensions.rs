//! Extension commands
//!
//! Runtimes are loaded from the data dir at startup. A background page is
//! a hidden guest, recorded against its extension while it lives.

use tauri::{AppHandle, Manager, State, Window};

use wavebox_core::{ExtensionRegistry, ExtensionRuntime, SessionId};

use super::guests::{add_guest_webview, remove_guest, GuestBounds};
use super::CommandResult;
use crate::guests::GuestEntry;
use crate::state::AppState;

#[tauri::command]
pub fn list_extensions(state: State<AppState>) -> CommandResult<Vec<ExtensionRuntime>> {
    CommandResult::ok(state.wavebox().extensions().list())
}

#[tauri::command]
pub async fn create_extension_background(
    app: AppHandle,
    window: Window,
    extension_id: String,
) -> CommandResult<GuestEntry> {
    let Some(state) = app.try_state::<AppState>() else {
        return CommandResult::err("AppState not found".to_string());
    };

    let Some(runtime) = state.wavebox().extensions().get(&extension_id) else {
        return CommandResult::err(format!("No extension: {}", extension_id));
    };
    let Some(path) = runtime.background_path else {
        return CommandResult::err(format!("Extension has no background page: {}", extension_id));
    };
    if runtime.background_page.is_some() {
        return CommandResult::err(format!("Background page already running: {}", extension_id));
    }

    let url = match ExtensionRegistry::extension_url(&extension_id, &path) {
        Ok(url) => url,
        Err(e) => return CommandResult::err(e.to_string()),
    };

    let window_label = window.label().to_string();
    let label = state.guests().guest_label(&window_label);
    let session = match state.open_extension_background(&label, &window_label, &extension_id, url.to_string()) {
        Ok(session) => session,
        Err(e) => return CommandResult::err(e.to_string()),
    };

    let bounds = GuestBounds {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };
    let webview = match add_guest_webview(&app, &window, &label, session, url, bounds) {
        Ok(webview) => webview,
        Err(e) => {
            state.close_guest(&label);
            tracing::error!(extension_id = %extension_id, error = %e, "Failed to create background page");
            return CommandResult::err(format!("Failed to create background page: {}", e));
        }
    };
    if let Err(e) = webview.hide() {
        tracing::warn!(label = %label, error = %e, "Failed to hide background page");
    }

    tracing::info!(extension_id = %extension_id, label = %label, session = %session, "Started extension background page");
    match state.guests().get(session) {
        Some(entry) => CommandResult::ok(entry),
        None => CommandResult::err(format!("Background page closed during creation: {}", label)),
    }
}

/// Unload a runtime and close its background page, if any
#[tauri::command]
pub async fn uninstall_extension(app: AppHandle, extension_id: String) -> CommandResult<()> {
    let Some(state) = app.try_state::<AppState>() else {
        return CommandResult::err("AppState not found".to_string());
    };

    let Some(runtime) = state.wavebox().extensions().uninstall(&extension_id) else {
        return CommandResult::err(format!("No extension: {}", extension_id));
    };

    if let Some(contents_id) = runtime.background_page {
        if let Some(entry) = state.guests().get(SessionId(contents_id)) {
            remove_guest(&app, &state, &entry.label);
        }
    }
    CommandResult::ok(())
}
