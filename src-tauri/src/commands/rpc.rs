//! Request router bridge

use serde_json::Value;
use tauri::{AppHandle, Manager, Webview};

use crate::state::AppState;

/// Route a guest request. Async so deferred replies and the relaunch timer
/// run on the shell's async runtime.
#[tauri::command]
pub async fn wbrpc(
    app: AppHandle,
    webview: Webview,
    channel: String,
    args: Option<Vec<Value>>,
) -> Option<Value> {
    let state = app.try_state::<AppState>()?;
    let window = webview.window();
    let session = state
        .guests()
        .caller_session(webview.label(), window.label());

    state
        .router()
        .dispatch(&channel, session, &args.unwrap_or_default())
        .into_value()
}
