//! Settings commands
//!
//! Changes persist immediately. Proxy changes only go through the router,
//! which relaunches to apply them.

use serde::Serialize;
use tauri::State;

use wavebox_core::{AppSettings, NotificationPermission, OriginPermission, UserSettings};

use super::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInfo {
    /// Values saved for the next launch
    pub current: AppSettings,
    /// Values this process is running with
    pub launched: AppSettings,
}

#[tauri::command]
pub fn get_settings(state: State<AppState>) -> CommandResult<SettingsInfo> {
    let settings = state.wavebox().settings();
    CommandResult::ok(SettingsInfo {
        current: settings.app(),
        launched: settings.launched().clone(),
    })
}

#[tauri::command]
pub fn set_enable_autofill_service(state: State<AppState>, enabled: bool) -> CommandResult<()> {
    state
        .wavebox()
        .settings()
        .set_enable_autofill_service(enabled)
        .into()
}

#[tauri::command]
pub fn set_enable_autoupdate(state: State<AppState>, enabled: bool) -> CommandResult<()> {
    state.wavebox().settings().set_enable_autoupdate(enabled).into()
}

#[tauri::command]
pub fn get_user_settings(state: State<AppState>) -> CommandResult<UserSettings> {
    CommandResult::ok(state.wavebox().user().user())
}

#[tauri::command]
pub fn set_analytics_enabled(state: State<AppState>, enabled: bool) -> CommandResult<()> {
    state.wavebox().user().set_analytics_enabled(enabled).into()
}

#[tauri::command]
pub fn list_notification_permissions(state: State<AppState>) -> CommandResult<Vec<OriginPermission>> {
    CommandResult::ok(state.wavebox().notifications().list())
}

#[tauri::command]
pub fn set_notification_permission(
    state: State<AppState>,
    url: String,
    permission: String,
) -> CommandResult<()> {
    let permission = match permission.parse::<NotificationPermission>() {
        Ok(p) => p,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    state
        .wavebox()
        .notifications()
        .set_permission(&url, permission)
        .into()
}

#[tauri::command]
pub fn clear_notification_permission(state: State<AppState>, url: String) -> CommandResult<()> {
    state.wavebox().notifications().clear_permission(&url).into()
}
