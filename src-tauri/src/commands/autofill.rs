//! Autofill commands

use serde::Serialize;
use tauri::State;

use wavebox_core::{Credential, ManagerMode};

use super::CommandResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillStatus {
    pub library_loaded: bool,
    pub enabled: bool,
    pub available: bool,
}

#[tauri::command]
pub fn autofill_status(state: State<AppState>) -> CommandResult<AutofillStatus> {
    let autofill = state.autofill();
    CommandResult::ok(AutofillStatus {
        library_loaded: autofill.is_library_loaded(),
        enabled: autofill.is_enabled(),
        available: autofill.is_available(),
    })
}

#[tauri::command]
pub fn find_credentials(state: State<AppState>, url: String) -> CommandResult<Vec<Credential>> {
    state.autofill().find_credentials(&url).into()
}

#[tauri::command]
pub fn add_credentials(
    state: State<AppState>,
    url: String,
    account: String,
    password: String,
) -> CommandResult<()> {
    state.autofill().add_credentials(&url, &account, &password).into()
}

#[tauri::command]
pub fn delete_credentials(state: State<AppState>, url: String, account: String) -> CommandResult<bool> {
    state.autofill().delete_credentials(&url, &account).into()
}

#[tauri::command]
pub fn open_autofill_manager(
    state: State<AppState>,
    url: String,
    mode: Option<ManagerMode>,
) -> CommandResult<()> {
    state.autofill().open_autofill_manager(&url, mode).into()
}

#[tauri::command]
pub fn add_autofill_password(state: State<AppState>, url: String) -> CommandResult<()> {
    state.autofill().add_autofill_password(&url).into()
}
