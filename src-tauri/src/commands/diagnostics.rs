use tauri::State;

use super::CommandResult;
use crate::state::AppState;

#[tauri::command]
pub fn frontend_ready(state: State<AppState>) -> CommandResult<()> {
    let settings = state.wavebox().settings().launched();
    tracing::info!(
        proxy_mode = %settings.proxy_mode,
        autofill_available = state.autofill().is_available(),
        "Frontend ready"
    );
    CommandResult::ok(())
}
