//! Tauri IPC Commands
//!
//! `wbrpc` is the single entry point guest pages use. The rest serve the
//! shell UI.

use serde::Serialize;

pub mod autofill;
pub mod diagnostics;
pub mod extensions;
pub mod guests;
pub mod rpc;
pub mod settings;

pub fn ui_webview_label(window_label: &str) -> String {
    format!("ui-{window_label}")
}

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}
