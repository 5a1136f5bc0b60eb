//! RPC error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Invalid arguments for {channel}: {reason}")]
    InvalidArgs {
        channel: &'static str,
        reason: String,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] wavebox_settings::SettingsError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session {0} is not known to the shell")]
    UnknownSession(crate::SessionId),

    #[error("Shell error: {0}")]
    Shell(String),

    #[error("Provider error: {0}")]
    Provider(String),
}
