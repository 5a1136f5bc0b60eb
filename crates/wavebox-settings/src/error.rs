//! Settings error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    Storage(#[from] wavebox_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid proxy mode: {0}")]
    InvalidProxyMode(String),

    #[error("Invalid notification permission: {0}")]
    InvalidPermission(String),

    #[error("URL has no origin: {0}")]
    OpaqueOrigin(String),
}
