//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] wavebox_storage::StorageError),

    #[error("Settings error: {0}")]
    Settings(#[from] wavebox_settings::SettingsError),

    #[error("Extension error: {0}")]
    Extension(#[from] wavebox_extensions::ExtensionError),

    #[error("RPC error: {0}")]
    Rpc(#[from] wavebox_rpc::RpcError),

    #[error("Autofill error: {0}")]
    Autofill(#[from] wavebox_autofill::AutofillError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
