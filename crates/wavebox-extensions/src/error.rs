//! Extension error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Extension not found: {0}")]
    NotFound(String),

    #[error("Invalid extension id: {0}")]
    InvalidId(String),

    #[error("Invalid extension url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid manifest {path}: {source}")]
    InvalidManifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
