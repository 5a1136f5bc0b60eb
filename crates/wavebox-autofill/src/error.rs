//! Autofill error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutofillError {
    #[error("Autofill service not available")]
    Unavailable,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Credential backend error: {0}")]
    Backend(String),

    #[error("Keychain window error: {0}")]
    Window(String),
}
