//! Wavebox Autofill
//!
//! Stores and recalls site passwords through an OS credential backend,
//! hints password fields in guest pages and drives the credential manager
//! window. The backend and the window are supplied by the shell.

mod credentials;
mod error;
mod hints;
mod keychain;
mod service;

pub use credentials::{Credential, CredentialStore};
pub use error::AutofillError;
pub use hints::password_hint_css;
pub use keychain::{KeychainWindows, ManagerMode};
pub use service::AutofillService;

pub type Result<T> = std::result::Result<T, AutofillError>;
