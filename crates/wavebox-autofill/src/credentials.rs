//! Credential backend seam

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub account: String,
    pub password: String,
}

/// OS keychain, keyed by service name then account
pub trait CredentialStore: Send + Sync {
    fn find_credentials(&self, service: &str) -> Result<Vec<Credential>>;
    fn set_password(&self, service: &str, account: &str, password: &str) -> Result<()>;
    /// Returns whether an entry was removed
    fn delete_password(&self, service: &str, account: &str) -> Result<bool>;
}
