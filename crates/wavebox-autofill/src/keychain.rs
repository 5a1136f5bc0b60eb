//! Credential manager window seam

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Result;

/// What the manager should show when it opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerMode {
    Add,
}

impl fmt::Display for ManagerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerMode::Add => f.write_str("add"),
        }
    }
}

pub trait KeychainWindows: Send + Sync {
    /// Focus the open manager and point it at `service_name`. Returns false
    /// when no manager window exists.
    fn focus_existing(&self, service_name: &str, mode: Option<ManagerMode>) -> Result<bool>;
    fn open(&self, service_name: &str, mode: Option<ManagerMode>) -> Result<()>;
}
