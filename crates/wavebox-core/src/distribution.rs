//! Distribution config
//!
//! Installer-written hints about how this copy was packaged. The OS
//! package manager decides whether the built-in updater should run or
//! defer to the system.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};

use wavebox_rpc::{PackageManager, RpcError, UpdateCapabilities};

use crate::Result;

const SNAP_INSTALL_METHOD: &str = "snap";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistributionConfig {
    pub install_method: Option<String>,
    #[serde(rename = "defaultOSPackageManager")]
    pub default_os_package_manager: Option<PackageManager>,
}

impl DistributionConfig {
    /// A missing file means an unpackaged build
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No distribution config");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    pub fn is_snap_install(&self) -> bool {
        self.install_method
            .as_deref()
            .is_some_and(|method| method.eq_ignore_ascii_case(SNAP_INSTALL_METHOD))
    }

    /// Blocking: may spawn the package manager's query tool
    pub fn detect_package_manager(&self) -> std::io::Result<PackageManager> {
        if let Some(configured) = self.default_os_package_manager {
            return Ok(configured);
        }
        if self.is_snap_install() || std::env::var_os("SNAP").is_some() {
            return Ok(PackageManager::Snap);
        }
        if !cfg!(target_os = "linux") {
            return Ok(PackageManager::Unmanaged);
        }

        let exe = std::env::current_exe()?;
        if owns_file("dpkg", &["-S"], &exe) {
            return Ok(PackageManager::Dpkg);
        }
        if owns_file("rpm", &["-qf"], &exe) {
            return Ok(PackageManager::Rpm);
        }
        Ok(PackageManager::Unmanaged)
    }
}

/// Whether the package manager claims `path`. A missing tool claims nothing.
fn owns_file(tool: &str, args: &[&str], path: &Path) -> bool {
    Command::new(tool)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

impl UpdateCapabilities for DistributionConfig {
    fn os_package_manager(&self) -> wavebox_rpc::Result<PackageManager> {
        self.detect_package_manager()
            .map_err(|e| RpcError::Provider(format!("package manager lookup failed: {e}")))
    }

    fn autoupdater_supported(&self) -> bool {
        cfg!(any(target_os = "macos", target_os = "windows"))
    }
}
