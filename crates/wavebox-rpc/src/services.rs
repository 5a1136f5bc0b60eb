//! Collaborators the handlers consult
//!
//! Stores owned by the app implement their trait here. Shell primitives
//! (content contexts, opening URLs, relaunching) are implemented by the
//! desktop shell.

use serde_json::Value;
use std::sync::Arc;

use wavebox_extensions::{ContentScriptGuestConfig, ExtensionRegistry, RuntimeConfig};
use wavebox_settings::{
    NotificationPermission, NotificationPermissionStore, ProxySettings, SettingsStore, UserStore,
};

use crate::payload::{OpenExternalOptions, PackageManager, ReadingItem, RecentItem};
use crate::session::SessionId;
use crate::Result;

pub trait SettingsProvider: Send + Sync {
    /// Settings snapshot the process launched with
    fn launch_settings(&self) -> Result<Value>;
    fn proxy_settings(&self) -> Result<ProxySettings>;
    fn set_proxy_settings(&self, proxy: ProxySettings) -> Result<()>;
}

pub trait UserProvider: Send + Sync {
    fn launch_settings(&self) -> Result<Value>;
}

pub trait ExtensionRuntimes: Send + Sync {
    fn has_runtime(&self, extension_id: &str) -> Result<bool>;
    fn content_script_runtime_config(&self, extension_id: &str) -> Result<Option<RuntimeConfig>>;
    fn background_page_id(&self, extension_id: &str) -> Result<Option<SessionId>>;
    fn content_script_guest_configs(&self) -> Result<Vec<ContentScriptGuestConfig>>;
}

pub trait NotificationPermissions: Send + Sync {
    fn permission_for(&self, session: SessionId, url: Option<&str>) -> Result<NotificationPermission>;
}

/// The shell's view of its embedded content contexts
pub trait ContentHost: Send + Sync {
    /// URL currently loaded in the session
    fn url(&self, session: SessionId) -> Option<String>;
    /// URL the session was created to host
    fn host_url(&self, session: SessionId) -> Option<String>;
    fn is_destroyed(&self, session: SessionId) -> bool;
    fn send(&self, session: SessionId, channel: &str, payload: Value) -> Result<()>;
}

pub trait LinkOpener: Send + Sync {
    fn open_recent_link(&self, session: SessionId, service_id: &str, item: &RecentItem) -> Result<()>;
    fn open_reading_queue_link(
        &self,
        session: SessionId,
        service_id: &str,
        item: &ReadingItem,
    ) -> Result<()>;
}

pub trait ExternalOpener: Send + Sync {
    fn open_external(&self, url: &str, options: &OpenExternalOptions) -> Result<()>;
}

pub trait UpdateCapabilities: Send + Sync {
    /// May touch the filesystem or spawn probes; called off the dispatch thread
    fn os_package_manager(&self) -> Result<PackageManager>;
    fn autoupdater_supported(&self) -> bool;
}

pub trait Relauncher: Send + Sync {
    fn relaunch(&self);
}

/// Host platform details handed to guest preloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub platform: String,
    pub arch: String,
    pub os_release: String,
}

impl PlatformInfo {
    pub fn current() -> Self {
        let platform = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "x64",
            "aarch64" => "arm64",
            "x86" => "ia32",
            other => other,
        };

        Self {
            platform: platform.to_string(),
            arch: arch.to_string(),
            os_release: sysinfo::System::kernel_version().unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub settings: Arc<dyn SettingsProvider>,
    pub user: Arc<dyn UserProvider>,
    pub extensions: Arc<dyn ExtensionRuntimes>,
    pub notifications: Arc<dyn NotificationPermissions>,
    pub host: Arc<dyn ContentHost>,
    pub links: Arc<dyn LinkOpener>,
    pub shell: Arc<dyn ExternalOpener>,
    pub updates: Arc<dyn UpdateCapabilities>,
    pub relauncher: Arc<dyn Relauncher>,
    pub platform: PlatformInfo,
}

// === Store implementations ===

impl SettingsProvider for SettingsStore {
    fn launch_settings(&self) -> Result<Value> {
        Ok(self.launch_settings_json()?)
    }

    fn proxy_settings(&self) -> Result<ProxySettings> {
        Ok(self.launched_proxy())
    }

    fn set_proxy_settings(&self, proxy: ProxySettings) -> Result<()> {
        Ok(self.set_proxy(proxy)?)
    }
}

impl UserProvider for UserStore {
    fn launch_settings(&self) -> Result<Value> {
        Ok(self.launch_settings_json()?)
    }
}

impl ExtensionRuntimes for ExtensionRegistry {
    fn has_runtime(&self, extension_id: &str) -> Result<bool> {
        Ok(ExtensionRegistry::has_runtime(self, extension_id))
    }

    fn content_script_runtime_config(&self, extension_id: &str) -> Result<Option<RuntimeConfig>> {
        Ok(ExtensionRegistry::content_script_runtime_config(self, extension_id))
    }

    fn background_page_id(&self, extension_id: &str) -> Result<Option<SessionId>> {
        Ok(ExtensionRegistry::background_page_id(self, extension_id).map(SessionId))
    }

    fn content_script_guest_configs(&self) -> Result<Vec<ContentScriptGuestConfig>> {
        Ok(ExtensionRegistry::content_script_guest_configs(self))
    }
}

impl NotificationPermissions for NotificationPermissionStore {
    fn permission_for(&self, _session: SessionId, url: Option<&str>) -> Result<NotificationPermission> {
        Ok(url
            .map(|url| self.permission_for_url(url))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavebox_settings::ProxyMode;
    use wavebox_storage::Database;

    #[test]
    fn test_platform_names_use_shell_conventions() {
        let info = PlatformInfo::current();
        assert!(!info.platform.is_empty());
        assert_ne!(info.platform, "macos");
        assert_ne!(info.arch, "x86_64");
    }

    #[test]
    fn test_settings_store_reports_launched_proxy() {
        let store = SettingsStore::load(Database::open_in_memory().unwrap()).unwrap();
        SettingsProvider::set_proxy_settings(
            &store,
            ProxySettings {
                proxy_mode: ProxyMode::Manual,
                proxy_server: Some("1.2.3.4".to_string()),
                proxy_port: Some(8080),
            },
        )
        .unwrap();

        let reported = SettingsProvider::proxy_settings(&store).unwrap();
        assert_eq!(reported.proxy_mode, ProxyMode::Disabled);
        assert_eq!(store.app().proxy_mode, ProxyMode::Manual);
    }

    #[test]
    fn test_registry_background_page_maps_to_session() {
        let registry = ExtensionRegistry::new();
        registry
            .install(wavebox_extensions::ExtensionRuntime::new("abc", "A", "1"))
            .unwrap();
        registry.set_background_page("abc", Some(12)).unwrap();
        assert_eq!(
            ExtensionRuntimes::background_page_id(&registry, "abc").unwrap(),
            Some(SessionId(12))
        );
    }
}
