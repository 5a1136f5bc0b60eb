//! App settings store
//!
//! Holds the live settings plus the snapshot taken when the process
//! launched. Proxy changes are written to the live settings and persisted,
//! but the running process keeps reporting the launched values until it
//! relaunches.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use wavebox_storage::Database;

use crate::error::SettingsError;
use crate::Result;

const APP_SETTINGS_KEY: &str = "app";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    /// Connect directly
    #[default]
    Disabled,
    /// Use the configured server and port
    Manual,
    /// Defer to the OS proxy configuration
    System,
}

impl ProxyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyMode::Disabled => "disabled",
            ProxyMode::Manual => "manual",
            ProxyMode::System => "system",
        }
    }
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProxyMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "disabled" => Ok(ProxyMode::Disabled),
            "manual" => Ok(ProxyMode::Manual),
            "system" => Ok(ProxyMode::System),
            other => Err(SettingsError::InvalidProxyMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySettings {
    pub proxy_mode: ProxyMode,
    pub proxy_server: Option<String>,
    pub proxy_port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub proxy_mode: ProxyMode,
    pub proxy_server: Option<String>,
    pub proxy_port: Option<u16>,
    pub enable_autofill_service: bool,
    pub enable_autoupdate: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            proxy_mode: ProxyMode::Disabled,
            proxy_server: None,
            proxy_port: None,
            enable_autofill_service: true,
            enable_autoupdate: true,
        }
    }
}

impl AppSettings {
    pub fn proxy(&self) -> ProxySettings {
        ProxySettings {
            proxy_mode: self.proxy_mode,
            proxy_server: self.proxy_server.clone(),
            proxy_port: self.proxy_port,
        }
    }
}

#[derive(Debug, Serialize)]
struct LaunchSettings<'a> {
    app: &'a AppSettings,
}

pub struct SettingsStore {
    db: Database,
    current: Arc<RwLock<AppSettings>>,
    launched: Arc<AppSettings>,
}

impl SettingsStore {
    /// Load persisted settings and take the launched snapshot
    pub fn load(db: Database) -> Result<Self> {
        let settings = match db.get_json::<AppSettings>(APP_SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => AppSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable app settings");
                AppSettings::default()
            }
        };

        tracing::info!(
            proxy_mode = %settings.proxy_mode,
            autofill = settings.enable_autofill_service,
            "Loaded app settings"
        );

        Ok(Self {
            db,
            launched: Arc::new(settings.clone()),
            current: Arc::new(RwLock::new(settings)),
        })
    }

    /// Live settings, including changes pending a relaunch
    pub fn app(&self) -> AppSettings {
        self.current.read().clone()
    }

    /// Settings the process was launched with
    pub fn launched(&self) -> &AppSettings {
        &self.launched
    }

    pub fn launched_proxy(&self) -> ProxySettings {
        self.launched.proxy()
    }

    /// Launch snapshot in the shape handed to guest preloads
    pub fn launch_settings_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(LaunchSettings {
            app: &self.launched,
        })?)
    }

    pub fn set_proxy_mode(&self, mode: ProxyMode) -> Result<()> {
        self.update(|app| app.proxy_mode = mode)
    }

    pub fn set_proxy_server(&self, server: Option<String>) -> Result<()> {
        let server = server
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.update(|app| app.proxy_server = server)
    }

    pub fn set_proxy_port(&self, port: Option<u16>) -> Result<()> {
        self.update(|app| app.proxy_port = port)
    }

    /// Replace the whole proxy configuration in a single write
    pub fn set_proxy(&self, proxy: ProxySettings) -> Result<()> {
        let server = proxy
            .proxy_server
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.update(|app| {
            app.proxy_mode = proxy.proxy_mode;
            app.proxy_server = server;
            app.proxy_port = proxy.proxy_port;
        })
    }

    pub fn set_enable_autofill_service(&self, enabled: bool) -> Result<()> {
        self.update(|app| app.enable_autofill_service = enabled)
    }

    pub fn set_enable_autoupdate(&self, enabled: bool) -> Result<()> {
        self.update(|app| app.enable_autoupdate = enabled)
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppSettings),
    {
        let mut current = self.current.write();
        let mut next = current.clone();
        f(&mut next);
        if next == *current {
            return Ok(());
        }

        self.db.set_json(APP_SETTINGS_KEY, &next)?;
        *current = next;
        Ok(())
    }
}

impl Clone for SettingsStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            current: Arc::clone(&self.current),
            launched: Arc::clone(&self.launched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_on_empty_database() {
        let store = SettingsStore::load(Database::open_in_memory().unwrap()).unwrap();
        assert_eq!(store.app(), AppSettings::default());
        assert_eq!(store.launched_proxy(), ProxySettings::default());
    }

    #[test]
    fn test_proxy_changes_apply_on_next_launch() {
        let db = Database::open_in_memory().unwrap();
        let store = SettingsStore::load(db.clone()).unwrap();

        store.set_proxy_mode(ProxyMode::Manual).unwrap();
        store
            .set_proxy_server(Some("10.0.0.1".to_string()))
            .unwrap();
        store.set_proxy_port(Some(3128)).unwrap();

        // Live settings reflect the change immediately
        let live = store.app().proxy();
        assert_eq!(live.proxy_mode, ProxyMode::Manual);
        assert_eq!(live.proxy_server.as_deref(), Some("10.0.0.1"));
        assert_eq!(live.proxy_port, Some(3128));

        // The running process still reports what it launched with
        assert_eq!(store.launched_proxy(), ProxySettings::default());

        let relaunched = SettingsStore::load(db).unwrap();
        assert_eq!(relaunched.launched_proxy(), live);
    }

    #[test]
    fn test_blank_server_is_cleared() {
        let store = SettingsStore::load(Database::open_in_memory().unwrap()).unwrap();
        store.set_proxy_server(Some("   ".to_string())).unwrap();
        assert_eq!(store.app().proxy_server, None);
    }

    #[test]
    fn test_set_proxy_replaces_all_fields() {
        let store = SettingsStore::load(Database::open_in_memory().unwrap()).unwrap();
        store
            .set_proxy(ProxySettings {
                proxy_mode: ProxyMode::Manual,
                proxy_server: Some(" proxy.local ".to_string()),
                proxy_port: Some(8080),
            })
            .unwrap();

        let app = store.app();
        assert_eq!(app.proxy_mode, ProxyMode::Manual);
        assert_eq!(app.proxy_server.as_deref(), Some("proxy.local"));
        assert_eq!(app.proxy_port, Some(8080));
    }

    #[test]
    fn test_unreadable_settings_fall_back_to_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(APP_SETTINGS_KEY, "{broken").unwrap();

        let store = SettingsStore::load(db).unwrap();
        assert_eq!(store.app(), AppSettings::default());
    }

    #[test]
    fn test_launch_settings_json_shape() {
        let store = SettingsStore::load(Database::open_in_memory().unwrap()).unwrap();
        let json = store.launch_settings_json().unwrap();
        assert_eq!(json["app"]["proxyMode"], "disabled");
        assert_eq!(json["app"]["enableAutofillService"], true);
    }

    #[test]
    fn test_proxy_mode_parse() {
        assert_eq!("Manual".parse::<ProxyMode>().unwrap(), ProxyMode::Manual);
        assert_eq!(" system ".parse::<ProxyMode>().unwrap(), ProxyMode::System);
        assert!("socks".parse::<ProxyMode>().is_err());
    }
}
