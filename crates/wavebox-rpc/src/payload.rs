//! Per-channel argument and response records
//!
//! Callers send positional JSON arguments. Each handler decodes them into
//! one of the records below before touching any store, so malformed input
//! is rejected at the boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use wavebox_extensions::{ContentScriptGuestConfig, RuntimeConfig};
use wavebox_settings::{NotificationPermission, ProxyMode};

use crate::channel::Channel;
use crate::error::RpcError;
use crate::Result;

/// Positional arguments of one request
pub(crate) struct Args<'a> {
    channel: Channel,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) fn new(channel: Channel, values: &'a [Value]) -> Self {
        Self { channel, values }
    }

    fn invalid(&self, reason: impl Into<String>) -> RpcError {
        RpcError::InvalidArgs {
            channel: self.channel.name(),
            reason: reason.into(),
        }
    }

    /// Decode a required argument
    pub(crate) fn required<T: DeserializeOwned>(&self, index: usize, name: &str) -> Result<T> {
        match self.values.get(index) {
            None | Some(Value::Null) => Err(self.invalid(format!("missing {name}"))),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| self.invalid(format!("{name}: {e}"))),
        }
    }

    /// Decode an optional argument; absent and null both map to `None`
    pub(crate) fn optional<T: DeserializeOwned>(&self, index: usize, name: &str) -> Result<Option<T>> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(format!("{name}: {e}"))),
        }
    }

    /// A required, non-blank string
    pub(crate) fn string(&self, index: usize, name: &str) -> Result<String> {
        let value: String = self.required(index, name)?;
        if value.trim().is_empty() {
            return Err(self.invalid(format!("{name} is empty")));
        }
        Ok(value)
    }
}

// === Inputs ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Tab the item was recorded in, when the service is multi-tab
    #[serde(default)]
    pub tab_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingItem {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// Unix millis the item was queued at
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenExternalOptions {
    /// Bring the opened application to the foreground (macOS)
    #[serde(default)]
    pub activate: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetProxyArgs {
    pub mode: ProxyMode,
    pub server: Option<String>,
    pub port: Option<u16>,
}

impl SetProxyArgs {
    pub(crate) fn decode(args: &Args<'_>) -> Result<Self> {
        let raw_mode: String = args.required(0, "mode")?;
        let mode = raw_mode.parse::<ProxyMode>()?;
        Ok(Self {
            mode,
            server: args.optional(1, "server")?,
            port: args.optional(2, "port")?,
        })
    }
}

// === Outputs ===

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPreloadConfig {
    pub launch_settings: Value,
    pub launch_user_settings: Value,
    pub extensions: Vec<ContentScriptGuestConfig>,
    pub initial_host_url: Option<String>,
    pub notification_permission: NotificationPermission,
    pub paths: Map<String, Value>,
    pub platform: String,
    pub arch: String,
    pub os_release: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionPreloadConfig {
    pub extension_id: String,
    pub has_runtime: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_config: Option<RuntimeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_background_page: Option<bool>,
}

impl ExtensionPreloadConfig {
    pub fn without_runtime(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            has_runtime: false,
            runtime_config: None,
            is_background_page: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageManager {
    /// Detection failed
    Unknown,
    /// Installed outside any OS package manager
    #[serde(rename = "NONE")]
    Unmanaged,
    Snap,
    Dpkg,
    Rpm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdaterConfig {
    pub os_package_manager: PackageManager,
    pub autoupdater_supported_platform: bool,
}

impl UpdaterConfig {
    /// Sent when the lookup fails so the caller never waits forever
    pub fn fallback() -> Self {
        Self {
            os_package_manager: PackageManager::Unknown,
            autoupdater_supported_platform: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_required_args() {
        let values = vec![Value::Null];
        let args = Args::new(Channel::OpenExternal, &values);
        assert!(args.required::<String>(0, "url").is_err());
        assert!(args.required::<String>(1, "url").is_err());
        assert_eq!(args.optional::<String>(1, "options").unwrap(), None);
    }

    #[test]
    fn test_blank_string_rejected() {
        let values = vec![json!("  ")];
        let args = Args::new(Channel::GetExtensionContentScriptPreloadConfig, &values);
        let err = args.string(0, "extensionId").unwrap_err();
        assert!(err.to_string().contains("get-extension-contentscript-preload-config"));
    }

    #[test]
    fn test_set_proxy_args() {
        let values = vec![json!("manual"), json!("10.0.0.1"), json!(3128)];
        let decoded = SetProxyArgs::decode(&Args::new(Channel::SetProxySettings, &values)).unwrap();
        assert_eq!(
            decoded,
            SetProxyArgs {
                mode: ProxyMode::Manual,
                server: Some("10.0.0.1".to_string()),
                port: Some(3128),
            }
        );

        let out_of_range = vec![json!("manual"), json!("10.0.0.1"), json!(70000)];
        assert!(SetProxyArgs::decode(&Args::new(Channel::SetProxySettings, &out_of_range)).is_err());

        let bad_mode = vec![json!("socks5")];
        assert!(SetProxyArgs::decode(&Args::new(Channel::SetProxySettings, &bad_mode)).is_err());
    }

    #[test]
    fn test_extension_preload_config_omits_absent_fields() {
        let value = serde_json::to_value(ExtensionPreloadConfig::without_runtime("abc")).unwrap();
        assert_eq!(value, json!({"extensionId": "abc", "hasRuntime": false}));
    }

    #[test]
    fn test_package_manager_wire_names() {
        assert_eq!(serde_json::to_value(PackageManager::Unknown).unwrap(), json!("UNKNOWN"));
        assert_eq!(serde_json::to_value(PackageManager::Unmanaged).unwrap(), json!("NONE"));
        assert_eq!(serde_json::to_value(PackageManager::Dpkg).unwrap(), json!("DPKG"));
    }
}
