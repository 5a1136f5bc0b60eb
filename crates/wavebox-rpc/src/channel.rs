//! Channel names and their dispatch properties

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::router::Response;

/// How a channel answers its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synchrony {
    /// Response is the call's return value
    Immediate,
    /// Side effect only
    FireAndForget,
    /// Response is sent later on a caller-supplied channel
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    GetGuestPreloadConfig,
    GetExtensionContentScriptPreloadConfig,
    GetExtensionHostedPreloadConfig,
    OpenRecentLink,
    OpenReadingQueueLink,
    OpenExternal,
    GetUpdaterConfig,
    GetProxySettings,
    SetProxySettings,
}

impl Channel {
    pub const ALL: [Channel; 9] = [
        Channel::GetGuestPreloadConfig,
        Channel::GetExtensionContentScriptPreloadConfig,
        Channel::GetExtensionHostedPreloadConfig,
        Channel::OpenRecentLink,
        Channel::OpenReadingQueueLink,
        Channel::OpenExternal,
        Channel::GetUpdaterConfig,
        Channel::GetProxySettings,
        Channel::SetProxySettings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::GetGuestPreloadConfig => "get-guest-preload-config",
            Channel::GetExtensionContentScriptPreloadConfig => {
                "get-extension-contentscript-preload-config"
            }
            Channel::GetExtensionHostedPreloadConfig => "get-extension-hosted-preload-config",
            Channel::OpenRecentLink => "open-recent-link",
            Channel::OpenReadingQueueLink => "open-reading-queue-link",
            Channel::OpenExternal => "open-external",
            Channel::GetUpdaterConfig => "get-updater-config",
            Channel::GetProxySettings => "get-proxy-settings",
            Channel::SetProxySettings => "set-proxy-settings",
        }
    }

    pub fn synchrony(&self) -> Synchrony {
        match self {
            Channel::GetGuestPreloadConfig
            | Channel::GetExtensionContentScriptPreloadConfig
            | Channel::GetExtensionHostedPreloadConfig
            | Channel::GetProxySettings => Synchrony::Immediate,
            Channel::OpenRecentLink
            | Channel::OpenReadingQueueLink
            | Channel::OpenExternal
            | Channel::SetProxySettings => Synchrony::FireAndForget,
            Channel::GetUpdaterConfig => Synchrony::Deferred,
        }
    }

    /// Whether the sender must be connected. Proxy settings are read by
    /// pages that never complete the handshake (the proxy login prompt), and
    /// updater config is asked for by shell pages that never connect.
    pub fn is_privileged(&self) -> bool {
        !matches!(self, Channel::GetProxySettings | Channel::GetUpdaterConfig)
    }

    /// What the caller receives when the sender is not connected or the
    /// handler fails
    pub fn fallback(&self) -> Response {
        match self {
            Channel::GetGuestPreloadConfig | Channel::GetProxySettings => {
                Response::Value(Value::Object(Default::default()))
            }
            Channel::GetExtensionContentScriptPreloadConfig
            | Channel::GetExtensionHostedPreloadConfig => Response::Value(Value::Null),
            Channel::OpenRecentLink
            | Channel::OpenReadingQueueLink
            | Channel::OpenExternal
            | Channel::GetUpdaterConfig
            | Channel::SetProxySettings => Response::Empty,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|channel| channel.name() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for channel in Channel::ALL {
            assert_eq!(channel.name().parse::<Channel>(), Ok(channel));
        }
        assert!("get-everything".parse::<Channel>().is_err());
    }

    #[test]
    fn test_only_read_only_config_is_unprivileged() {
        let unprivileged: Vec<Channel> = Channel::ALL
            .into_iter()
            .filter(|c| !c.is_privileged())
            .collect();
        assert_eq!(
            unprivileged,
            vec![Channel::GetUpdaterConfig, Channel::GetProxySettings]
        );
    }

    #[test]
    fn test_fallbacks_match_synchrony() {
        for channel in Channel::ALL {
            match channel.synchrony() {
                Synchrony::Immediate => assert!(matches!(channel.fallback(), Response::Value(_))),
                Synchrony::FireAndForget | Synchrony::Deferred => {
                    assert_eq!(channel.fallback(), Response::Empty)
                }
            }
        }
    }
}
