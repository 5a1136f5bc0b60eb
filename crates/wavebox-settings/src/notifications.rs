//! Notification permissions
//!
//! | State   | Meaning                                  |
//! | Default | Site has not asked; page sees "default"  |
//! | Granted | Notifications shown                      |
//! | Denied  | Notifications silently dropped           |
//!
//! Permissions are keyed by origin and persisted on every change.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

use wavebox_storage::Database;

use crate::error::SettingsError;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPermission::Default => "default",
            NotificationPermission::Granted => "granted",
            NotificationPermission::Denied => "denied",
        }
    }
}

impl FromStr for NotificationPermission {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(NotificationPermission::Default),
            "granted" => Ok(NotificationPermission::Granted),
            "denied" => Ok(NotificationPermission::Denied),
            other => Err(SettingsError::InvalidPermission(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginPermission {
    pub origin: String,
    pub permission: NotificationPermission,
}

pub struct NotificationPermissionStore {
    db: Database,
    /// origin -> permission
    permissions: Arc<RwLock<HashMap<String, NotificationPermission>>>,
}

impl NotificationPermissionStore {
    pub fn load(db: Database) -> Result<Self> {
        let rows: Vec<(String, String)> = db.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT origin, permission FROM notification_permissions")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .filter_map(|r| r.ok())
                .collect();
            Ok(rows)
        })?;

        let mut permissions = HashMap::with_capacity(rows.len());
        for (origin, raw) in rows {
            match raw.parse::<NotificationPermission>() {
                Ok(permission) => {
                    permissions.insert(origin, permission);
                }
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Skipping stored permission");
                }
            }
        }

        Ok(Self {
            db,
            permissions: Arc::new(RwLock::new(permissions)),
        })
    }

    /// Serialized origin for a URL, `None` for opaque origins (data:, about:)
    pub fn origin_for_url(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let origin = parsed.origin();
        if !origin.is_tuple() {
            return None;
        }
        Some(origin.ascii_serialization())
    }

    pub fn permission_for_origin(&self, origin: &str) -> NotificationPermission {
        self.permissions
            .read()
            .get(origin)
            .copied()
            .unwrap_or_default()
    }

    pub fn permission_for_url(&self, url: &str) -> NotificationPermission {
        match Self::origin_for_url(url) {
            Some(origin) => self.permission_for_origin(&origin),
            None => NotificationPermission::Default,
        }
    }

    pub fn set_permission(&self, url: &str, permission: NotificationPermission) -> Result<()> {
        let origin = Self::origin_for_url(url)
            .ok_or_else(|| SettingsError::OpaqueOrigin(url.to_string()))?;

        if permission == NotificationPermission::Default {
            return self.clear_permission(url);
        }

        let updated_at = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO notification_permissions (origin, permission, updated_at)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![origin, permission.as_str(), updated_at],
            )?;
            Ok(())
        })?;

        tracing::info!(origin = %origin, permission = permission.as_str(), "Set notification permission");
        self.permissions.write().insert(origin, permission);
        Ok(())
    }

    pub fn clear_permission(&self, url: &str) -> Result<()> {
        let origin = Self::origin_for_url(url)
            .ok_or_else(|| SettingsError::OpaqueOrigin(url.to_string()))?;

        self.db.with_connection(|conn| {
            conn.execute(
                "DELETE FROM notification_permissions WHERE origin = ?1",
                [&origin],
            )?;
            Ok(())
        })?;

        self.permissions.write().remove(&origin);
        Ok(())
    }

    pub fn list(&self) -> Vec<OriginPermission> {
        let mut out: Vec<OriginPermission> = self
            .permissions
            .read()
            .iter()
            .map(|(origin, permission)| OriginPermission {
                origin: origin.clone(),
                permission: *permission,
            })
            .collect();
        out.sort_by(|a, b| a.origin.cmp(&b.origin));
        out
    }
}

impl Clone for NotificationPermissionStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            permissions: Arc::clone(&self.permissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permission() {
        let store = NotificationPermissionStore::load(Database::open_in_memory().unwrap()).unwrap();
        assert_eq!(
            store.permission_for_url("https://mail.google.com/mail/u/0"),
            NotificationPermission::Default
        );
        assert_eq!(
            store.permission_for_url("about:blank"),
            NotificationPermission::Default
        );
    }

    #[test]
    fn test_permission_is_per_origin() {
        let db = Database::open_in_memory().unwrap();
        let store = NotificationPermissionStore::load(db.clone()).unwrap();

        store
            .set_permission("https://mail.google.com/mail/u/0", NotificationPermission::Granted)
            .unwrap();

        assert_eq!(
            store.permission_for_url("https://mail.google.com/other"),
            NotificationPermission::Granted
        );
        assert_eq!(
            store.permission_for_url("http://mail.google.com/"),
            NotificationPermission::Default
        );

        // Survives a reload
        let reloaded = NotificationPermissionStore::load(db).unwrap();
        assert_eq!(
            reloaded.list(),
            vec![OriginPermission {
                origin: "https://mail.google.com".to_string(),
                permission: NotificationPermission::Granted,
            }]
        );
    }

    #[test]
    fn test_setting_default_clears() {
        let store = NotificationPermissionStore::load(Database::open_in_memory().unwrap()).unwrap();
        store
            .set_permission("https://slack.com", NotificationPermission::Denied)
            .unwrap();
        store
            .set_permission("https://slack.com", NotificationPermission::Default)
            .unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_opaque_origin_rejected() {
        let store = NotificationPermissionStore::load(Database::open_in_memory().unwrap()).unwrap();
        assert!(store
            .set_permission("data:text/html,hi", NotificationPermission::Granted)
            .is_err());
    }
}
