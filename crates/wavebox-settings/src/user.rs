//! User settings store

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use wavebox_storage::Database;

use crate::Result;

const USER_SETTINGS_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Anonymous per-install identifier
    pub client_id: String,
    #[serde(default)]
    pub analytics_enabled: bool,
}

impl UserSettings {
    fn new() -> Self {
        Self {
            client_id: Uuid::new_v4().to_string(),
            analytics_enabled: false,
        }
    }
}

pub struct UserStore {
    db: Database,
    current: Arc<RwLock<UserSettings>>,
    launched: Arc<UserSettings>,
}

impl UserStore {
    /// Load the user settings, minting a client id on first run
    pub fn load(db: Database) -> Result<Self> {
        let settings = match db.get_json::<UserSettings>(USER_SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                let settings = UserSettings::new();
                db.set_json(USER_SETTINGS_KEY, &settings)?;
                tracing::info!(client_id = %settings.client_id, "Created user settings");
                settings
            }
            Err(e) => {
                tracing::warn!(error = %e, "Replacing unreadable user settings");
                let settings = UserSettings::new();
                db.set_json(USER_SETTINGS_KEY, &settings)?;
                settings
            }
        };

        Ok(Self {
            db,
            launched: Arc::new(settings.clone()),
            current: Arc::new(RwLock::new(settings)),
        })
    }

    pub fn user(&self) -> UserSettings {
        self.current.read().clone()
    }

    pub fn launched(&self) -> &UserSettings {
        &self.launched
    }

    pub fn launch_settings_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.launched.as_ref())?)
    }

    pub fn set_analytics_enabled(&self, enabled: bool) -> Result<()> {
        let mut current = self.current.write();
        if current.analytics_enabled == enabled {
            return Ok(());
        }

        let mut next = current.clone();
        next.analytics_enabled = enabled;
        self.db.set_json(USER_SETTINGS_KEY, &next)?;
        *current = next;
        Ok(())
    }
}

impl Clone for UserStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            current: Arc::clone(&self.current),
            launched: Arc::clone(&self.launched),
        }
    }
}
