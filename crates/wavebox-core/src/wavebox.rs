//! Main application state container

use std::sync::Arc;

use wavebox_autofill::{AutofillService, CredentialStore, KeychainWindows};
use wavebox_extensions::ExtensionRegistry;
use wavebox_rpc::{
    ContentHost, ExternalOpener, LinkOpener, PlatformInfo, Relauncher, RpcRouter, Services,
};
use wavebox_settings::{NotificationPermissionStore, SettingsStore, UserStore};
use wavebox_storage::Database;

use crate::config::Config;
use crate::distribution::DistributionConfig;
use crate::Result;

/// Shell primitives the router needs but core cannot provide
#[derive(Clone)]
pub struct ShellBindings {
    pub host: Arc<dyn ContentHost>,
    pub links: Arc<dyn LinkOpener>,
    pub shell: Arc<dyn ExternalOpener>,
    pub relauncher: Arc<dyn Relauncher>,
}

pub struct Wavebox {
    config: Config,
    db: Database,
    settings: SettingsStore,
    user: UserStore,
    notifications: NotificationPermissionStore,
    extensions: ExtensionRegistry,
    distribution: DistributionConfig,
}

impl Wavebox {
    /// Open storage under the configured data dir and load every store
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db = Database::open(&config.database_path)?;
        let distribution = DistributionConfig::load(&config.distribution_config_path)?;
        Self::with_database(config, db, distribution)
    }

    pub fn with_database(config: Config, db: Database, distribution: DistributionConfig) -> Result<Self> {
        let settings = SettingsStore::load(db.clone())?;
        let user = UserStore::load(db.clone())?;
        let notifications = NotificationPermissionStore::load(db.clone())?;
        let extensions = ExtensionRegistry::new();
        extensions.load_dir(&config.extensions_dir)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            snap = distribution.is_snap_install(),
            proxy_mode = %settings.launched().proxy_mode,
            extensions = extensions.len(),
            "Wavebox initialized"
        );

        Ok(Self {
            config,
            db,
            settings,
            user,
            notifications,
            extensions,
            distribution,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn user(&self) -> &UserStore {
        &self.user
    }

    pub fn notifications(&self) -> &NotificationPermissionStore {
        &self.notifications
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn distribution(&self) -> &DistributionConfig {
        &self.distribution
    }

    // === Wiring ===

    pub fn rpc_services(&self, bindings: ShellBindings) -> Services {
        Services {
            settings: Arc::new(self.settings.clone()),
            user: Arc::new(self.user.clone()),
            extensions: Arc::new(self.extensions.clone()),
            notifications: Arc::new(self.notifications.clone()),
            host: bindings.host,
            links: bindings.links,
            shell: bindings.shell,
            updates: Arc::new(self.distribution.clone()),
            relauncher: bindings.relauncher,
            platform: PlatformInfo::current(),
        }
    }

    pub fn router(&self, bindings: ShellBindings) -> RpcRouter {
        RpcRouter::new(self.rpc_services(bindings))
    }

    pub fn autofill_service(
        &self,
        credentials: Option<Arc<dyn CredentialStore>>,
        windows: Arc<dyn KeychainWindows>,
    ) -> AutofillService {
        AutofillService::new(
            credentials,
            windows,
            self.settings.clone(),
            self.distribution.is_snap_install(),
        )
    }
}
