//! Wavebox Core
//!
//! Opens storage, loads the stores and wires them into the request router
//! and the autofill service. The desktop shell owns one `Wavebox` for the
//! lifetime of the process.

mod config;
mod distribution;
mod error;
mod wavebox;

pub use config::Config;
pub use distribution::DistributionConfig;
pub use error::CoreError;
pub use wavebox::{ShellBindings, Wavebox};

// Re-export core components
pub use wavebox_autofill::{AutofillError, AutofillService, Credential, CredentialStore, KeychainWindows, ManagerMode};
pub use wavebox_extensions::{ExtensionRegistry, ExtensionRuntime, EXTENSION_PROTOCOL};
pub use wavebox_rpc::{
    ContentHost, ExternalOpener, LinkOpener, OpenExternalOptions, PackageManager, ReadingItem,
    RecentItem, Relauncher, Response, RpcError, RpcRouter, SessionId,
};
pub use wavebox_settings::{
    AppSettings, NotificationPermission, NotificationPermissionStore, OriginPermission, ProxyMode,
    ProxySettings, SettingsError, SettingsStore, UserSettings, UserStore,
};
pub use wavebox_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
