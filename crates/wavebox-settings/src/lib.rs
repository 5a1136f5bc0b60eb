//! Wavebox Settings
//!
//! Stores the router and shell read from:
//! - App settings, with the snapshot the process was launched with
//! - User settings (client id, analytics opt-in)
//! - Per-origin notification permissions
//!
//! Every mutation is persisted immediately. Values that only apply on the
//! next launch (proxy configuration) are read from the launched snapshot.

mod app;
mod error;
mod notifications;
mod user;

pub use app::{AppSettings, ProxyMode, ProxySettings, SettingsStore};
pub use error::SettingsError;
pub use notifications::{NotificationPermission, NotificationPermissionStore, OriginPermission};
pub use user::{UserSettings, UserStore};

pub type Result<T> = std::result::Result<T, SettingsError>;
