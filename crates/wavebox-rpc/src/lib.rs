//! Wavebox RPC
//!
//! Routes requests from embedded content contexts (guest pages, extension
//! pages) to the stores and shell primitives that answer them.
//!
//! - A connection registry decides which sessions may call privileged channels
//! - Each channel has exactly one handler, bound when the router is built
//! - Handlers answer immediately, not at all, or later on a reply channel
//! - Dispatch never fails: errors degrade to the channel's fallback value

mod channel;
mod error;
mod handlers;
mod payload;
mod router;
mod services;
mod session;

#[cfg(test)]
mod fakes;

pub use channel::{Channel, Synchrony};
pub use error::RpcError;
pub use handlers::{Handler, HandlerContext};
pub use payload::{
    ExtensionPreloadConfig, GuestPreloadConfig, OpenExternalOptions, PackageManager,
    ReadingItem, RecentItem, UpdaterConfig,
};
pub use router::{Response, RpcRouter, RELAUNCH_DELAY};
pub use services::{
    ContentHost, ExtensionRuntimes, ExternalOpener, LinkOpener, NotificationPermissions,
    PlatformInfo, Relauncher, Services, SettingsProvider, UpdateCapabilities, UserProvider,
};
pub use session::{ConnectionRegistry, SessionId};

pub type Result<T> = std::result::Result<T, RpcError>;
