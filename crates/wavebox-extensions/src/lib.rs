//! Wavebox Extension Runtimes
//!
//! Tracks the installed extensions that have a live runtime, and answers
//! the lookups guest preloads make when they boot: does this extension
//! have a runtime, what config do its content scripts need, and which
//! content context hosts its background page.

mod error;
mod loader;
mod registry;
mod runtime;

pub use error::ExtensionError;
pub use loader::MANIFEST_FILE;
pub use registry::ExtensionRegistry;
pub use runtime::{ContentScript, ContentScriptGuestConfig, ExtensionRuntime, RunAt, RuntimeConfig};

/// URL scheme extension pages are served from
pub const EXTENSION_PROTOCOL: &str = "chrome-extension";

pub type Result<T> = std::result::Result<T, ExtensionError>;
