//! Wavebox Storage Layer
//!
//! SQLite persistence for settings snapshots and per-origin
//! notification permissions.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
