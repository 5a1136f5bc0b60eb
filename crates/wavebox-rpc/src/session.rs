//! Sessions and the connection registry

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Shell-assigned id of one embedded content context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for SessionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Sessions that completed the handshake and may call privileged channels
pub struct ConnectionRegistry {
    connected: Arc<RwLock<HashSet<SessionId>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connected: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Returns true if the session was not already connected
    pub fn connect(&self, session: SessionId) -> bool {
        self.connected.write().insert(session)
    }

    /// Returns true if the session was connected
    pub fn disconnect(&self, session: SessionId) -> bool {
        self.connected.write().remove(&session)
    }

    pub fn is_connected(&self, session: SessionId) -> bool {
        self.connected.read().contains(&session)
    }

    pub fn connected(&self) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self.connected.read().iter().copied().collect();
        sessions.sort();
        sessions
    }

    pub fn len(&self) -> usize {
        self.connected.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connected.read().is_empty()
    }

    pub fn clear(&self) {
        self.connected.write().clear();
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ConnectionRegistry {
    fn clone(&self) -> Self {
        Self {
            connected: Arc::clone(&self.connected),
        }
    }
}
