//! Guest webview table
//!
//! Maps webview labels to the session ids the router knows them by. Ids
//! are handed out once per label and never reused within a run.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use wavebox_core::SessionId;

/// Labels of shell-created guests. Other webviews (the UI) are not guests.
pub const GUEST_LABEL_PREFIX: &str = "guest-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestEntry {
    pub session: SessionId,
    pub label: String,
    pub window_label: String,
    /// URL the guest was created for
    pub host_url: Option<String>,
}

#[derive(Default)]
struct GuestTable {
    by_session: HashMap<SessionId, GuestEntry>,
    by_label: HashMap<String, SessionId>,
}

pub struct GuestRegistry {
    table: Arc<RwLock<GuestTable>>,
    next_id: Arc<AtomicU32>,
    next_label: Arc<AtomicU32>,
}

impl GuestRegistry {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(GuestTable::default())),
            next_id: Arc::new(AtomicU32::new(1)),
            next_label: Arc::new(AtomicU32::new(1)),
        }
    }

    fn next_session(&self) -> SessionId {
        SessionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn guest_label(&self, window_label: &str) -> String {
        let n = self.next_label.fetch_add(1, Ordering::Relaxed);
        format!("{GUEST_LABEL_PREFIX}{window_label}-{n}")
    }

    /// Record a guest created by the shell
    pub fn register(&self, label: &str, window_label: &str, host_url: Option<String>) -> SessionId {
        let mut table = self.table.write();
        if let Some(existing) = table.by_label.get(label).copied() {
            return existing;
        }

        let session = self.next_session();
        table.by_label.insert(label.to_string(), session);
        table.by_session.insert(
            session,
            GuestEntry {
                session,
                label: label.to_string(),
                window_label: window_label.to_string(),
                host_url,
            },
        );
        session
    }

    /// Session for any webview that calls in. Shell webviews are registered
    /// on first contact so deferred replies can reach them. A guest label
    /// that is no longer registered was closed, and gets a fresh id that is
    /// never recorded.
    pub fn caller_session(&self, label: &str, window_label: &str) -> SessionId {
        if let Some(session) = self.session_of(label) {
            return session;
        }
        if label.starts_with(GUEST_LABEL_PREFIX) {
            return self.next_session();
        }
        self.register(label, window_label, None)
    }

    pub fn session_of(&self, label: &str) -> Option<SessionId> {
        self.table.read().by_label.get(label).copied()
    }

    pub fn get(&self, session: SessionId) -> Option<GuestEntry> {
        self.table.read().by_session.get(&session).cloned()
    }

    pub fn remove_label(&self, label: &str) -> Option<GuestEntry> {
        let mut table = self.table.write();
        let session = table.by_label.remove(label)?;
        table.by_session.remove(&session)
    }

    pub fn remove_window(&self, window_label: &str) -> Vec<GuestEntry> {
        let mut table = self.table.write();
        let sessions: Vec<SessionId> = table
            .by_session
            .values()
            .filter(|entry| entry.window_label == window_label)
            .map(|entry| entry.session)
            .collect();

        let mut removed = Vec::with_capacity(sessions.len());
        for session in sessions {
            if let Some(entry) = table.by_session.remove(&session) {
                table.by_label.remove(&entry.label);
                removed.push(entry);
            }
        }
        removed.sort_by_key(|entry| entry.session);
        removed
    }

    pub fn list(&self) -> Vec<GuestEntry> {
        let mut entries: Vec<GuestEntry> = self.table.read().by_session.values().cloned().collect();
        entries.sort_by_key(|entry| entry.session);
        entries
    }
}

impl Default for GuestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GuestRegistry {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            next_id: Arc::clone(&self.next_id),
            next_label: Arc::clone(&self.next_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_stable_per_label() {
        let guests = GuestRegistry::new();
        let a = guests.register("guest-main-1", "main", Some("https://mail.google.com/".to_string()));
        let again = guests.register("guest-main-1", "main", None);
        let b = guests.register("guest-main-2", "main", None);

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(
            guests.get(a).and_then(|entry| entry.host_url),
            Some("https://mail.google.com/".to_string())
        );
    }

    #[test]
    fn test_shell_webviews_get_a_session() {
        let guests = GuestRegistry::new();
        let ui = guests.caller_session("ui-main", "main");
        assert_eq!(guests.caller_session("ui-main", "main"), ui);
        assert_eq!(guests.get(ui).and_then(|entry| entry.host_url), None);
    }

    #[test]
    fn test_closed_guest_is_not_registered_again() {
        let guests = GuestRegistry::new();
        let label = guests.guest_label("main");
        let session = guests.register(&label, "main", Some("https://mail.google.com/".to_string()));
        guests.remove_label(&label);

        let late = guests.caller_session(&label, "main");
        assert_ne!(late, session);
        assert_eq!(guests.get(late), None);
        assert_eq!(guests.session_of(&label), None);
        assert!(guests.list().is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let guests = GuestRegistry::new();
        let first = guests.register("guest-main-1", "main", None);
        guests.remove_label("guest-main-1");
        let second = guests.register("guest-main-1", "main", None);
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_window_only_touches_that_window() {
        let guests = GuestRegistry::new();
        let a = guests.register("guest-main-1", "main", None);
        let b = guests.register("guest-main-2", "main", None);
        let other = guests.register("guest-second-3", "second", None);

        let removed: Vec<SessionId> = guests
            .remove_window("main")
            .into_iter()
            .map(|entry| entry.session)
            .collect();
        assert_eq!(removed, vec![a, b]);
        assert_eq!(guests.session_of("guest-main-1"), None);
        assert_eq!(guests.session_of("guest-second-3"), Some(other));
    }
}
