// ============================
// parley-backend-lib/src/registry.rs
// ============================
//! The session registry: authoritative connection-id -> username mapping
//! for all currently live connections. Owned by the broadcast hub task, so
//! every operation is serialized with registration, cleanup, and fan-out.

use parley_common::ConnId;
use std::collections::{HashMap, HashSet};

/// Live session table. A username may appear under several connection ids
/// at once (multiple devices or tabs); "online" means any live session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnId, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a username with a connection. Re-registering the same
    /// connection id overwrites the prior username.
    pub fn register(&mut self, conn: ConnId, username: String) {
        self.sessions.insert(conn, username);
    }

    /// Remove the mapping for a connection, returning the username it held.
    /// No-op (`None`) if the connection was never registered or already
    /// removed, so close-path cleanup is safe to run once per transport
    /// close report.
    pub fn unregister(&mut self, conn: ConnId) -> Option<String> {
        self.sessions.remove(&conn)
    }

    /// True iff at least one live session maps to this username.
    pub fn is_online(&self, username: &str) -> bool {
        self.sessions.values().any(|name| name == username)
    }

    /// The set of usernames with at least one live session.
    pub fn snapshot(&self) -> HashSet<String> {
        self.sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_register_and_online_status() {
        let mut registry = SessionRegistry::new();
        let conn = Uuid::new_v4();

        assert!(!registry.is_online("alice"));
        registry.register(conn, "alice".to_string());
        assert!(registry.is_online("alice"));
        assert!(!registry.is_online("bob"));
    }

    #[test]
    fn test_unregister_removes_mapping() {
        let mut registry = SessionRegistry::new();
        let conn = Uuid::new_v4();

        registry.register(conn, "alice".to_string());
        assert_eq!(registry.unregister(conn), Some("alice".to_string()));
        assert!(!registry.is_online("alice"));
    }

    #[test]
    fn test_unregister_unknown_connection_is_noop() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.unregister(Uuid::new_v4()), None);

        let conn = Uuid::new_v4();
        registry.register(conn, "alice".to_string());
        registry.unregister(conn);
        // second close report for the same connection
        assert_eq!(registry.unregister(conn), None);
    }

    #[test]
    fn test_reregister_overwrites_username() {
        let mut registry = SessionRegistry::new();
        let conn = Uuid::new_v4();

        registry.register(conn, "alice".to_string());
        registry.register(conn, "alicia".to_string());

        assert!(!registry.is_online("alice"));
        assert!(registry.is_online("alicia"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_multiple_sessions_per_username() {
        let mut registry = SessionRegistry::new();
        let phone = Uuid::new_v4();
        let laptop = Uuid::new_v4();

        registry.register(phone, "alice".to_string());
        registry.register(laptop, "alice".to_string());

        // closing one device keeps alice online
        registry.unregister(phone);
        assert!(registry.is_online("alice"));

        registry.unregister(laptop);
        assert!(!registry.is_online("alice"));
    }

    #[test]
    fn test_snapshot_collapses_duplicates() {
        let mut registry = SessionRegistry::new();
        registry.register(Uuid::new_v4(), "alice".to_string());
        registry.register(Uuid::new_v4(), "alice".to_string());
        registry.register(Uuid::new_v4(), "bob".to_string());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("alice"));
        assert!(snapshot.contains("bob"));
        assert_eq!(registry.len(), 3);
    }
}
