use std::collections::HashMap;

use crate::login::LoginSession;

/// In-memory table of login sessions, keyed by session id.
///
/// Owned by the login worker; nothing else holds a reference to it.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, LoginSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: LoginSession) {
        self.sessions.insert(session.id().to_string(), session);
    }

    pub fn get(&self, id: &str) -> Option<&LoginSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LoginSession> {
        self.sessions.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<LoginSession> {
        self.sessions.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Ids of every stored session, in no particular order
    pub fn list(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = LoginSession> + '_ {
        self.sessions.drain().map(|(_, session)| session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::session::tests::session;

    #[test]
    fn test_insert_get_remove() {
        let mut store = SessionStore::new();
        assert!(store.is_empty());

        store.insert(session("a"));
        store.insert(session("b"));
        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
        assert_eq!(store.get("b").map(|s| s.id()), Some("b"));

        let mut ids = store.list();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut store = SessionStore::new();
        store.insert(session("a"));
        store.get_mut("a").unwrap().expire();
        assert!(!store.get("a").unwrap().is_pending());
    }

    #[test]
    fn test_drain_empties_store() {
        let mut store = SessionStore::new();
        store.insert(session("a"));
        assert_eq!(store.drain().count(), 1);
        assert!(store.is_empty());
    }
}
