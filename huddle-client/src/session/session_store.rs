use crate::session::{MediaSession, SessionKey, SessionKind};
use huddle_core::ConnectionId;
use std::collections::HashMap;

/// Sessions keyed by (peer, role). The key makes a second session of the
/// same role with the same peer unrepresentable.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<SessionKey, MediaSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SessionKey) -> Option<&MediaSession> {
        self.sessions.get(key)
    }

    pub fn get_mut(&mut self, key: &SessionKey) -> Option<&mut MediaSession> {
        self.sessions.get_mut(key)
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Stores a session unless one already exists under its key, in which
    /// case the rejected session is handed back.
    pub fn insert(&mut self, session: MediaSession) -> Result<(), MediaSession> {
        if self.sessions.contains_key(&session.key) {
            return Err(session);
        }
        self.sessions.insert(session.key, session);
        Ok(())
    }

    pub fn remove(&mut self, key: &SessionKey) -> Option<MediaSession> {
        self.sessions.remove(key)
    }

    pub fn keys_for_peer(&self, peer: ConnectionId) -> Vec<SessionKey> {
        let mut keys: Vec<_> = self
            .sessions
            .keys()
            .filter(|k| k.peer == peer)
            .copied()
            .collect();
        keys.sort();
        keys
    }

    pub fn keys_of_kind(&self, kind: SessionKind) -> Vec<SessionKey> {
        let mut keys: Vec<_> = self
            .sessions
            .keys()
            .filter(|k| k.kind == kind)
            .copied()
            .collect();
        keys.sort();
        keys
    }

    pub fn all_keys(&self) -> Vec<SessionKey> {
        let mut keys: Vec<_> = self.sessions.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
