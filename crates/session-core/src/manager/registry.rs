//! Session registry
//!
//! Owns the sid → session map and the peer → sessions index. Both views
//! live behind one lock so they update atomically: a session is reachable
//! by sid exactly when it is reachable through its peer's index entry. Only
//! the dispatcher mutates the registry - on session creation, on a
//! responder identity update, and on a session's terminal notification -
//! which is what makes lookups safe against concurrent removal.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::errors::{SessionError, SessionResult};
use crate::session::Session;

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<String, Arc<Session>>,
    peers: HashMap<String, Vec<Arc<Session>>>,
}

/// The manager's session table and peer index.
pub(crate) struct SessionRegistry {
    inner: RwLock<RegistryInner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Register a session under its sid and its current peer.
    pub fn insert(&self, session: Arc<Session>) -> SessionResult<()> {
        let sid = session.sid().to_string();
        let peer = session.peer();
        let mut inner = self.inner.write();
        if inner.sessions.contains_key(&sid) {
            return Err(SessionError::DuplicateSession { sid });
        }
        inner.sessions.insert(sid, session.clone());
        inner.peers.entry(peer).or_default().push(session);
        Ok(())
    }

    /// Remove a session from both views. Returns the removed session.
    pub fn remove(&self, sid: &str) -> Option<Arc<Session>> {
        let mut inner = self.inner.write();
        let session = inner.sessions.remove(sid)?;
        let peer = session.peer();
        if let Some(bucket) = inner.peers.get_mut(&peer) {
            bucket.retain(|entry| entry.sid() != sid);
            if bucket.is_empty() {
                inner.peers.remove(&peer);
            }
        }
        debug!(sid, "session removed from registry");
        Some(session)
    }

    /// Move a session between peer index buckets after an identity update.
    pub fn reindex_peer(&self, sid: &str, old_peer: &str, new_peer: &str) {
        let mut inner = self.inner.write();
        let Some(session) = inner.sessions.get(sid).cloned() else {
            return;
        };
        if let Some(bucket) = inner.peers.get_mut(old_peer) {
            bucket.retain(|entry| entry.sid() != sid);
            if bucket.is_empty() {
                inner.peers.remove(old_peer);
            }
        }
        inner.peers.entry(new_peer.to_string()).or_default().push(session);
    }

    pub fn get(&self, sid: &str) -> Option<Arc<Session>> {
        self.inner.read().sessions.get(sid).cloned()
    }

    pub fn peer_sessions(&self, peer: &str) -> Vec<Arc<Session>> {
        self.inner
            .read()
            .peers
            .get(peer)
            .cloned()
            .unwrap_or_default()
    }

    pub fn all(&self) -> Vec<Arc<Session>> {
        self.inner.read().sessions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }
}
