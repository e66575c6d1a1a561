//! Session store: tracks live terminal connections and enforces the limit.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tutor_common::SessionId;

/// One accepted websocket with its own shell.
#[derive(Debug, Clone)]
pub struct Session {
    pub peer: SocketAddr,
    pub opened_at: Instant,
}

/// Thread-safe session store.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
        }
    }

    /// Reserve a slot for `peer`. Returns `None` when the store is full.
    pub async fn open(&self, peer: SocketAddr) -> Option<SessionId> {
        let mut map = self.sessions.write().await;
        if map.len() >= self.max_sessions {
            return None;
        }
        let id = SessionId::new();
        map.insert(
            id.clone(),
            Session {
                peer,
                opened_at: Instant::now(),
            },
        );
        Some(id)
    }

    /// Release a slot. Returns how long the session lived.
    pub async fn close(&self, id: &SessionId) -> Option<Duration> {
        let session = self.sessions.write().await.remove(id)?;
        Some(session.opened_at.elapsed())
    }

    /// Peers of every live session.
    pub async fn peers(&self) -> Vec<SocketAddr> {
        self.sessions.read().await.values().map(|s| s.peer).collect()
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn open_and_close() {
        let store = SessionStore::new(4);
        let id = store.open(peer(5000)).await.unwrap();
        assert_eq!(store.count().await, 1);
        assert_eq!(store.peers().await, vec![peer(5000)]);

        assert!(store.close(&id).await.is_some());
        assert_eq!(store.count().await, 0);
        assert!(store.close(&id).await.is_none());
    }

    #[tokio::test]
    async fn limit_is_enforced() {
        let store = SessionStore::new(2);
        let a = store.open(peer(1)).await.unwrap();
        let _b = store.open(peer(2)).await.unwrap();
        assert!(store.open(peer(3)).await.is_none());

        store.close(&a).await;
        assert!(store.open(peer(3)).await.is_some());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = SessionStore::new(8);
        let other = store.clone();
        store.open(peer(1)).await.unwrap();
        assert_eq!(other.count().await, 1);
        assert_eq!(other.max_sessions(), 8);
    }

    #[tokio::test]
    async fn ids_are_distinct() {
        let store = SessionStore::new(8);
        let a = store.open(peer(1)).await.unwrap();
        let b = store.open(peer(1)).await.unwrap();
        assert_ne!(a, b);
    }
}
