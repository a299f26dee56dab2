//! In-process session store.

use super::service::{SessionResult, SessionStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct Entry {
    values: Map<String, Value>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// A session store backed by a map inside the process.
///
/// Sessions are lost on restart and are not shared between instances. Like
/// the Redis store, every save resets the session's TTL; expired sessions
/// load as unknown and are pruned on the next save.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Integration tests
/// - Fallback when the Redis connection fails at startup
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Creates an empty store whose sessions live `ttl_seconds` after their
    /// last save.
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_ttl(Duration::from_secs(ttl_seconds))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        debug!(
            "Using MemorySessionStore (sessions are process-local, TTL: {}s)",
            ttl.as_secs()
        );
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of sessions currently held, expired ones included until pruned.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> SessionResult<Option<Map<String, Value>>> {
        let now = Instant::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.values.clone()))
    }

    async fn save(&self, session_id: &str, values: &Map<String, Value>) -> SessionResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live(now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} expired sessions", pruned);
        }

        sessions.insert(
            session_id.to_string(),
            Entry {
                values: values.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
