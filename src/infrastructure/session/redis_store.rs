//! Redis-backed session store.

use super::service::{SessionError, SessionResult, SessionStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

/// Redis session store with a sliding TTL.
///
/// Uses `ConnectionManager` for connection reuse. Reads are fail-open: a Redis
/// error is logged and the session is treated as new. Writes report errors so
/// the caller can log them.
pub struct RedisSessionStore {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisSessionStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `ttl_seconds` - lifetime of a session after its last write;
    ///   controlled via `SESSION_TTL_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> SessionResult<Self> {
        info!("Connecting to Redis session store");

        let client = Client::open(redis_url).map_err(|e| {
            SessionError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            SessionError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| SessionError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis session store");

        Ok(Self {
            client: manager,
            ttl_seconds,
            key_prefix: "session:".to_string(),
        })
    }

    fn build_key(&self, session_id: &str) -> String {
        format!("{}{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> SessionResult<Option<Map<String, Value>>> {
        let key = self.build_key(session_id);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(values) => {
                    debug!("Session HIT: {}", key);
                    Ok(Some(values))
                }
                Err(e) => {
                    warn!("Discarding unreadable session {}: {}", key, e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!("Session MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn save(&self, session_id: &str, values: &Map<String, Value>) -> SessionResult<()> {
        let key = self.build_key(session_id);
        let mut conn = self.client.clone();
        let raw = serde_json::to_string(values)
            .map_err(|e| SessionError::OperationError(e.to_string()))?;

        conn.set_ex::<_, _, ()>(&key, raw, self.ttl_seconds)
            .await
            .map_err(|e| SessionError::OperationError(format!("Redis SET failed: {}", e)))?;

        debug!("Session SET: {} (TTL: {}s)", key, self.ttl_seconds);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
