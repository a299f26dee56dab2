//! Session store trait and error types.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// Errors that can occur during session store operations.
#[derive(Debug)]
pub enum SessionError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Session store connection error: {}", e),
            Self::OperationError(e) => write!(f, "Session store operation error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

/// Result type for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Server-held session state keyed by session id.
///
/// Sessions are never removed explicitly; each store expires them a fixed
/// TTL after their last save.
///
/// Each request loads its session once, works on a
/// [`crate::domain::SessionModel`], and writes it back when it changed.
///
/// # Implementations
///
/// - [`crate::infrastructure::session::MemorySessionStore`] - Process-local map with TTL
/// - [`crate::infrastructure::session::RedisSessionStore`] - Redis with TTL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the values stored for `session_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(values))` for a known session
    /// - `Ok(None)` for an unknown or expired session
    async fn load(&self, session_id: &str) -> SessionResult<Option<Map<String, Value>>>;

    /// Replaces the values stored for `session_id`.
    async fn save(&self, session_id: &str, values: &Map<String, Value>) -> SessionResult<()>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}
