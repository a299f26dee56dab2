//! Session storage for the web layer.
//!
//! Provides a [`SessionStore`] trait with two implementations:
//! - [`RedisSessionStore`] - Production Redis-backed store
//! - [`MemorySessionStore`] - In-process store for development and tests

mod memory_store;
mod redis_store;
mod service;

pub use memory_store::MemorySessionStore;
pub use redis_store::RedisSessionStore;
pub use service::{SessionError, SessionResult, SessionStore};

#[cfg(test)]
pub use service::MockSessionStore;
