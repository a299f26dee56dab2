//! Web-specific middleware.

pub mod session;

pub use session::{SESSION_COOKIE, SessionHandle};
