//! Infrastructure layer: adapters for the collaborators the core talks to.
//!
//! - [`session`] - Server-held session storage (Redis or in-memory)
//! - [`notify`] - Templated email delivery

pub mod notify;
pub mod session;
