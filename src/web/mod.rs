//! HTML surface of the form application.
//!
//! Content pages link to the feedback step; the feedback step collects the
//! feedback and sends the user back. Uses Askama templates for server-side
//! rendering.
//!
//! # Modules
//!
//! - [`handlers`] - Template rendering and submission handlers
//! - [`middleware`] - Cookie-backed sessions
//! - [`routes`] - Route configuration

pub mod handlers;
pub mod middleware;
pub mod routes;
