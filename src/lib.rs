//! # Feedback Return
//!
//! Return-path addressing for multi-step web forms. Every page links to a
//! feedback step; the link remembers exactly which page and query the user
//! came from, and the feedback step sends them back there afterwards,
//! optionally emailing the feedback along with that context.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - URL values, the return path token, request context
//! - **Application Layer** ([`application`]) - Behaviour pipeline, carrier and consumer
//! - **Infrastructure Layer** ([`infrastructure`]) - Session stores and the Notify client
//! - **Web Layer** ([`web`]) - Content pages, the feedback form, sessions
//! - **API Layer** ([`api`]) - Health check, tracing and rate limiting
//!
//! ## Return path token
//!
//! The token is `{baseUrl, path, url}` as unpadded base64url JSON, carried in
//! the `f_t` query parameter of the feedback link:
//!
//! ```text
//! /app-name/feedback?f_t=eyJiYXNlVXJsIjoiL2FwcC1uYW1lIiwicGF0aCI6Ii9zb21lLXBhZ2UiLCJ1cmwiOiIvYXBwLW5hbWUvc29tZS1wYWdlIn0
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export BASE_PATH="/app-name"
//! export FEEDBACK_CONFIG="feedback.json"   # Optional
//! export REDIS_URL="redis://localhost:6379" # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::{Pipeline, SetFeedbackReturnUrl, SubmitFeedback};
    pub use crate::domain::{ReturnPathToken, ReturnPathTransport, UrlValue};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
