//! API route configuration.

use crate::api::handlers::health_handler;
use crate::state::AppState;
use axum::{Router, routing::get};

/// Public operational routes.
///
/// # Endpoints
///
/// - `GET /health` - Session store and notification status
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
