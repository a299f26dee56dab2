//! Top-level router configuration combining the form application and the API.
//!
//! # Route Structure
//!
//! - `GET  {BASE_PATH}/{*path}`          - Content pages with a feedback link
//! - `GET  {BASE_PATH}{FEEDBACK_PATH}`   - Feedback form
//! - `POST {BASE_PATH}{FEEDBACK_PATH}`   - Feedback submission (rate limited)
//! - `GET  /health`                      - Session store and notify status
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Sessions** - `sid` cookie backed session for form routes
//! - **Rate limiting** - Per-IP token bucket on submissions
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use crate::web;
use crate::web::middleware::session;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Submissions are rate limited per peer IP, so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>`.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(service_router(state, true))
}

/// Builds the routes, optionally without rate limiting.
///
/// The unlimited variant needs no connect info and is what tests drive.
pub fn service_router(state: AppState, rate_limited: bool) -> Router {
    let submit = web::routes::submit_routes(&state.feedback_path);
    let submit = if rate_limited {
        submit.layer(rate_limit::submit_layer())
    } else {
        submit
    };

    let forms = web::routes::page_routes(&state.feedback_path)
        .merge(submit)
        .layer(middleware::from_fn_with_state(state.clone(), session::layer));

    let mounted = if state.base_path.is_empty() {
        forms
    } else {
        Router::new().nest(&state.base_path, forms)
    };

    Router::new()
        .merge(api::routes::public_routes())
        .merge(mounted)
        .with_state(state)
        .layer(tracing::layer())
}
