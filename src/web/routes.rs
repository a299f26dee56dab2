//! Form application route configuration.

use crate::state::AppState;
use crate::web::handlers::{feedback_form_handler, page_handler, submit_feedback_handler};
use axum::{
    Router,
    routing::{get, post},
};

/// Routes that only read.
///
/// # Endpoints
///
/// - `GET /` - Content page at the mount root
/// - `GET /{*path}` - Any other content page
/// - `GET {feedback_path}` - Feedback form
pub fn page_routes(feedback_path: &str) -> Router<AppState> {
    Router::new()
        .route("/", get(page_handler))
        .route("/{*path}", get(page_handler))
        .route(feedback_path, get(feedback_form_handler))
}

/// Routes that accept submissions.
///
/// # Endpoints
///
/// - `POST {feedback_path}` - Feedback submission
pub fn submit_routes(feedback_path: &str) -> Router<AppState> {
    Router::new().route(feedback_path, post(submit_feedback_handler))
}
