//! HTML handlers for content pages and the feedback step.

mod feedback;
mod pages;

pub use feedback::{feedback_form_handler, submit_feedback_handler};
pub use pages::page_handler;

use axum::http::Uri;
use serde_json::Value;

use crate::domain::Locals;

/// Path and query of the incoming request, including any mount prefix.
fn original_url(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

fn local_str(locals: &Locals, key: &str) -> Option<String> {
    locals.get(key).and_then(Value::as_str).map(str::to_string)
}
