//! Feedback step handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Extension, OriginalUri, State},
    response::{IntoResponse, Redirect},
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::info;

use super::{local_str, original_url};
use crate::domain::FormRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::middleware::SessionHandle;

/// Renders `templates/feedback.html`.
#[derive(Template, WebTemplate)]
#[template(path = "feedback.html")]
struct FeedbackTemplate {
    action: String,
    fields: Vec<String>,
    back_link: Option<String>,
}

/// Renders the feedback form.
///
/// # Endpoint
///
/// `GET {BASE_PATH}{FEEDBACK_PATH}`
///
/// The form posts back to the exact URL it was served from, so a return
/// path token in the query string survives the submission. The back link
/// points at the page the user came from when a token is present.
pub async fn feedback_form_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse, AppError> {
    let mut req = FormRequest::new(state.base_path.as_str(), original_url(&uri))
        .with_session(session.snapshot());

    let locals = state.feedback.render(&mut req)?;
    session.replace(req.session);

    Ok(FeedbackTemplate {
        action: req.original_url,
        fields: req.form.options.fields,
        back_link: local_str(&locals, "backLink"),
    })
}

/// Handles a feedback submission.
///
/// # Endpoint
///
/// `POST {BASE_PATH}{FEEDBACK_PATH}`
///
/// # Response Codes
///
/// - **303 See Other**: Feedback accepted, redirect to the return path or the
///   default next step
/// - **500 Internal Server Error**: The feedback email could not be sent
pub async fn submit_feedback_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let values: Map<String, Value> = form
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    let mut req = FormRequest::new(state.base_path.as_str(), original_url(&uri))
        .with_values(values)
        .with_session(session.snapshot());

    let next = state.feedback.submit(&mut req).await?;
    session.replace(req.session);

    info!("Feedback submitted, continuing to {}", next);
    Ok(Redirect::to(&next))
}
