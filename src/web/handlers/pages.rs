//! Content page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Extension, OriginalUri, State},
    response::IntoResponse,
};

use super::{local_str, original_url};
use crate::domain::FormRequest;
use crate::domain::form::FEEDBACK_URL_LOCAL;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::middleware::SessionHandle;

/// Renders `templates/page.html` with the feedback link for this page.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
struct PageTemplate {
    path: String,
    feedback_url: String,
    back_link: Option<String>,
}

/// Renders any content page under the mount.
///
/// # Endpoint
///
/// `GET {BASE_PATH}/{*path}`
///
/// The page links to the feedback step; the link carries the return path
/// for this exact page and query.
pub async fn page_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse, AppError> {
    let mut req = FormRequest::new(state.base_path.as_str(), original_url(&uri))
        .with_session(session.snapshot());

    let locals = state.pages.render(&mut req)?;
    session.replace(req.session);

    Ok(PageTemplate {
        path: req.path,
        feedback_url: local_str(&locals, FEEDBACK_URL_LOCAL).unwrap_or_default(),
        back_link: local_str(&locals, "backLink"),
    })
}
