//! Request context handed through the behaviour pipeline.

use serde_json::{Map, Value};

use crate::domain::return_path::ReturnPathToken;
use crate::domain::session::SessionModel;

/// Values exposed to the page template.
pub type Locals = Map<String, Value>;

/// Key under which the feedback link is exposed to templates.
pub const FEEDBACK_URL_LOCAL: &str = "feedbackUrl";

/// Addressing fields, form state and session for one request.
#[derive(Debug, Clone, Default)]
pub struct FormRequest {
    /// Mount path of the form application, possibly empty.
    pub base_url: String,
    /// Path below the mount.
    pub path: String,
    /// Path and query below the mount.
    pub url: String,
    /// Full incoming path and query, including the mount.
    pub original_url: String,
    /// Values already computed for the template by earlier render steps.
    pub locals: Locals,
    pub form: FormState,
    pub session: SessionModel,
}

impl FormRequest {
    /// Builds a request from the mount path and the full incoming path + query.
    pub fn new(base_url: impl Into<String>, original_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let original_url = original_url.into();

        let url = match original_url.strip_prefix(base_url.as_str()) {
            Some(rest) if !base_url.is_empty() && (rest.is_empty() || rest.starts_with(['/', '?'])) => {
                if rest.starts_with('/') {
                    rest.to_string()
                } else {
                    format!("/{}", rest)
                }
            }
            _ => original_url.clone(),
        };
        let path = url.split(['?', '#']).next().unwrap_or("/").to_string();

        Self {
            base_url,
            path,
            url,
            original_url,
            ..Self::default()
        }
    }

    pub fn with_values(mut self, values: Map<String, Value>) -> Self {
        self.form.values = values;
        self
    }

    pub fn with_session(mut self, session: SessionModel) -> Self {
        self.session = session;
        self
    }

    pub fn with_locals(mut self, locals: Locals) -> Self {
        self.locals = locals;
        self
    }
}

/// Submitted values and per-request options of the current step.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub values: Map<String, Value>,
    pub options: FormOptions,
}

/// Options that live for one request only and are never persisted.
#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    pub fields: Vec<String>,
    pub next: Option<String>,
    pub return_path_info: Option<ReturnPathToken>,
}
