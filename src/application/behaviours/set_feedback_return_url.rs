//! Attaches a return-path token to the feedback link of every page.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::application::pipeline::{Behaviour, Next};
use crate::domain::form::FEEDBACK_URL_LOCAL;
use crate::domain::{
    FormRequest, Locals, RETURN_PATH_PARAM, RETURN_PATH_SESSION_KEY, ReturnPathToken,
    ReturnPathTransport, UrlValue,
};
use crate::error::AppError;

/// Default feedback step below the mount.
pub const DEFAULT_FEEDBACK_PATH: &str = "/feedback";

/// Exposes `feedbackUrl` to the template, carrying where the user came from.
///
/// The link is an explicit `feedbackUrl` local when an earlier render step
/// set one, otherwise `{baseUrl}/feedback`. Nothing is attached when the
/// request is already on the feedback page, so the token never points at
/// the feedback page itself.
#[derive(Debug, Clone)]
pub struct SetFeedbackReturnUrl {
    transport: ReturnPathTransport,
    feedback_path: String,
}

impl SetFeedbackReturnUrl {
    pub fn new(transport: ReturnPathTransport) -> Self {
        Self {
            transport,
            feedback_path: DEFAULT_FEEDBACK_PATH.to_string(),
        }
    }

    pub fn with_feedback_path(mut self, feedback_path: impl Into<String>) -> Self {
        self.feedback_path = feedback_path.into();
        self
    }

    /// Computes the feedback link for this request and records the return
    /// path through the configured transport.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the feedback link or the request URL
    /// cannot be parsed.
    pub fn feedback_url(&self, req: &mut FormRequest) -> Result<String, AppError> {
        let feedback_url = req
            .locals
            .get(FEEDBACK_URL_LOCAL)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{}", req.base_url, self.feedback_path));

        let mut target = UrlValue::parse(&feedback_url)?;
        let current = UrlValue::parse(&req.original_url)?;

        if current.same_location(&target) {
            debug!("Already on feedback page {}, no return path attached", feedback_url);
            return Ok(feedback_url);
        }

        let token = ReturnPathToken::new(
            Some(&req.base_url),
            Some(&req.path),
            Some(&req.original_url),
        )?;

        metrics::counter!(
            "return_path_tokens_attached_total",
            "transport" => self.transport.as_str()
        )
        .increment(1);

        match self.transport {
            ReturnPathTransport::Query => {
                target.set_param(RETURN_PATH_PARAM, &token.encode());
                Ok(target.to_string())
            }
            ReturnPathTransport::Session => {
                req.session.set(RETURN_PATH_SESSION_KEY, token.to_value());
                Ok(feedback_url)
            }
        }
    }
}

#[async_trait]
impl Behaviour for SetFeedbackReturnUrl {
    fn name(&self) -> &'static str {
        "set-feedback-return-url"
    }

    fn locals(&self, req: &mut FormRequest, next: Next<'_>) -> Result<Locals, AppError> {
        let feedback_url = self.feedback_url(req)?;
        let mut locals = next.locals(req)?;
        locals.insert(FEEDBACK_URL_LOCAL.to_string(), Value::String(feedback_url));
        Ok(locals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::controller::StepController;
    use crate::application::pipeline::Pipeline;
    use serde_json::json;
    use std::sync::Arc;

    const FULL_TOKEN: &str = "eyJiYXNlVXJsIjoiL2FwcC1uYW1lIiwicGF0aCI6Ii9zb21lLXBhZ2UiLCJ1cmwiOiIvYXBwLW5hbWUvc29tZS1wYWdlIn0";

    fn pipeline(transport: ReturnPathTransport) -> Pipeline {
        Pipeline::new(Arc::new(StepController::default())).with(SetFeedbackReturnUrl::new(transport))
    }

    fn some_page() -> FormRequest {
        FormRequest::new("/app-name", "/app-name/some-page")
    }

    fn with_feedback_local(req: FormRequest, url: &str) -> FormRequest {
        let mut locals = Locals::new();
        locals.insert(FEEDBACK_URL_LOCAL.to_string(), json!(url));
        locals.insert("foo".to_string(), json!("bar"));
        req.with_locals(locals)
    }

    #[test]
    fn test_default_feedback_url_carries_token() {
        let mut req = some_page();
        let locals = pipeline(ReturnPathTransport::Query).locals(&mut req).unwrap();

        assert_eq!(
            locals[FEEDBACK_URL_LOCAL],
            format!("/app-name/feedback?f_t={}", FULL_TOKEN)
        );
        assert_eq!(locals["baseUrl"], "/app-name");
    }

    #[test]
    fn test_token_decodes_to_request_triple() {
        let mut req = some_page();
        let url = SetFeedbackReturnUrl::new(ReturnPathTransport::Query)
            .feedback_url(&mut req)
            .unwrap();

        let token = UrlValue::parse(&url).unwrap().get_param(RETURN_PATH_PARAM);
        let decoded = ReturnPathToken::decode(token.as_deref()).unwrap().unwrap();

        assert_eq!(decoded.base_url(), Some("/app-name"));
        assert_eq!(decoded.path(), Some("/some-page"));
        assert_eq!(decoded.url(), Some("/app-name/some-page"));
    }

    #[test]
    fn test_missing_base_url_is_left_out_of_token() {
        let mut req = FormRequest {
            base_url: String::new(),
            path: "/some-page".to_string(),
            url: "/some-page".to_string(),
            original_url: "/app-name/some-page".to_string(),
            ..FormRequest::default()
        };

        let url = SetFeedbackReturnUrl::new(ReturnPathTransport::Query)
            .feedback_url(&mut req)
            .unwrap();

        assert_eq!(
            url,
            "/feedback?f_t=eyJwYXRoIjoiL3NvbWUtcGFnZSIsInVybCI6Ii9hcHAtbmFtZS9zb21lLXBhZ2UifQ"
        );
        let token = UrlValue::parse(&url).unwrap().get_param(RETURN_PATH_PARAM);
        let decoded = ReturnPathToken::decode(token.as_deref()).unwrap().unwrap();
        assert_eq!(decoded.base_url(), None);
        assert_eq!(decoded.path(), Some("/some-page"));
    }

    #[test]
    fn test_explicit_feedback_url_takes_priority() {
        let mut req = with_feedback_local(some_page(), "/feedback2");
        let locals = pipeline(ReturnPathTransport::Query).locals(&mut req).unwrap();

        assert_eq!(
            locals[FEEDBACK_URL_LOCAL],
            format!("/feedback2?f_t={}", FULL_TOKEN)
        );
        assert_eq!(locals["foo"], "bar");
    }

    #[test]
    fn test_existing_query_params_are_kept() {
        let mut req = with_feedback_local(
            some_page(),
            "https://forms.example.org/feedback?lang=cy&f_t=stale",
        );
        let url = SetFeedbackReturnUrl::new(ReturnPathTransport::Query)
            .feedback_url(&mut req)
            .unwrap();

        assert_eq!(
            url,
            format!("https://forms.example.org/feedback?lang=cy&f_t={}", FULL_TOKEN)
        );
        assert_eq!(url.matches("f_t=").count(), 1);
    }

    #[test]
    fn test_no_token_when_already_on_feedback_page() {
        let mut req = FormRequest::new("/app-name", "/app-name/feedback");
        let url = SetFeedbackReturnUrl::new(ReturnPathTransport::Query)
            .feedback_url(&mut req)
            .unwrap();
        assert_eq!(url, "/app-name/feedback");
    }

    #[test]
    fn test_no_token_on_feedback_page_reached_with_token() {
        let mut req = FormRequest::new("/app-name", format!("/app-name/feedback?f_t={}", FULL_TOKEN));
        let url = SetFeedbackReturnUrl::new(ReturnPathTransport::Query)
            .feedback_url(&mut req)
            .unwrap();
        assert_eq!(url, "/app-name/feedback");
    }

    #[test]
    fn test_custom_feedback_path() {
        let mut req = some_page();
        let url = SetFeedbackReturnUrl::new(ReturnPathTransport::Query)
            .with_feedback_path("/tell-us")
            .feedback_url(&mut req)
            .unwrap();
        assert!(url.starts_with("/app-name/tell-us?f_t="));
    }

    #[test]
    fn test_session_transport_writes_raw_triple() {
        let mut req = some_page();
        let locals = pipeline(ReturnPathTransport::Session).locals(&mut req).unwrap();

        assert_eq!(locals[FEEDBACK_URL_LOCAL], "/app-name/feedback");
        assert_eq!(
            req.session.get(RETURN_PATH_SESSION_KEY),
            Some(&json!({
                "baseUrl": "/app-name",
                "path": "/some-page",
                "url": "/app-name/some-page"
            }))
        );
    }

    #[test]
    fn test_session_transport_skips_write_on_feedback_page() {
        let mut req = FormRequest::new("/app-name", "/app-name/feedback");
        SetFeedbackReturnUrl::new(ReturnPathTransport::Session)
            .feedback_url(&mut req)
            .unwrap();
        assert!(!req.session.is_dirty());
        assert_eq!(req.session.get(RETURN_PATH_SESSION_KEY), None);
    }

    #[test]
    fn test_unparseable_feedback_url_is_an_error() {
        let mut req = with_feedback_local(some_page(), "http://bad host/feedback");
        let result = pipeline(ReturnPathTransport::Query).locals(&mut req);
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }
}
