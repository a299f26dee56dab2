//! Feedback step behaviour: recovers the return path, emails the feedback and
//! sends the user back where they came from.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::application::pipeline::{Behaviour, Next};
use crate::config::{EmailConfig, FeedbackConfig};
use crate::domain::session::ERROR_VALUES_KEY;
use crate::domain::{
    FormRequest, MalformedTokenError, RETURN_PATH_PARAM, RETURN_PATH_SESSION_KEY, ReturnPathToken,
    ReturnPathTransport, UrlValue,
};
use crate::error::AppError;
use crate::infrastructure::notify::{
    EmailOptions, Notifier, NotifyClient, NotifyError, Personalisation,
};

const MISSING_CONFIG_WARNING: &str = "Submit feedback behaviour specified but no feedback config provided. Did you forget to specify feedbackConfig as part of your step?";

/// Consumer side of the return path.
///
/// `configure` decodes the token into `form.options.return_path_info`;
/// `next_step` and `back_link` prefer its `url`; `process` sends the
/// configured email. Submitted feedback is never saved to the session.
pub struct SubmitFeedback {
    config: Option<FeedbackConfig>,
    notifier: Option<Arc<dyn Notifier>>,
    transport: ReturnPathTransport,
}

impl SubmitFeedback {
    /// Creates the behaviour, building a Notify client when `notify` is configured.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidApiKey`] if the configured key is malformed.
    pub fn new(
        config: Option<FeedbackConfig>,
        notify_base_url: &str,
    ) -> Result<Self, NotifyError> {
        let notifier = match config.as_ref().and_then(|c| c.notify.as_ref()) {
            Some(notify) => {
                let client = NotifyClient::new(&notify.api_key, notify_base_url)?;
                Some(Arc::new(client) as Arc<dyn Notifier>)
            }
            None => None,
        };

        Ok(Self {
            config,
            notifier,
            transport: ReturnPathTransport::default(),
        })
    }

    /// Creates the behaviour around an existing notifier.
    pub fn with_notifier(config: Option<FeedbackConfig>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier: Some(notifier),
            transport: ReturnPathTransport::default(),
        }
    }

    pub fn with_transport(mut self, transport: ReturnPathTransport) -> Self {
        self.transport = transport;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn read_token(&self, req: &FormRequest) -> Result<Option<ReturnPathToken>, MalformedTokenError> {
        match self.transport {
            ReturnPathTransport::Query => {
                let url = UrlValue::parse(&req.original_url)?;
                ReturnPathToken::decode(url.get_param(RETURN_PATH_PARAM).as_deref())
            }
            ReturnPathTransport::Session => match req.session.get(RETURN_PATH_SESSION_KEY) {
                Some(value) if !value.is_null() => {
                    ReturnPathToken::from_value(value.clone()).map(Some)
                }
                _ => Ok(None),
            },
        }
    }

    /// The relative return URL carried by the decoded token, if any.
    ///
    /// A token's `url` is used verbatim only when it is relative. Tokens
    /// arrive in the query string, so an absolute `url` could send the user to
    /// any host; those fall back to the step's own next step and back link.
    fn return_url<'a>(&self, req: &'a FormRequest) -> Option<&'a str> {
        let url = req.form.options.return_path_info.as_ref()?.url()?;
        match UrlValue::parse(url) {
            Ok(parsed) if parsed.is_relative() => Some(url),
            _ => {
                warn!("Ignoring return path {} that leaves this service", url);
                None
            }
        }
    }

    async fn send_email(&self, email: &EmailConfig, req: &FormRequest) -> Result<(), AppError> {
        let Some(notifier) = self.notifier.as_ref() else {
            error!("Feedback email configured but no notification client available");
            return Err(AppError::feedback_send_failed());
        };

        let options = EmailOptions {
            personalisation: personalisation(email, req),
        };

        match notifier
            .send_email(&email.template_id, &email.email_address, options)
            .await
        {
            Ok(()) => {
                metrics::counter!("feedback_notifications_total", "outcome" => "sent").increment(1);
                debug!("Feedback email sent with template {}", email.template_id);
                Ok(())
            }
            Err(e) => {
                metrics::counter!("feedback_notifications_total", "outcome" => "failed").increment(1);
                error!("Failed to send feedback email: {}", e);
                Err(AppError::feedback_send_failed())
            }
        }
    }
}

/// Template values: the optional return path aliases followed by every
/// mapped form field that was submitted. Unmapped fields are never sent.
fn personalisation(email: &EmailConfig, req: &FormRequest) -> Personalisation {
    let mut values = Personalisation::new();
    let token = req.form.options.return_path_info.as_ref();

    add_optional(
        &mut values,
        email.include_base_url_as.as_deref(),
        token.and_then(ReturnPathToken::base_url),
    );
    add_optional(
        &mut values,
        email.include_source_path_as.as_deref(),
        token.and_then(ReturnPathToken::path),
    );

    for (field, alias) in &email.field_mappings {
        if let Some(value) = req.form.values.get(field) {
            values.insert(alias.trim().to_string(), value.clone());
        }
    }
    values
}

fn add_optional(values: &mut Personalisation, alias: Option<&str>, value: Option<&str>) {
    if let (Some(alias), Some(value)) = (alias, value) {
        let alias = alias.trim();
        if !alias.is_empty() && !value.is_empty() {
            values.insert(alias.to_string(), Value::String(value.to_string()));
        }
    }
}

#[async_trait]
impl Behaviour for SubmitFeedback {
    fn name(&self) -> &'static str {
        "submit-feedback"
    }

    fn configure(&self, req: &mut FormRequest, next: Next<'_>) -> Result<(), AppError> {
        let token = self.read_token(req).unwrap_or_else(|e| {
            warn!("Discarding return path token: {}", e);
            None
        });
        req.form.options.return_path_info = token;
        next.configure(req)
    }

    async fn process(&self, req: &mut FormRequest, next: Next<'_>) -> Result<(), AppError> {
        let Some(config) = self.config.as_ref() else {
            warn!("{}", MISSING_CONFIG_WARNING);
            return next.process(req).await;
        };

        if let Some(email) = config.email() {
            self.send_email(email, req).await?;
        }
        next.process(req).await
    }

    fn save_values(&self, req: &mut FormRequest, _next: Next<'_>) -> Result<(), AppError> {
        let Some(Value::Object(error_values)) = req.session.get(ERROR_VALUES_KEY) else {
            return Ok(());
        };

        let remaining: serde_json::Map<String, Value> = error_values
            .iter()
            .filter(|(key, _)| !req.form.values.contains_key(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        req.session.set(ERROR_VALUES_KEY, Value::Object(remaining));
        Ok(())
    }

    fn next_step(&self, req: &FormRequest, next: Next<'_>) -> String {
        match self.return_url(req) {
            Some(url) => url.to_string(),
            None => next.next_step(req),
        }
    }

    fn back_link(&self, req: &FormRequest, next: Next<'_>) -> Option<String> {
        match self.return_url(req) {
            Some(url) => Some(url.to_string()),
            None => next.back_link(req),
        }
    }
}
