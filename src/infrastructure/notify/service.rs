//! Notification service trait and error types.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Errors raised while sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notify API key is not in the expected format")]
    InvalidApiKey,

    #[error("Failed to sign Notify request: {0}")]
    Signing(String),

    #[error("Notify request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notify rejected the request with status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Template values sent with an email.
pub type Personalisation = Map<String, Value>;

/// Options passed alongside the template id and address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmailOptions {
    pub personalisation: Personalisation,
}

/// Templated email delivery.
///
/// Exactly one call is made per feedback submission and it is never retried.
///
/// # Implementations
///
/// - [`crate::infrastructure::notify::NotifyClient`] - GOV.UK Notify REST API
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends the email template `template_id` to `email_address`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the request cannot be made or is rejected.
    async fn send_email(
        &self,
        template_id: &str,
        email_address: &str,
        options: EmailOptions,
    ) -> Result<(), NotifyError>;
}
