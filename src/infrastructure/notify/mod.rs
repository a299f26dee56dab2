//! Outbound email notifications for submitted feedback.

mod notify_client;
mod service;

pub use notify_client::{DEFAULT_NOTIFY_BASE_URL, NotifyClient};
pub use service::{EmailOptions, Notifier, NotifyError, Personalisation};

#[cfg(test)]
pub use service::MockNotifier;
