#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::{Arc, Mutex};

use feedback_return::application::SubmitFeedback;
use feedback_return::config::{Config, FeedbackConfig};
use feedback_return::domain::ReturnPathTransport;
use feedback_return::infrastructure::notify::{
    DEFAULT_NOTIFY_BASE_URL, EmailOptions, Notifier, NotifyError,
};
use feedback_return::infrastructure::session::MemorySessionStore;
use feedback_return::routes::service_router;
use feedback_return::state::AppState;

/// Token for `{baseUrl: /app-name, path: /some-page, url: /app-name/some-page}`.
pub const FULL_TOKEN: &str = "eyJiYXNlVXJsIjoiL2FwcC1uYW1lIiwicGF0aCI6Ii9zb21lLXBhZ2UiLCJ1cmwiOiIvYXBwLW5hbWUvc29tZS1wYWdlIn0";

pub const EMAIL_FEEDBACK_CONFIG: &str = r#"{
    "notify": {
        "apiKey": "test_key-26785a09-ab16-4eb0-8407-a37497a57506-3d844edf-8d35-48ac-975b-e847b4f122b0",
        "email": {
            "templateId": "template-1",
            "emailAddress": "feedback@example.org",
            "fieldMappings": { "feedback": "comments" },
            "includeBaseUrlAs": "service",
            "includeSourcePathAs": "page"
        }
    }
}"#;

/// One recorded `send_email` call.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub template_id: String,
    pub email_address: String,
    pub options: EmailOptions,
}

/// Notifier that records calls and optionally rejects them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentEmail>>,
    pub reject: bool,
}

impl RecordingNotifier {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(
        &self,
        template_id: &str,
        email_address: &str,
        options: EmailOptions,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentEmail {
            template_id: template_id.to_string(),
            email_address: email_address.to_string(),
            options,
        });
        if self.reject {
            return Err(NotifyError::Api {
                status: 400,
                message: "BadRequestError: Can't send to this recipient".to_string(),
            });
        }
        Ok(())
    }
}

pub fn test_config(base_path: &str, transport: ReturnPathTransport) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        base_path: base_path.to_string(),
        feedback_path: "/feedback".to_string(),
        return_path_transport: transport,
        redis_url: None,
        session_ttl_seconds: 3600,
        feedback_config_path: None,
        notify_base_url: DEFAULT_NOTIFY_BASE_URL.to_string(),
        feedback_fields: vec!["feedback".to_string(), "name".to_string()],
    }
}

pub fn email_feedback_config() -> FeedbackConfig {
    FeedbackConfig::from_json_str(EMAIL_FEEDBACK_CONFIG).unwrap()
}

/// State without any feedback config.
pub fn create_test_state(config: &Config) -> AppState {
    let store = Arc::new(MemorySessionStore::new(config.session_ttl_seconds));
    create_state_with_store(config, store)
}

/// State without any feedback config over a store the test keeps a handle on.
pub fn create_state_with_store(config: &Config, store: Arc<MemorySessionStore>) -> AppState {
    let submit = SubmitFeedback::new(None, DEFAULT_NOTIFY_BASE_URL).unwrap();
    AppState::new(config, store, submit)
}

/// State whose feedback step emails through `notifier`.
pub fn create_state_with_notifier(config: &Config, notifier: Arc<RecordingNotifier>) -> AppState {
    let submit = SubmitFeedback::with_notifier(Some(email_feedback_config()), notifier);
    let store = Arc::new(MemorySessionStore::new(config.session_ttl_seconds));
    AppState::new(config, store, submit)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(service_router(state, false)).unwrap()
}

/// Extracts the `href` of the element with the given id.
pub fn href_of(html: &str, id: &str) -> Option<String> {
    let marker = format!("id=\"{}\" href=\"", id);
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].replace("&amp;", "&"))
}

/// Extracts the feedback form's `action`.
pub fn form_action(html: &str) -> Option<String> {
    let marker = "action=\"";
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].replace("&amp;", "&"))
}
