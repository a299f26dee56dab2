//! GOV.UK Notify REST client.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use sha2::Sha256;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::service::{EmailOptions, Notifier, NotifyError, Personalisation};

type HmacSha256 = Hmac<Sha256>;

/// Default API root.
pub const DEFAULT_NOTIFY_BASE_URL: &str = "https://api.notifications.service.gov.uk";

/// `{key name}-{service id}-{secret}`, both ids being UUIDs.
static API_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let uuid = "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";
    Regex::new(&format!(r"^(?P<name>.+)-(?P<service>{uuid})-(?P<secret>{uuid})$")).unwrap()
});

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    template_id: &'a str,
    email_address: &'a str,
    personalisation: &'a Personalisation,
}

/// Client for the Notify `v2/notifications/email` endpoint.
///
/// Each request carries a short-lived HS256 JWT signed with the secret half of
/// the API key; the key itself never leaves the process.
pub struct NotifyClient {
    http: reqwest::Client,
    base_url: String,
    service_id: String,
    secret: String,
}

impl NotifyClient {
    /// Creates a client from a Notify API key.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidApiKey`] if the key does not end in two UUIDs.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, NotifyError> {
        let caps = API_KEY_REGEX
            .captures(api_key.trim())
            .ok_or(NotifyError::InvalidApiKey)?;

        info!(
            "Notify client configured for service {} (key '{}')",
            &caps["service"], &caps["name"]
        );

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_id: caps["service"].to_string(),
            secret: caps["secret"].to_string(),
        })
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Builds the bearer JWT for one request.
    fn bearer_token(&self) -> Result<String, NotifyError> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"HS256"}"#);
        let claims = json!({ "iss": self.service_id, "iat": Utc::now().timestamp() });
        let claims = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header, claims);

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| NotifyError::Signing(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }
}

#[async_trait]
impl Notifier for NotifyClient {
    async fn send_email(
        &self,
        template_id: &str,
        email_address: &str,
        options: EmailOptions,
    ) -> Result<(), NotifyError> {
        let endpoint = format!("{}/v2/notifications/email", self.base_url);
        let body = SendEmailRequest {
            template_id,
            email_address,
            personalisation: &options.personalisation,
        };

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(self.bearer_token()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Notify accepted email for template {}", template_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    const SERVICE_ID: &str = "26785a09-ab16-4eb0-8407-a37497a57506";
    const SECRET: &str = "3d844edf-8d35-48ac-975b-e847b4f122b0";

    fn api_key() -> String {
        format!("my_test_key-{}-{}", SERVICE_ID, SECRET)
    }

    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    async fn spawn_notify(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        async fn handler(
            State((status, captured)): State<(StatusCode, Captured)>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            captured.lock().unwrap().push((auth, body));
            (status, Json(json!({ "id": "740e5834-3a29-46b4-9a6f-16142fde533a" })))
        }

        let app = Router::new()
            .route("/v2/notifications/email", post(handler))
            .with_state((status, captured.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    #[test]
    fn test_parses_api_key() {
        let client = NotifyClient::new(&api_key(), DEFAULT_NOTIFY_BASE_URL).unwrap();
        assert_eq!(client.service_id(), SERVICE_ID);
        assert_eq!(client.secret, SECRET);
    }

    #[test]
    fn test_key_name_may_contain_dashes() {
        let key = format!("team-feedback-live-{}-{}", SERVICE_ID, SECRET);
        let client = NotifyClient::new(&key, DEFAULT_NOTIFY_BASE_URL).unwrap();
        assert_eq!(client.service_id(), SERVICE_ID);
    }

    #[test]
    fn test_rejects_malformed_api_key() {
        let result = NotifyClient::new("SomeApiKey", DEFAULT_NOTIFY_BASE_URL);
        assert!(matches!(result, Err(NotifyError::InvalidApiKey)));
    }

    #[test]
    fn test_bearer_token_is_signed_with_secret() {
        let client = NotifyClient::new(&api_key(), DEFAULT_NOTIFY_BASE_URL).unwrap();
        let token = client.bearer_token().unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let claims: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["iss"], SERVICE_ID);
        assert!(claims["iat"].as_i64().unwrap() > 0);

        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{}.{}", parts[0], parts[1]).as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(parts[2], expected);
    }

    #[tokio::test]
    async fn test_send_email_posts_template_request() {
        let (base_url, captured) = spawn_notify(StatusCode::CREATED).await;
        let client = NotifyClient::new(&api_key(), &base_url).unwrap();

        let mut personalisation = Personalisation::new();
        personalisation.insert("name".to_string(), json!("Some name"));

        client
            .send_email("badger", "b@example.com", EmailOptions { personalisation })
            .await
            .unwrap();

        let calls = captured.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.starts_with("Bearer "));
        assert_eq!(
            calls[0].1,
            json!({
                "template_id": "badger",
                "email_address": "b@example.com",
                "personalisation": { "name": "Some name" }
            })
        );
    }

    #[tokio::test]
    async fn test_send_email_reports_rejection() {
        let (base_url, _captured) = spawn_notify(StatusCode::BAD_REQUEST).await;
        let client = NotifyClient::new(&api_key(), &base_url).unwrap();

        let result = client
            .send_email("badger", "b@example.com", EmailOptions::default())
            .await;

        assert!(matches!(result, Err(NotifyError::Api { status: 400, .. })));
    }
}
