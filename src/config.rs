//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Session storage
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! # or
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! Without Redis, sessions are kept in process memory.
//!
//! ## Feedback notifications
//!
//! `FEEDBACK_CONFIG` points at a JSON file shaped like:
//!
//! ```json
//! {
//!   "notify": {
//!     "apiKey": "live-<service id>-<secret>",
//!     "email": {
//!       "templateId": "b1f3...",
//!       "emailAddress": "feedback@example.org",
//!       "fieldMappings": { "feedback": "feedback", "name": "name" },
//!       "includeBaseUrlAs": "process",
//!       "includeSourcePathAs": "path"
//!     }
//!   }
//! }
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `BASE_PATH` - Mount path of the form application (default: empty)
//! - `FEEDBACK_PATH` - Feedback step below the mount (default: `/feedback`)
//! - `RETURN_PATH_TRANSPORT` - `query` or `session` (default: `query`)
//! - `SESSION_TTL_SECONDS` - Redis session lifetime (default: 3600)
//! - `NOTIFY_BASE_URL` - Notification API root
//! - `FEEDBACK_FIELDS` - Comma-separated feedback form fields (default: `feedback,name,email`)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::domain::ReturnPathTransport;
use crate::infrastructure::notify::DEFAULT_NOTIFY_BASE_URL;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Mount path of the form application; empty or `/name` without a trailing slash.
    pub base_path: String,
    /// Path of the feedback step below the mount.
    pub feedback_path: String,
    pub return_path_transport: ReturnPathTransport,
    pub redis_url: Option<String>,
    /// Lifetime in seconds of a Redis-held session after its last write.
    pub session_ttl_seconds: u64,
    /// JSON file holding the feedback notification settings.
    pub feedback_config_path: Option<PathBuf>,
    pub notify_base_url: String,
    pub feedback_fields: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `RETURN_PATH_TRANSPORT` holds an unknown value.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let base_path = env::var("BASE_PATH").unwrap_or_default();
        let feedback_path = env::var("FEEDBACK_PATH").unwrap_or_else(|_| "/feedback".to_string());

        let return_path_transport = match env::var("RETURN_PATH_TRANSPORT") {
            Ok(v) => v
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid RETURN_PATH_TRANSPORT")?,
            Err(_) => ReturnPathTransport::default(),
        };

        let redis_url = Self::load_redis_url();

        let session_ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let feedback_config_path = env::var("FEEDBACK_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let notify_base_url =
            env::var("NOTIFY_BASE_URL").unwrap_or_else(|_| DEFAULT_NOTIFY_BASE_URL.to_string());

        let feedback_fields = env::var("FEEDBACK_FIELDS")
            .map(|v| parse_field_list(&v))
            .unwrap_or_else(|_| vec!["feedback".into(), "name".into(), "email".into()]);

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            base_path,
            feedback_path,
            return_path_transport,
            redis_url,
            session_ttl_seconds,
            feedback_config_path,
            notify_base_url,
            feedback_fields,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match password {
            // Empty password means no authentication
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - `base_path` or `feedback_path` are not absolute paths
    /// - the Redis URL has an unknown scheme
    /// - `session_ttl_seconds` is zero
    /// - no feedback form fields are configured
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.base_path.is_empty()
            && (!self.base_path.starts_with('/') || self.base_path.ends_with('/'))
        {
            anyhow::bail!(
                "BASE_PATH must be empty or start with '/' and not end with '/', got '{}'",
                self.base_path
            );
        }

        if !self.feedback_path.starts_with('/') || self.feedback_path.len() < 2 {
            anyhow::bail!(
                "FEEDBACK_PATH must be a path like '/feedback', got '{}'",
                self.feedback_path
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        if self.session_ttl_seconds == 0 {
            anyhow::bail!("SESSION_TTL_SECONDS must be greater than 0");
        }

        if self.feedback_fields.is_empty() {
            anyhow::bail!("FEEDBACK_FIELDS must name at least one field");
        }

        Ok(())
    }

    /// Returns whether sessions are held in Redis.
    pub fn is_redis_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Full path of the feedback step including the mount.
    pub fn feedback_url(&self) -> String {
        format!("{}{}", self.base_path, self.feedback_path)
    }

    /// Reads and validates the feedback settings file, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails validation.
    pub fn load_feedback_config(&self) -> Result<Option<FeedbackConfig>> {
        match &self.feedback_config_path {
            Some(path) => FeedbackConfig::from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base path: '{}'", self.base_path);
        tracing::info!("  Feedback url: {}", self.feedback_url());
        tracing::info!(
            "  Return path transport: {}",
            self.return_path_transport.as_str()
        );

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!(
                "  Sessions: {} (redis)",
                mask_connection_string(redis_url)
            );
        } else {
            tracing::info!("  Sessions: in-memory");
        }

        match &self.feedback_config_path {
            Some(path) => tracing::info!("  Feedback config: {}", path.display()),
            None => tracing::info!("  Feedback config: none"),
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Settings for the feedback step.
///
/// Unknown keys are ignored so one settings file can carry other step options.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackConfig {
    #[validate(nested)]
    pub notify: Option<NotifyConfig>,
}

/// Notification service credentials and the email to send.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotifyConfig {
    #[validate(length(min = 1, message = "apiKey must not be empty"))]
    pub api_key: String,

    #[validate(nested)]
    pub email: Option<EmailConfig>,
}

/// Email template, recipient and the values passed to the template.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    #[validate(length(min = 1, message = "templateId must not be empty"))]
    pub template_id: String,

    #[validate(email(message = "emailAddress must be a valid email address"))]
    pub email_address: String,

    /// Form field name to template key. Only listed fields are sent.
    #[serde(default)]
    pub field_mappings: BTreeMap<String, String>,

    pub include_base_url_as: Option<String>,

    pub include_source_path_as: Option<String>,
}

impl FeedbackConfig {
    /// Parses and validates settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or failed validation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: FeedbackConfig =
            serde_json::from_str(raw).context("Feedback config is not valid JSON")?;
        config
            .validate()
            .context("Feedback config failed validation")?;
        Ok(config)
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// See [`Self::from_json_str`]; also fails if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read feedback config {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn email(&self) -> Option<&EmailConfig> {
        self.notify.as_ref().and_then(|n| n.email.as_ref())
    }
}

fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if variables are malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
