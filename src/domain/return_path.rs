//! Return-path token: where to send the user back after the feedback detour.
//!
//! A token is a JSON object with up to three string fields (`baseUrl`,
//! `path`, `url`), base64url-encoded so it can sit directly in a query
//! parameter value. Absent fields are left out of the JSON entirely.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::domain::url_value::{InvalidUrlError, UrlValue};

/// Query parameter reserved for the serialized token. Shared by the code that
/// attaches the token and the code that reads it back.
pub const RETURN_PATH_PARAM: &str = "f_t";

/// Session key holding the raw triple when the session transport is used.
pub const RETURN_PATH_SESSION_KEY: &str = "feedbackReturnPath";

/// How a token travels from the page that links to feedback to the feedback flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnPathTransport {
    /// Encoded into the reserved query parameter of the feedback link.
    #[default]
    Query,
    /// Written as a raw object into the session under [`RETURN_PATH_SESSION_KEY`].
    Session,
}

impl ReturnPathTransport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Session => "session",
        }
    }
}

impl std::str::FromStr for ReturnPathTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "session" => Ok(Self::Session),
            other => Err(format!(
                "return path transport must be 'query' or 'session', got '{}'",
                other
            )),
        }
    }
}

/// Errors raised while decoding a token.
#[derive(Debug, thiserror::Error)]
pub enum MalformedTokenError {
    #[error("Return path token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Return path token is not a valid return path object: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Return path token carries an invalid URL: {0}")]
    Url(#[from] InvalidUrlError),
}

/// The `{baseUrl, path, url}` triple describing where a detour started.
///
/// Every present field has been normalized through [`UrlValue`]. Empty
/// strings are treated as absent.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReturnPathToken {
    base_url: Option<String>,
    path: Option<String>,
    url: Option<String>,
}

impl ReturnPathToken {
    /// Builds a token, normalizing each provided field.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrlError`] if any non-empty field cannot be parsed.
    pub fn new(
        base_url: Option<&str>,
        path: Option<&str>,
        url: Option<&str>,
    ) -> Result<Self, InvalidUrlError> {
        Ok(Self {
            base_url: normalize(base_url)?,
            path: normalize(path)?,
            url: normalize(url)?,
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.path.is_none() && self.url.is_none()
    }

    /// Serializes to unpadded base64url JSON.
    pub fn encode(&self) -> String {
        // A struct of optional strings always serializes.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a token taken from the reserved query parameter.
    ///
    /// Returns `Ok(None)` when no token is present, which is the normal case
    /// for ordinary navigation. Standard-alphabet, `=`-padded tokens are also
    /// accepted, including a `+` that form decoding turned into a space.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTokenError`] for bad base64, bad JSON, unknown or
    /// non-string fields, or fields that fail URL parsing.
    pub fn decode(encoded: Option<&str>) -> Result<Option<Self>, MalformedTokenError> {
        let encoded = match encoded.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(None),
        };

        let canonical: String = encoded
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' | ' ' => '-',
                '/' => '_',
                other => other,
            })
            .collect();

        let bytes = URL_SAFE_NO_PAD.decode(canonical)?;
        let raw: ReturnPathToken = serde_json::from_slice(&bytes)?;
        Ok(Some(raw.normalized()?))
    }

    /// Reads a token stored as a raw JSON object (session transport).
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTokenError`] when the value is not a return path object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedTokenError> {
        let raw: ReturnPathToken = serde_json::from_value(value)?;
        Ok(raw.normalized()?)
    }

    /// The token as a raw JSON object (session transport).
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn normalized(&self) -> Result<Self, InvalidUrlError> {
        Self::new(self.base_url(), self.path(), self.url())
    }
}

fn normalize(value: Option<&str>) -> Result<Option<String>, InvalidUrlError> {
    match value {
        Some(v) if !v.is_empty() => Ok(Some(UrlValue::parse(v)?.to_string())),
        _ => Ok(None),
    }
}
