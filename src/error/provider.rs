//! Normalized error payloads returned by the identity provider.
//!
//! The provider is not consistent about error shapes: OAuth endpoints answer
//! with `{error, error_description}`, the admin API with `{errorMessage}` or
//! `{error}`, some failures with a bare JSON list, and proxies with plain
//! text or nothing at all. [`ProviderError::from_body`] folds all of these
//! into one `{kind, message}` value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider error decoded from an HTTP response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
    /// Machine-readable error code (`error` field), or `http_<status>`.
    pub kind: String,
    /// Human-readable description, preferring `error_description`.
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Decode a provider error from a raw response body, tolerating missing
    /// fields and non-JSON bodies.
    pub fn from_body(status: u16, body: &str) -> Self {
        let fallback_kind = format!("http_{status}");
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::new(Some(status), fallback_kind, format!("empty response (status {status})"));
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => Self::from_json(status, &value),
            Err(_) => Self::new(Some(status), fallback_kind, trimmed),
        }
    }

    /// Decode a provider error from an already-parsed JSON value.
    pub fn from_json(status: u16, value: &Value) -> Self {
        let fallback_kind = format!("http_{status}");
        match value {
            Value::Object(map) => {
                let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                let kind = text("error").unwrap_or(fallback_kind);
                let message = text("error_description")
                    .or_else(|| text("errorMessage"))
                    .or_else(|| text("message"))
                    .unwrap_or_else(|| kind.clone());
                Self::new(Some(status), kind, message)
            }
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        Value::Object(_) => Self::from_json(status, item).message,
                        other => other.to_string(),
                    })
                    .collect();
                let message = if parts.is_empty() {
                    format!("empty error list (status {status})")
                } else {
                    parts.join("; ")
                };
                Self::new(Some(status), fallback_kind, message)
            }
            Value::String(s) => Self::new(Some(status), fallback_kind, s.clone()),
            other => Self::new(Some(status), fallback_kind, other.to_string()),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == self.message {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ProviderError {}
