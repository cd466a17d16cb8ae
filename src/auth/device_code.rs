use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AuthError;
use super::token::Token;
use crate::error::ProviderError;
use crate::http::HttpReply;

/// Minimum increase applied to the polling interval on `slow_down`.
pub const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Floor applied to provider-supplied intervals so polling never spins.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Device authorization response, immutable for the life of one login.
///
/// # Example
/// ```
/// use realmkit::auth::DeviceAuthorizationSession;
///
/// let session: DeviceAuthorizationSession = serde_json::from_str(r#"{
///     "device_code": "D1",
///     "user_code": "ABCD-EFGH",
///     "verification_uri": "https://idp/device",
///     "verification_uri_complete": "https://idp/device?user_code=ABCD-EFGH",
///     "expires_in": 600,
///     "interval": 5
/// }"#).unwrap();
/// assert_eq!(session.interval().as_secs(), 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAuthorizationSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub verification_uri_complete: String,
    /// Seconds until the device code expires.
    pub expires_in: u64,
    /// Seconds to wait between polls.
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(skip, default = "Utc::now")]
    pub issued_at: DateTime<Utc>,
}

impl DeviceAuthorizationSession {
    /// Polling interval, never shorter than [`MIN_INTERVAL`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval).max(MIN_INTERVAL)
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }

    /// `None` when `expires_in` is too large to represent as a timestamp;
    /// such a session never expires locally.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| self.issued_at.checked_add_signed(lifetime))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

/// Decoded body of one token-endpoint poll.
#[derive(Debug, Clone)]
pub enum TokenResult {
    /// 2xx with a non-empty `access_token`.
    Issued(Token),
    /// Any `{error, error_description}` reply. `interval` carries a
    /// provider-requested polling interval when present.
    Rejected {
        error: ProviderError,
        interval: Option<u64>,
    },
}

impl TokenResult {
    /// Interpret a token endpoint reply. Error statuses are data here, not
    /// failures; only an unreadable body is an error.
    pub fn from_reply(reply: &HttpReply) -> Result<Self, AuthError> {
        let status = reply.status.as_u16();
        let value: Value = match serde_json::from_str(&reply.body) {
            Ok(value) => value,
            Err(_) if reply.status.is_server_error() => {
                return Err(AuthError::Network(format!(
                    "token endpoint unavailable (status {status})"
                )));
            }
            Err(err) => {
                return Err(AuthError::InvalidResponse(format!(
                    "token endpoint returned non-JSON body (status {status}): {err}"
                )));
            }
        };

        if reply.is_success() {
            let has_token = value
                .get("access_token")
                .and_then(Value::as_str)
                .is_some_and(|t| !t.is_empty());
            if has_token {
                let token: Token = serde_json::from_value(value)
                    .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
                return Ok(Self::Issued(token));
            }
            if value.get("error").is_none() {
                return Ok(Self::Rejected {
                    error: ProviderError::new(
                        Some(status),
                        "missing_token",
                        "token response missing access_token",
                    ),
                    interval: None,
                });
            }
        }

        Ok(Self::Rejected {
            error: ProviderError::from_json(status, &value),
            interval: value.get("interval").and_then(Value::as_u64),
        })
    }

    /// Classify this result against the device-flow grammar.
    pub fn classify(self, current_interval: Duration) -> DeviceCodePoll {
        match self {
            Self::Issued(token) => DeviceCodePoll::Authorized { token },
            Self::Rejected { error, interval } => match error.kind.as_str() {
                "authorization_pending" => DeviceCodePoll::Pending,
                "slow_down" => {
                    let stepped = current_interval + SLOW_DOWN_STEP;
                    let requested = interval.map(Duration::from_secs).unwrap_or_default();
                    DeviceCodePoll::SlowDown {
                        interval: stepped.max(requested),
                    }
                }
                "expired_token" => DeviceCodePoll::Expired(error),
                "access_denied" => DeviceCodePoll::AccessDenied(error),
                _ => DeviceCodePoll::Failed(error),
            },
        }
    }
}

/// Polling outcome for a device-code session.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    Pending,
    SlowDown { interval: Duration },
    Authorized { token: Token },
    AccessDenied(ProviderError),
    Expired(ProviderError),
    Failed(ProviderError),
}
