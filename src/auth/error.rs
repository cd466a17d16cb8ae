use thiserror::Error;

use crate::error::{ErrorCategory, ProviderError};

/// Device-flow and token-endpoint errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Device authorization rejected: {0}")]
    Initiation(ProviderError),
    #[error("Token request rejected: {0}")]
    Rejected(ProviderError),
    #[error("Access denied: {0}")]
    AccessDenied(ProviderError),
    #[error("Device code expired: {0}")]
    Expired(ProviderError),
    #[error("Device flow failed: {0}")]
    Flow(ProviderError),
    #[error("Gave up waiting for authorization after {waited_secs}s")]
    TimedOut { waited_secs: u64 },
    #[error("Device flow cancelled")]
    Cancelled,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl AuthError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Initiation(_) | Self::Rejected(_) | Self::InvalidResponse(_) | Self::Io(_) => {
                ErrorCategory::Configuration
            }
            Self::AccessDenied(_) | Self::Expired(_) | Self::Flow(_) | Self::TimedOut { .. } => {
                ErrorCategory::TerminalFlow
            }
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Network(_) => ErrorCategory::Transport,
        }
    }

    /// Whether the polling loop should keep going after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}
