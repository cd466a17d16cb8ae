use thiserror::Error;

use crate::error::{ErrorCategory, ProviderError};

/// Fatal provisioning errors. Per-user failures are not errors; they are
/// reported in [`super::ProvisionReport`].
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Admin login failed: {0}")]
    AdminLogin(ProviderError),
    #[error("Failed to create realm '{realm}': {error}")]
    CreateRealm { realm: String, error: ProviderError },
    #[error("Failed to create client '{client_id}': {error}")]
    CreateClient {
        client_id: String,
        error: ProviderError,
    },
    #[error("Realm '{requested}' does not match the target realm '{target}'")]
    RealmMismatch { requested: String, target: String },
    #[error("{failed} of {total} users could not be created")]
    UserFailures { failed: usize, total: usize },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl ProvisionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AdminLogin(_) | Self::RealmMismatch { .. } | Self::InvalidResponse(_) => {
                ErrorCategory::Configuration
            }
            Self::Network(_) => ErrorCategory::Transport,
            Self::CreateRealm { .. } | Self::CreateClient { .. } | Self::UserFailures { .. } => {
                ErrorCategory::Provisioning
            }
        }
    }
}

impl From<reqwest::Error> for ProvisionError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}
