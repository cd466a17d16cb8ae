//! Error types for realmkit.

pub mod provider;

pub use provider::ProviderError;

use thiserror::Error;

use crate::admin::ProvisionError;
use crate::auth::AuthError;
use crate::config::ConfigError;

/// Primary error type for all realmkit operations.
#[derive(Error, Debug)]
pub enum RealmkitError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Device flow error: {0}")]
    Auth(#[from] AuthError),

    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad error category for routing exit codes and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad client id, bad credentials, malformed request. Retrying cannot help.
    Configuration,
    /// The device flow ended in a provider-declared terminal state.
    TerminalFlow,
    /// The identity provider could not be reached.
    Transport,
    /// The operator stopped the flow.
    Cancelled,
    /// A provisioning step failed.
    Provisioning,
}

impl RealmkitError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::Io(_) => ErrorCategory::Configuration,
            Self::Auth(err) => err.category(),
            Self::Provision(err) => err.category(),
        }
    }

    /// Process exit status for this error. Every fatal condition, including
    /// an operator cancel, maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}


/// Convenience alias.
pub type Result<T> = std::result::Result<T, RealmkitError>;
