//! Per-entity provisioning results.

use std::fmt;

use super::error::ProvisionError;
use crate::config::UserFailurePolicy;

/// What `ensure_realm` found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealmOutcome {
    Created,
    AlreadyExists,
}

/// What `ensure_client` found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOutcome {
    Created,
    /// `secret` is what the provider returned for the existing client.
    AlreadyExists { secret: Option<String> },
}

/// Result of one user creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStatus {
    Created,
    /// `status` is absent when the request never got a response.
    Failed { status: Option<u16>, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOutcome {
    pub username: String,
    pub status: UserStatus,
}

impl UserOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self.status, UserStatus::Created)
    }
}

impl fmt::Display for UserOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            UserStatus::Created => write!(f, "User '{}' created successfully!", self.username),
            UserStatus::Failed {
                status: Some(status),
                body,
            } => write!(
                f,
                "Failed to create user '{}': {status} {body}",
                self.username
            ),
            UserStatus::Failed { status: None, body } => {
                write!(f, "Failed to create user '{}': {body}", self.username)
            }
        }
    }
}

/// Summary of a full provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub realm: RealmOutcome,
    pub client: ClientOutcome,
    pub users: Vec<UserOutcome>,
}

impl ProvisionReport {
    pub fn created_users(&self) -> usize {
        self.users.iter().filter(|u| u.is_created()).count()
    }

    pub fn failed_users(&self) -> usize {
        self.users.len() - self.created_users()
    }

    /// Turn per-user failures into an error when the policy asks for it.
    pub fn enforce(&self, policy: UserFailurePolicy) -> Result<(), ProvisionError> {
        let failed = self.failed_users();
        if policy == UserFailurePolicy::Fail && failed > 0 {
            return Err(ProvisionError::UserFailures {
                failed,
                total: self.users.len(),
            });
        }
        Ok(())
    }
}
