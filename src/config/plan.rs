//! Provisioning plan loaded from TOML.
//!
//! ```toml
//! [realm]
//! realm = "my-test-realm"
//!
//! [client]
//! clientId = "my-test-client"
//!
//! [[users]]
//! username = "user"
//! firstName = "John"
//! credentials = [{ type = "password", value = "user" }]
//!
//! [policy]
//! user_failures = "tolerate"
//! insecure_dev_mode = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{optional_env, ConfigError, ENV_CLIENT_SECRET};
use crate::admin::{ClientSpec, RealmSpec, UserSpec};

/// Whether a failed user creation fails the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserFailurePolicy {
    /// Report per-user failures and still exit successfully.
    #[default]
    Tolerate,
    /// Exit non-zero when any user creation failed.
    Fail,
}

/// Behavioural switches for a provisioning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionPolicy {
    pub user_failures: UserFailurePolicy,
    /// Allows printing an existing client's secret. Development only.
    pub insecure_dev_mode: bool,
}

/// Realm, client and users to ensure, plus run policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionPlan {
    pub realm: RealmSpec,
    pub client: ClientSpec,
    #[serde(default)]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub policy: ProvisionPolicy,
}

impl ProvisionPlan {
    /// Parse a plan from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let plan: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        plan.validate()?;
        Ok(plan)
    }

    /// Read a plan file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut plan = Self::from_toml_str(&text, path)?;
        if let Some(secret) = optional_env(ENV_CLIENT_SECRET) {
            plan.client.secret = Some(secret);
        }
        Ok(plan)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.realm.realm.trim().is_empty() {
            return Err(ConfigError::Missing("realm.realm".to_string()));
        }
        if self.client.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("client.clientId".to_string()));
        }
        if let Some(user) = self.users.iter().find(|u| u.username.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                key: "users.username".to_string(),
                message: format!("empty username (email '{}')", user.email),
            });
        }
        Ok(())
    }
}
