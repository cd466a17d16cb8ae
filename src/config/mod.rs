//! Configuration: endpoint layout, environment loading, device-flow settings.
//!
//! Values resolve in this order: explicit CLI arguments, process environment
//! (with `.env` loaded when present), then the provisioning plan file.

pub mod plan;

pub use plan::{ProvisionPlan, ProvisionPolicy, UserFailurePolicy};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the provider base URL.
pub const ENV_BASE_URL: &str = "KC_URL";
/// Environment variable holding the admin username.
pub const ENV_ADMIN_USERNAME: &str = "KC_ADMIN_USERNAME";
/// Environment variable holding the admin password.
pub const ENV_ADMIN_PASSWORD: &str = "KC_ADMIN_PASSWORD";
/// Environment variable overriding the plan's client secret.
pub const ENV_CLIENT_SECRET: &str = "KC_CLIENT_SECRET";

/// Realm holding the administrative account.
pub const MASTER_REALM: &str = "master";

/// Configuration errors. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(String),
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: String, message: String },
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load `.env` from the working directory if present.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Read a required, non-empty environment variable.
pub fn require_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

/// Read an optional environment variable, treating empty as unset.
pub fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// URL layout of an OIDC provider for one realm.
///
/// # Example
/// ```
/// use realmkit::config::Endpoints;
///
/// let endpoints = Endpoints::new("http://localhost:8090/", "my-test-realm");
/// assert_eq!(
///     endpoints.token_url(),
///     "http://localhost:8090/realms/my-test-realm/protocol/openid-connect/token"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    realm: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>, realm: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            realm: realm.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    fn openid_connect(&self, realm: &str) -> String {
        format!("{}/realms/{realm}/protocol/openid-connect", self.base_url)
    }

    pub fn device_authorization_url(&self) -> String {
        format!("{}/auth/device", self.openid_connect(&self.realm))
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.openid_connect(&self.realm))
    }

    /// Token endpoint of the master realm, used for admin logins.
    pub fn master_token_url(&self) -> String {
        format!("{}/token", self.openid_connect(MASTER_REALM))
    }

    pub fn admin_realms_url(&self) -> String {
        format!("{}/admin/realms", self.base_url)
    }

    pub fn admin_realm_url(&self) -> String {
        format!("{}/{}", self.admin_realms_url(), self.realm)
    }

    pub fn admin_clients_url(&self) -> String {
        format!("{}/clients", self.admin_realm_url())
    }

    pub fn admin_users_url(&self) -> String {
        format!("{}/users", self.admin_realm_url())
    }
}

/// Administrative login. Supplied externally, never defaulted.
#[derive(Clone)]
pub struct AdminCredentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"..")
            .finish()
    }
}

impl AdminCredentials {
    /// Read `KC_URL`, `KC_ADMIN_USERNAME` and `KC_ADMIN_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: require_env(ENV_BASE_URL)?,
            username: require_env(ENV_ADMIN_USERNAME)?,
            password: require_env(ENV_ADMIN_PASSWORD)?,
        })
    }
}

/// Settings for one device-authorization login.
#[derive(Clone)]
pub struct DeviceFlowConfig {
    pub endpoints: Endpoints,
    pub client_id: String,
    /// Sent with every request when the client is confidential.
    pub client_secret: Option<String>,
    pub scope: String,
    /// Operator cap on total wait. Never shortens the session's own lifetime.
    pub max_wait: Option<Duration>,
}

impl fmt::Debug for DeviceFlowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceFlowConfig")
            .field("endpoints", &self.endpoints)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| ".."))
            .field("scope", &self.scope)
            .field("max_wait", &self.max_wait)
            .finish()
    }
}

impl DeviceFlowConfig {
    pub fn new(endpoints: Endpoints, client_id: impl Into<String>) -> Self {
        Self {
            endpoints,
            client_id: client_id.into(),
            client_secret: None,
            scope: "openid".to_string(),
            max_wait: None,
        }
    }

    pub fn with_client_secret(mut self, secret: Option<String>) -> Self {
        self.client_secret = secret;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("client id".to_string()));
        }
        let base = self.endpoints.base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "base url".to_string(),
                message: format!("expected an http(s) URL, got '{base}'"),
            });
        }
        Ok(())
    }
}

/// Default location of the provisioning plan (`<config dir>/realmkit/provision.toml`).
pub fn default_plan_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "realmkit")
        .map(|dirs| dirs.config_dir().join("provision.toml"))
        .unwrap_or_else(|| PathBuf::from("provision.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoints_follow_provider_layout() {
        let endpoints = Endpoints::new("http://idp:8080", "demo");
        assert_eq!(
            endpoints.device_authorization_url(),
            "http://idp:8080/realms/demo/protocol/openid-connect/auth/device"
        );
        assert_eq!(
            endpoints.master_token_url(),
            "http://idp:8080/realms/master/protocol/openid-connect/token"
        );
        assert_eq!(endpoints.admin_realms_url(), "http://idp:8080/admin/realms");
        assert_eq!(endpoints.admin_realm_url(), "http://idp:8080/admin/realms/demo");
        assert_eq!(endpoints.admin_clients_url(), "http://idp:8080/admin/realms/demo/clients");
        assert_eq!(endpoints.admin_users_url(), "http://idp:8080/admin/realms/demo/users");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let endpoints = Endpoints::new("https://idp/", "r");
        assert_eq!(endpoints.base_url(), "https://idp");
    }

    #[test]
    fn device_flow_config_rejects_non_http_base() {
        let config = DeviceFlowConfig::new(Endpoints::new("idp.local", "r"), "client");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn device_flow_config_requires_client_id() {
        let config = DeviceFlowConfig::new(Endpoints::new("http://idp", "r"), " ");
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = AdminCredentials {
            base_url: "http://idp".to_string(),
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));

        let config = DeviceFlowConfig::new(Endpoints::new("http://idp", "r"), "c")
            .with_client_secret(Some("shh".to_string()));
        assert!(!format!("{config:?}").contains("shh"));
    }
}
