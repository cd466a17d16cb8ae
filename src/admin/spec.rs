//! Desired-state descriptors sent to the admin API.
//!
//! Field names follow the provider's JSON representation (camelCase), so the
//! same types serialize directly as request bodies and deserialize from the
//! provisioning plan.

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Realm to ensure. Compared against the provider by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmSpec {
    pub realm: String,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl RealmSpec {
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            enabled: true,
        }
    }
}

/// Confidential client with the device-authorization grant enabled.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSpec {
    #[builder(into)]
    pub client_id: String,
    /// Left out of the request when absent; the provider then generates one.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[builder(default = true)]
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[builder(default = false)]
    #[serde(default)]
    pub public_client: bool,
    #[builder(default = true)]
    #[serde(default = "enabled")]
    pub service_accounts_enabled: bool,
    #[builder(default = vec!["*".to_string()])]
    #[serde(default = "wildcard_uris")]
    pub redirect_uris: Vec<String>,
    #[builder(default)]
    #[serde(default)]
    pub attributes: ClientAttributes,
}

/// Client attributes the provider stores as a flat dotted-key map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAttributes {
    #[serde(
        rename = "post.logout.redirect.uris",
        alias = "postLogoutRedirectUris",
        default = "wildcard"
    )]
    pub post_logout_redirect_uris: String,
    #[serde(
        rename = "oauth2.device.authorization.grant.enabled",
        alias = "deviceFlowEnabled",
        default = "enabled"
    )]
    pub device_flow_enabled: bool,
}

impl Default for ClientAttributes {
    fn default() -> Self {
        Self {
            post_logout_redirect_uris: wildcard(),
            device_flow_enabled: true,
        }
    }
}

/// Account to provision, with its initial password credential.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    #[builder(into)]
    pub username: String,
    #[builder(into, default)]
    #[serde(default)]
    pub first_name: String,
    #[builder(into, default)]
    #[serde(default)]
    pub last_name: String,
    #[builder(into, default)]
    #[serde(default)]
    pub email: String,
    #[builder(default = true)]
    #[serde(default = "enabled")]
    pub email_verified: bool,
    #[builder(default = true)]
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[builder(default)]
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

/// Credential attached to a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "type", default = "password_type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub temporary: bool,
}

impl Credential {
    /// Non-temporary password credential.
    pub fn password(value: impl Into<String>) -> Self {
        Self {
            kind: password_type(),
            value: value.into(),
            temporary: false,
        }
    }
}

fn enabled() -> bool {
    true
}

fn wildcard() -> String {
    "*".to_string()
}

fn wildcard_uris() -> Vec<String> {
    vec![wildcard()]
}

fn password_type() -> String {
    "password".to_string()
}
