use serde::{Deserialize, Serialize};

/// Token endpoint success payload.
///
/// # Example
/// ```
/// use realmkit::auth::Token;
///
/// let token: Token = serde_json::from_str(
///     r#"{"access_token":"tok123","token_type":"bearer","expires_in":300}"#,
/// ).unwrap();
/// assert_eq!(token.access_token, "tok123");
/// assert_eq!(token.refresh_token, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}
