use std::io::Write;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::device_code::{DeviceAuthorizationSession, TokenResult};
use super::display::render;
use super::error::AuthError;
use super::flow::DeviceFlow;
use super::token::Token;
use crate::config::DeviceFlowConfig;
use crate::error::ProviderError;
use crate::http;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// One token-endpoint poll. The seam the polling loop is driven through.
#[async_trait]
pub trait TokenPoller: Send + Sync {
    async fn poll(&self, session: &DeviceAuthorizationSession) -> Result<TokenResult, AuthError>;
}

/// Device authorization grant client for one provider realm.
///
/// # Example
/// ```no_run
/// use realmkit::auth::DeviceFlowClient;
/// use realmkit::config::{DeviceFlowConfig, Endpoints};
///
/// # async fn example() -> Result<(), realmkit::auth::AuthError> {
/// let config = DeviceFlowConfig::new(
///     Endpoints::new("http://localhost:8090", "my-test-realm"),
///     "my-test-client",
/// );
/// let client = DeviceFlowClient::new(config);
/// let session = client.initiate().await?;
/// println!("enter {} at {}", session.user_code, session.verification_uri);
/// # Ok(())
/// # }
/// ```
pub struct DeviceFlowClient {
    client: reqwest::Client,
    config: DeviceFlowConfig,
}

impl DeviceFlowClient {
    pub fn new(config: DeviceFlowConfig) -> Self {
        Self {
            client: http::default_client(),
            config,
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &DeviceFlowConfig {
        &self.config
    }

    fn client_form<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut form = vec![("client_id", self.config.client_id.as_str())];
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }
        form.extend_from_slice(extra);
        form
    }

    /// Start a device authorization. Any non-2xx reply is a configuration
    /// problem and is not retried.
    pub async fn initiate(&self) -> Result<DeviceAuthorizationSession, AuthError> {
        let url = self.config.endpoints.device_authorization_url();
        let form = self.client_form(&[("scope", self.config.scope.as_str())]);
        let reply = http::post_form(&self.client, &url, &form).await?;
        if !reply.is_success() {
            let error = reply.provider_error();
            tracing::error!(status = reply.status.as_u16(), error = %error, "device authorization failed");
            return Err(AuthError::Initiation(error));
        }
        let session: DeviceAuthorizationSession = reply
            .json()
            .map_err(|e| AuthError::InvalidResponse(format!("device authorization response: {e}")))?;
        tracing::info!(
            expires_in = session.expires_in,
            interval = session.interval,
            "device authorization started"
        );
        Ok(session)
    }

    /// Single poll of the token endpoint. The decoded body is returned for
    /// every status; only transport failures and unreadable bodies are errors.
    pub async fn poll(&self, session: &DeviceAuthorizationSession) -> Result<TokenResult, AuthError> {
        if session.is_expired() {
            return Ok(TokenResult::Rejected {
                error: ProviderError::new(None, "expired_token", "device code expired before authorization"),
                interval: None,
            });
        }
        let url = self.config.endpoints.token_url();
        let form = self.client_form(&[
            ("grant_type", DEVICE_CODE_GRANT),
            ("device_code", session.device_code.as_str()),
        ]);
        let reply = http::post_form(&self.client, &url, &form).await?;
        TokenResult::from_reply(&reply)
    }

    /// Initiate, show the codes on `out`, then poll until a terminal state.
    pub async fn login<W: Write>(
        &self,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<Token, AuthError> {
        let session = self.initiate().await?;
        render(&session, out)?;
        DeviceFlow::new()
            .with_max_wait(self.config.max_wait)
            .run(self, &session, cancel)
            .await
            .into_result()
    }

    /// Non-interactive login with the client's own credentials.
    pub async fn client_credentials(&self) -> Result<Token, AuthError> {
        if self.config.client_secret.is_none() {
            return Err(AuthError::InvalidResponse(
                "client credentials grant requires a client secret".to_string(),
            ));
        }
        let url = self.config.endpoints.token_url();
        let form = self.client_form(&[("grant_type", CLIENT_CREDENTIALS_GRANT)]);
        let reply = http::post_form(&self.client, &url, &form).await?;
        if !reply.is_success() {
            return Err(AuthError::Rejected(reply.provider_error()));
        }
        reply
            .json()
            .map_err(|e| AuthError::InvalidResponse(format!("token response: {e}")))
    }
}

#[async_trait]
impl TokenPoller for DeviceFlowClient {
    async fn poll(&self, session: &DeviceAuthorizationSession) -> Result<TokenResult, AuthError> {
        DeviceFlowClient::poll(self, session).await
    }
}
