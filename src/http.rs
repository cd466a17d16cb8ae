//! Shared HTTP plumbing for the token and admin endpoints.
//!
//! Every request goes through [`send`], which captures the status and the
//! full body so callers can decide how to interpret it: some endpoints
//! communicate flow state through error statuses, so a non-2xx reply is not
//! an error at this layer.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

/// Request timeout applied to the default client.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Build a client with the crate's default timeout.
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Build headers for an authorized JSON call against the admin API.
pub fn bearer_headers(access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON regardless of status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Normalize the body into a [`ProviderError`].
    pub fn provider_error(&self) -> ProviderError {
        ProviderError::from_body(self.status.as_u16(), &self.body)
    }
}

/// Send a request and capture its status and body.
///
/// Only transport failures (connect, timeout, body read) are errors here.
pub async fn send(request: RequestBuilder) -> Result<HttpReply, reqwest::Error> {
    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    tracing::debug!(status = status.as_u16(), bytes = body.len(), "HTTP reply");
    Ok(HttpReply { status, body })
}

/// Send a form-encoded POST.
pub async fn post_form<F>(
    client: &reqwest::Client,
    url: &str,
    form: &F,
) -> Result<HttpReply, reqwest::Error>
where
    F: serde::Serialize + ?Sized,
{
    send(
        client
            .post(url)
            .header(ACCEPT, "application/json")
            .form(form),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_headers_carry_token_and_json_content_type() {
        let headers = bearer_headers("abc");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn reply_decodes_provider_error() {
        let reply = HttpReply {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"error":"invalid_grant","error_description":"Invalid user credentials"}"#
                .to_string(),
        };
        assert!(!reply.is_success());
        let err = reply.provider_error();
        assert_eq!(err.kind, "invalid_grant");
        assert_eq!(err.status, Some(401));
    }
}
