//! Administrative access tokens.
//!
//! Provisioning asks an [`AdminTokenSource`] for a token before every admin
//! call. [`PasswordGrant`] logs in each time it is asked; a caching source
//! can be swapped in without touching the provisioning steps.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::error::ProvisionError;
use crate::config::{AdminCredentials, Endpoints, MASTER_REALM};
use crate::http;

const ADMIN_CLIENT_ID: &str = "admin-cli";

/// Short-lived admin access token.
#[derive(Clone, Deserialize)]
pub struct AdminSession {
    pub access_token: String,
}

impl fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSession")
            .field("access_token", &"..")
            .finish()
    }
}

impl AdminSession {
    /// Bearer authorization plus JSON content type.
    pub fn headers(&self) -> HeaderMap {
        http::bearer_headers(&self.access_token)
    }
}

/// Source of admin access tokens.
#[async_trait]
pub trait AdminTokenSource: Send + Sync {
    async fn fetch(&self) -> Result<AdminSession, ProvisionError>;

    /// Fresh headers for one admin call.
    async fn authorization_headers(&self) -> Result<HeaderMap, ProvisionError> {
        Ok(self.fetch().await?.headers())
    }
}

/// Resource-owner password login against the master realm with `admin-cli`.
pub struct PasswordGrant {
    client: reqwest::Client,
    token_url: String,
    username: String,
    password: String,
}

impl PasswordGrant {
    pub fn new(credentials: &AdminCredentials) -> Self {
        let endpoints = Endpoints::new(&credentials.base_url, MASTER_REALM);
        Self {
            client: http::default_client(),
            token_url: endpoints.master_token_url(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl AdminTokenSource for PasswordGrant {
    /// Bad admin credentials are a configuration error; there is no retry.
    async fn fetch(&self) -> Result<AdminSession, ProvisionError> {
        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("grant_type", "password"),
            ("client_id", ADMIN_CLIENT_ID),
        ];
        let reply = http::post_form(&self.client, &self.token_url, &form).await?;
        if !reply.is_success() {
            let error = reply.provider_error();
            tracing::error!(status = reply.status.as_u16(), error = %error, "admin login failed");
            return Err(ProvisionError::AdminLogin(error));
        }
        reply
            .json()
            .map_err(|e| ProvisionError::InvalidResponse(format!("admin token response: {e}")))
    }
}
