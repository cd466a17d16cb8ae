#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use realmkit::admin::{AdminSession, AdminTokenSource, ProvisionError};
use realmkit::auth::{AuthError, DeviceAuthorizationSession, Token, TokenPoller, TokenResult};
use realmkit::config::{AdminCredentials, DeviceFlowConfig, Endpoints};
use realmkit::error::ProviderError;

pub const REALM: &str = "my-test-realm";
pub const CLIENT_ID: &str = "my-test-client";
pub const ADMIN_TOKEN: &str = "admin-token";

pub const DEVICE_PATH: &str = "/realms/my-test-realm/protocol/openid-connect/auth/device";
pub const TOKEN_PATH: &str = "/realms/my-test-realm/protocol/openid-connect/token";
pub const MASTER_TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

pub type Step = Result<TokenResult, AuthError>;

/// Token poller that replays a fixed script and records when it was called.
/// Once the script runs out every poll reports `authorization_pending`.
#[derive(Default)]
pub struct ScriptedPoller {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedPoller {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn gaps(&self, started: Instant) -> Vec<std::time::Duration> {
        let mut previous = started;
        self.poll_times()
            .into_iter()
            .map(|at| {
                let gap = at - previous;
                previous = at;
                gap
            })
            .collect()
    }
}

#[async_trait]
impl TokenPoller for ScriptedPoller {
    async fn poll(&self, _session: &DeviceAuthorizationSession) -> Result<TokenResult, AuthError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(Instant::now());
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| rejected("authorization_pending"))
    }
}

/// Admin token source that never touches the network.
#[derive(Default)]
pub struct CountingTokenSource {
    fetches: AtomicUsize,
}

impl CountingTokenSource {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdminTokenSource for CountingTokenSource {
    async fn fetch(&self) -> Result<AdminSession, ProvisionError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(AdminSession {
            access_token: ADMIN_TOKEN.to_string(),
        })
    }
}

pub fn token(access_token: &str) -> Token {
    serde_json::from_value(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 300
    }))
    .expect("token")
}

pub fn issued(access_token: &str) -> Step {
    Ok(TokenResult::Issued(token(access_token)))
}

pub fn rejected(kind: &str) -> Step {
    Ok(TokenResult::Rejected {
        error: ProviderError::new(Some(400), kind, kind),
        interval: None,
    })
}

pub fn unreachable() -> Step {
    Err(AuthError::Network("connection refused".to_string()))
}

pub fn session(interval_secs: u64, expires_in: u64) -> DeviceAuthorizationSession {
    serde_json::from_value(json!({
        "device_code": "D1",
        "user_code": "ABCD-EFGH",
        "verification_uri": "http://localhost:8090/realms/my-test-realm/device",
        "verification_uri_complete": "http://localhost:8090/realms/my-test-realm/device?user_code=ABCD-EFGH",
        "expires_in": expires_in,
        "interval": interval_secs
    }))
    .expect("session")
}

pub fn flow_config(server: &MockServer) -> DeviceFlowConfig {
    DeviceFlowConfig::new(Endpoints::new(server.uri(), REALM), CLIENT_ID)
}

pub fn admin_credentials(server: &MockServer) -> AdminCredentials {
    AdminCredentials {
        base_url: server.uri(),
        username: "admin".to_string(),
        password: "admin".to_string(),
    }
}

/// Master-realm password login that always succeeds. `expected` is the
/// number of logins the test must see.
pub async fn mount_admin_login(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path(MASTER_TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=admin-cli"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ADMIN_TOKEN,
            "token_type": "Bearer",
            "expires_in": 60
        })))
        .expect(expected)
        .mount(server)
        .await;
}
