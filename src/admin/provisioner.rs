use std::sync::Arc;

use futures::future::join_all;
use reqwest::StatusCode;
use serde::Deserialize;

use super::error::ProvisionError;
use super::report::{ClientOutcome, ProvisionReport, RealmOutcome, UserOutcome, UserStatus};
use super::session::AdminTokenSource;
use super::spec::{ClientSpec, RealmSpec, UserSpec};
use crate::config::{Endpoints, ProvisionPlan, ProvisionPolicy};
use crate::http;

/// Existence-based provisioning of one realm and its client and users.
///
/// Each step checks for the entity by its identifying key and only creates
/// it when absent; nothing is ever updated. Rerunning after a partial run is
/// therefore safe. Every admin call fetches its own token.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use realmkit::admin::{PasswordGrant, Provisioner, RealmSpec};
/// use realmkit::config::{AdminCredentials, Endpoints};
///
/// # async fn example() -> Result<(), realmkit::admin::ProvisionError> {
/// let credentials = AdminCredentials {
///     base_url: "http://localhost:8090".to_string(),
///     username: "admin".to_string(),
///     password: "admin".to_string(),
/// };
/// let provisioner = Provisioner::new(
///     Endpoints::new(&credentials.base_url, "my-test-realm"),
///     Arc::new(PasswordGrant::new(&credentials)),
/// );
/// provisioner.ensure_realm(&RealmSpec::new("my-test-realm")).await?;
/// # Ok(())
/// # }
/// ```
pub struct Provisioner {
    client: reqwest::Client,
    endpoints: Endpoints,
    tokens: Arc<dyn AdminTokenSource>,
    policy: ProvisionPolicy,
}

#[derive(Debug, Deserialize)]
struct ExistingClient {
    #[serde(default)]
    secret: Option<String>,
}

impl Provisioner {
    /// `endpoints` names the realm that clients and users are created in.
    pub fn new(endpoints: Endpoints, tokens: Arc<dyn AdminTokenSource>) -> Self {
        Self {
            client: http::default_client(),
            endpoints,
            tokens,
            policy: ProvisionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ProvisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Run realm, client and users in order. Each step completes before the
    /// next starts since clients and users need the realm to exist.
    pub async fn run(&self, plan: &ProvisionPlan) -> Result<ProvisionReport, ProvisionError> {
        let realm = self.ensure_realm(&plan.realm).await?;
        let client = self.ensure_client(&plan.client).await?;
        let users = self.ensure_users(&plan.users).await?;
        Ok(ProvisionReport {
            realm,
            client,
            users,
        })
    }

    /// Create the realm unless a GET for it succeeds. `spec` must name the
    /// realm the endpoints target.
    pub async fn ensure_realm(&self, spec: &RealmSpec) -> Result<RealmOutcome, ProvisionError> {
        if spec.realm != self.endpoints.realm() {
            return Err(ProvisionError::RealmMismatch {
                requested: spec.realm.clone(),
                target: self.endpoints.realm().to_string(),
            });
        }
        let url = self.endpoints.admin_realm_url();
        let headers = self.tokens.authorization_headers().await?;
        let existing = http::send(self.client.get(&url).headers(headers)).await?;
        if existing.is_success() {
            tracing::info!(realm = %spec.realm, "Realm exists already");
            return Ok(RealmOutcome::AlreadyExists);
        }
        tracing::debug!(realm = %spec.realm, status = existing.status.as_u16(), "realm lookup failed, creating");

        let headers = self.tokens.authorization_headers().await?;
        let created = http::send(
            self.client
                .post(self.endpoints.admin_realms_url())
                .headers(headers)
                .json(spec),
        )
        .await?;
        if !created.is_success() {
            let error = created.provider_error();
            tracing::error!(realm = %spec.realm, error = %error, "Failed to create realm");
            return Err(ProvisionError::CreateRealm {
                realm: spec.realm.clone(),
                error,
            });
        }
        tracing::info!(realm = %spec.realm, "Realm created successfully");
        Ok(RealmOutcome::Created)
    }

    /// Create the client unless a lookup by `clientId` returns a match.
    pub async fn ensure_client(&self, spec: &ClientSpec) -> Result<ClientOutcome, ProvisionError> {
        let url = self.endpoints.admin_clients_url();
        let headers = self.tokens.authorization_headers().await?;
        let lookup = http::send(
            self.client
                .get(&url)
                .headers(headers)
                .query(&[("clientId", spec.client_id.as_str())]),
        )
        .await?;
        let existing = if lookup.is_success() {
            lookup
                .json::<Vec<ExistingClient>>()
                .ok()
                .and_then(|clients| clients.into_iter().next())
        } else {
            None
        };

        if let Some(existing) = existing {
            self.report_existing_client(&spec.client_id, existing.secret.as_deref());
            return Ok(ClientOutcome::AlreadyExists {
                secret: existing.secret,
            });
        }

        let headers = self.tokens.authorization_headers().await?;
        let created = http::send(self.client.post(&url).headers(headers).json(spec)).await?;
        if !created.is_success() {
            let error = created.provider_error();
            tracing::error!(client_id = %spec.client_id, error = %error, "Failed to create client");
            return Err(ProvisionError::CreateClient {
                client_id: spec.client_id.clone(),
                error,
            });
        }
        tracing::info!(client_id = %spec.client_id, "Client created successfully");
        Ok(ClientOutcome::Created)
    }

    fn report_existing_client(&self, client_id: &str, secret: Option<&str>) {
        match secret {
            Some(secret) if self.policy.insecure_dev_mode => {
                tracing::warn!(client_id, secret, "Client exists already (insecure dev mode: secret shown)");
            }
            _ => tracing::info!(client_id, "Client exists already"),
        }
    }

    /// Create every user concurrently and wait for all attempts. A failed
    /// creation is reported in its outcome and does not stop the others.
    pub async fn ensure_users(&self, specs: &[UserSpec]) -> Result<Vec<UserOutcome>, ProvisionError> {
        let results = join_all(specs.iter().map(|spec| self.create_user(spec))).await;
        results.into_iter().collect()
    }

    /// Only an admin login failure is an error here; anything else the
    /// provider says is recorded against the user.
    async fn create_user(&self, spec: &UserSpec) -> Result<UserOutcome, ProvisionError> {
        let headers = self.tokens.authorization_headers().await?;
        let reply = http::send(
            self.client
                .post(self.endpoints.admin_users_url())
                .headers(headers)
                .json(spec),
        )
        .await;

        let status = match reply {
            Ok(reply) if reply.status == StatusCode::CREATED => UserStatus::Created,
            Ok(reply) => UserStatus::Failed {
                status: Some(reply.status.as_u16()),
                body: reply.body,
            },
            Err(err) => UserStatus::Failed {
                status: None,
                body: err.to_string(),
            },
        };
        let outcome = UserOutcome {
            username: spec.username.clone(),
            status,
        };
        if outcome.is_created() {
            tracing::info!(username = %spec.username, "User created successfully");
        } else {
            tracing::error!(username = %spec.username, "{outcome}");
        }
        Ok(outcome)
    }
}
