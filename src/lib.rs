//! realmkit: device-flow login and idempotent provisioning for OIDC
//! identity providers.
//!
//! Two independent components share the [`http`] request helpers:
//!
//! - [`auth`]: an OAuth 2.0 Device Authorization Grant client that starts a
//!   device login, shows the user code, and polls the token endpoint until
//!   the login completes or terminally fails.
//! - [`admin`]: a bootstrapper that ensures a realm, a confidential client
//!   and a set of users exist, creating only what is missing.
//!
//! # Quick Start
//!
//! ```no_run
//! use realmkit::auth::DeviceFlowClient;
//! use realmkit::config::{DeviceFlowConfig, Endpoints};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), realmkit::auth::AuthError> {
//! let config = DeviceFlowConfig::new(
//!     Endpoints::new("http://localhost:8090", "my-test-realm"),
//!     "my-test-client",
//! );
//! let token = DeviceFlowClient::new(config)
//!     .login(&mut std::io::stdout(), &CancellationToken::new())
//!     .await?;
//! println!("{}", token.access_token);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;

#[cfg(feature = "cli")]
pub mod cli;
