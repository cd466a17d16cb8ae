//! Idempotent realm, client and user provisioning against the admin API.

pub mod error;
pub mod provisioner;
pub mod report;
pub mod session;
pub mod spec;

pub use error::ProvisionError;
pub use provisioner::Provisioner;
pub use report::{ClientOutcome, ProvisionReport, RealmOutcome, UserOutcome, UserStatus};
pub use session::{AdminSession, AdminTokenSource, PasswordGrant};
pub use spec::{ClientAttributes, ClientSpec, Credential, RealmSpec, UserSpec};
