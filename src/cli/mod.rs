//! CLI entry point for realmkit.

pub mod login;
pub mod provision;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// realmkit CLI
#[derive(Parser, Debug)]
#[command(name = "realmkit", version, about = "Device-flow login and realm provisioning for OIDC providers")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with the device authorization grant
    Login(LoginArgs),
    /// Fetch a token with the client credentials grant
    ServiceToken(ClientArgs),
    /// Ensure the realm, client and users from a plan exist
    Provision(ProvisionArgs),
}

/// Provider and client identity shared by the token commands.
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Provider base URL
    #[arg(long, env = "KC_URL")]
    pub base_url: String,

    /// Realm the client lives in
    #[arg(long, env = "KC_REALM")]
    pub realm: String,

    /// OAuth client id
    #[arg(long, env = "KC_CLIENT_ID")]
    pub client_id: String,

    /// Client secret, for confidential clients
    #[arg(long, env = "KC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Requested scope
    #[arg(long, default_value = "openid")]
    pub scope: String,
}

/// Arguments for `realmkit login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Give up after this many seconds (never earlier than the code expiry)
    #[arg(long)]
    pub max_wait_secs: Option<u64>,
}

/// Arguments for `realmkit provision`.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Plan file (defaults to <config dir>/realmkit/provision.toml)
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Exit non-zero when any user could not be created
    #[arg(long)]
    pub fail_on_user_error: bool,

    /// Print the secret of an already existing client. Development only.
    #[arg(long)]
    pub insecure_dev_mode: bool,
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
