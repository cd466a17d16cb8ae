//! realmkit CLI binary entry point.

use clap::Parser;
use realmkit::cli::{Cli, Commands};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    realmkit::config::load_dotenv();
    let cli = Cli::parse();
    realmkit::cli::init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = match &cli.command {
        Commands::Login(args) => realmkit::cli::login::handle_login(args, &cancel).await,
        Commands::ServiceToken(args) => realmkit::cli::login::handle_service_token(args).await,
        Commands::Provision(args) => realmkit::cli::provision::handle_provision(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
