//! Handlers for `realmkit login` and `realmkit service-token`.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{ClientArgs, LoginArgs};
use crate::auth::{DeviceFlowClient, Token};
use crate::config::{ConfigError, DeviceFlowConfig, Endpoints};
use crate::error::Result;

fn device_flow_config(args: &ClientArgs) -> std::result::Result<DeviceFlowConfig, ConfigError> {
    let config = DeviceFlowConfig::new(Endpoints::new(&args.base_url, &args.realm), &args.client_id)
        .with_client_secret(args.client_secret.clone())
        .with_scope(&args.scope);
    config.validate()?;
    Ok(config)
}

fn print_token(token: &Token) -> Result<()> {
    let json = serde_json::to_string_pretty(token).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}

/// Handle `realmkit login`.
pub async fn handle_login(args: &LoginArgs, cancel: &CancellationToken) -> Result<()> {
    let config = device_flow_config(&args.client)?
        .with_max_wait(args.max_wait_secs.map(Duration::from_secs));
    let client = DeviceFlowClient::new(config);
    let token = client.login(&mut std::io::stdout(), cancel).await?;
    print_token(&token)
}

/// Handle `realmkit service-token`.
pub async fn handle_service_token(args: &ClientArgs) -> Result<()> {
    let client = DeviceFlowClient::new(device_flow_config(args)?);
    let token = client.client_credentials().await?;
    print_token(&token)
}
