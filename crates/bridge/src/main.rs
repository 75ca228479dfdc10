use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alertmanager_gotify_bridge::{config::Config, server::Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::load()?;
    info!("Loaded configuration: {:?}", config);

    let addr = config.server.addr();
    let server = Server::from_config(&config);

    info!(addr = %addr, gotify = %config.gotify.url, "Starting Alertmanager to Gotify bridge");
    server
        .start(&addr)
        .await
        .with_context(|| format!("server on {} failed", addr))?;

    Ok(())
}
