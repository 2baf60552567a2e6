use anyhow::Context;
use chat_gateway::gateway::{GatewayConfig, GatewayServer};
use chat_gateway::logger;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logger();

    let config = GatewayConfig::load().map_err(anyhow::Error::msg)?;
    let (server, handle) = GatewayServer::start(config)
        .await
        .map_err(anyhow::Error::msg)?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    server.stop();
    handle.await.context("Server task panicked")?;
    Ok(())
}
