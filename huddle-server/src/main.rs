use anyhow::Context;
use clap::Parser;
use huddle_server::{ServerConfig, SignalingService, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::parse();
    info!("ICE servers handed to clients: {:?}", config.ice_servers);

    let service = SignalingService::start(config.ice_server_configs());
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Signaling server listening on http://{}", config.bind);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
