// ABOUTME: Binary entry point for the podscrape API server.
// ABOUTME: Parses configuration, opens the store, and serves the router until shutdown.

use anyhow::Context as _;
use clap::Parser;
use podscrape_server::{app, logging, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let config = ServerConfig::parse();

    let store = config.open_store().await?;
    let ingestor = config
        .ingestor_builder()
        .build(store)
        .context("build ingestor")?;
    let state = AppState::new(ingestor, config.download_client()?);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    info!(
        addr = %config.bind,
        catalog_policy = %config.catalog_policy(),
        persisted = config.data_file.is_some(),
        "podscrape server listening"
    );
    axum::serve(listener, app(state)).await?;
    Ok(())
}
