use anyhow::{Context, Result};
use clap::Parser;
use giftdraw_client::RelayFeed;
use giftdraw_relay::{build_config, Api, Args, Coordinator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = build_config(&args)?;

    let feed = RelayFeed::new(&config.feed_url, config.feed_dial_timeout)
        .context("invalid feed url")?;
    let coordinator = Arc::new(Coordinator::new(feed, config.coordinator.clone()));
    let app = Api::new(coordinator, config.api.clone()).router();

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!(
        addr = %config.listen,
        feed_url = %config.feed_url,
        client_url = ?config.api.allowed_origin,
        "gift relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
