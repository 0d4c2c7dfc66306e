use crate::{api::ApiConfig, coordinator};
use anyhow::{Context, Result};
use clap::Parser;
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use url::Url;

const DEFAULT_FEED_URL: &str = "ws://127.0.0.1:8089";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host interface to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Base URL of the live feed relay (falls back to FEED_URL).
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Browser origin allowed to open sockets (falls back to CLIENT_URL; any origin when unset).
    #[arg(long)]
    pub client_url: Option<String>,

    /// Requests queued per session before callers wait.
    #[arg(long, default_value_t = 256)]
    pub mailbox_size: usize,

    /// Session events buffered per socket before it lags.
    #[arg(long, default_value_t = 1024)]
    pub outbound_capacity: usize,

    /// Time allowed to reach the feed relay and join a room (must be > 0).
    #[arg(long, default_value_t = 10_000)]
    pub feed_dial_timeout_ms: u64,

    /// Seed for reproducible draws (optional).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub listen: SocketAddr,
    pub feed_url: String,
    pub feed_dial_timeout: Duration,
    pub api: ApiConfig,
    pub coordinator: coordinator::Config,
}

fn env_fallback(value: &Option<String>, key: &str) -> Option<String> {
    value
        .clone()
        .or_else(|| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn build_config(args: &Args) -> Result<RelayConfig> {
    if args.mailbox_size == 0 {
        anyhow::bail!("mailbox_size must be > 0");
    }
    if args.outbound_capacity == 0 {
        anyhow::bail!("outbound_capacity must be > 0");
    }
    if args.feed_dial_timeout_ms == 0 {
        anyhow::bail!("feed_dial_timeout_ms must be > 0");
    }

    let feed_url =
        env_fallback(&args.feed_url, "FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
    let parsed = Url::parse(&feed_url).with_context(|| format!("invalid feed url: {feed_url}"))?;
    if !matches!(parsed.scheme(), "ws" | "wss") {
        anyhow::bail!("feed url must use ws or wss: {feed_url}");
    }

    let client_url = env_fallback(&args.client_url, "CLIENT_URL");
    if let Some(origin) = &client_url {
        Url::parse(origin).with_context(|| format!("invalid client url: {origin}"))?;
    }

    Ok(RelayConfig {
        listen: SocketAddr::new(args.host, args.port),
        feed_url,
        feed_dial_timeout: Duration::from_millis(args.feed_dial_timeout_ms),
        api: ApiConfig {
            allowed_origin: client_url.map(|origin| origin.trim_end_matches('/').to_string()),
            outbound_capacity: args.outbound_capacity,
        },
        coordinator: coordinator::Config {
            mailbox_size: args.mailbox_size,
            event_capacity: args.outbound_capacity,
            seed: args.seed,
        },
    })
}
