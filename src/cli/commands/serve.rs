//! `serve`: run the HTTP proxy.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use crate::adapters::http::{AppState, CherryPickerHttpServer};
use crate::domain::models::{Config, UpstreamConfig};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::upstream::{ClientCredentialsProvider, UpstreamClient};
use crate::services::query_contract::QueryContract;
use crate::services::token_cache::TokenCache;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    ConfigLoader::validate(&config).context("Configuration is not usable for serve")?;

    let state = build_state(&config.upstream)?;
    info!(
        upstream = %config.upstream.base_url,
        org_id = %config.upstream.org_id,
        "upstream client ready"
    );

    CherryPickerHttpServer::new(state, config.server)
        .serve_with_shutdown(shutdown_signal())
        .await
}

/// Wire the token cache, upstream client and services for the proxy.
pub fn build_state(upstream: &UpstreamConfig) -> Result<AppState> {
    let provider = ClientCredentialsProvider::from_config(upstream)?;
    let tokens = TokenCache::new(Arc::new(provider))
        .with_margin(Duration::from_secs(upstream.token_refresh_margin_secs));
    let client = UpstreamClient::from_config(upstream, Arc::new(tokens))?;
    Ok(AppState::new(
        Arc::new(client),
        QueryContract::from_config(upstream),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
