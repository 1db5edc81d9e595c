//! Treasury gateway binary

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treasury_client::TreasuryApi;
use treasury_gateway::{config::Args, server, AppState, GatewayError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("treasury_gateway={log_level},treasury_client={log_level},info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate().map_err(GatewayError::Config) {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Treasury Gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Upstream: {}", args.upstream_url);
    info!("Request timeout: {}ms", args.request_timeout_ms);
    info!("Warm cache: {}", args.warm_cache);
    info!("Upcoming limit: {}", args.upcoming_limit);
    info!("======================================");

    let api = Arc::new(TreasuryApi::new(&args.upstream_url, args.request_timeout())?);
    let state = Arc::new(AppState::new(args, api));

    if state.args.warm_cache {
        let report = state.dashboard.refresh_all().await;
        for (resource, err) in &report.failed {
            warn!(resource = %resource, error = %err, "Cache warm-up failed, serving on demand");
        }
    }

    // Held for the lifetime of the server; dropping it stops the loops
    let _refresh = state.dashboard.spawn_all();

    server::run(state).await?;
    Ok(())
}
