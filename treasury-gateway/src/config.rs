//! Configuration for the treasury gateway
//!
//! CLI arguments with environment variable fallbacks, using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Treasury gateway - cached pass-through and derived views over the
/// Cardano treasury API
#[derive(Parser, Debug, Clone)]
#[command(name = "treasury-gateway")]
#[command(about = "HTTP gateway for the Cardano treasury explorer")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Base URL of the upstream treasury API
    #[arg(long, env = "UPSTREAM_URL", default_value = "https://cardanotreasury.fi/api")]
    pub upstream_url: String,

    /// Upstream request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Refresh every cache once before accepting connections
    #[arg(long, env = "WARM_CACHE", default_value_t = true, action = clap::ArgAction::Set)]
    pub warm_cache: bool,

    /// Maximum number of upcoming milestones in the calendar view
    #[arg(long, env = "UPCOMING_LIMIT", default_value = "12")]
    pub upcoming_limit: usize,
}

impl Args {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = self.upstream_url.trim();
        if url.is_empty() {
            return Err("UPSTREAM_URL must not be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("UPSTREAM_URL must be an http(s) URL, got {url}"));
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}
