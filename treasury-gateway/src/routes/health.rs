//! Liveness endpoint (`/health`).
//!
//! Always 200 while the process is serving. The body reports per-resource
//! cache state so operators can see which upstream documents are missing or
//! failing.

use std::collections::BTreeMap;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use treasury_client::{Resource, ResourceStatus};

use super::json_response;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if the service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Current timestamp
    pub timestamp: String,
    /// Seconds since the gateway started
    pub uptime: u64,
    /// Upstream API base URL
    pub upstream: String,
    /// Cache state keyed by resource name
    pub resources: BTreeMap<&'static str, ResourceStatus>,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let resources = Resource::ALL
        .into_iter()
        .map(|resource| (resource.name(), state.dashboard.status(resource)))
        .collect();

    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs(),
        upstream: state.args.upstream_url.clone(),
        resources,
    }
}

/// Handle liveness probe (/health)
pub fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(state))
}
