//! Pass-through endpoints: `/api/treasury-data`, `/api/treasury-stats`,
//! `/api/calendar-events`, `/api/data-version`.
//!
//! Each request performs one upstream GET and relays the JSON unchanged, with
//! a per-resource `Cache-Control` directive so shared caches in front of the
//! gateway absorb most traffic.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::warn;
use treasury_client::Resource;

use super::{failure_response, json_response, with_cache_control};
use crate::server::AppState;

pub async fn handle_passthrough(state: &AppState, resource: Resource) -> Response<Full<Bytes>> {
    match state.source.fetch_value(resource).await {
        Ok(value) => with_cache_control(
            json_response(StatusCode::OK, &value),
            resource.cache_directive(),
        ),
        Err(err) => {
            warn!(resource = %resource, error = %err, "Pass-through failed");
            failure_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                resource.failure_message(),
                err,
            )
        }
    }
}
