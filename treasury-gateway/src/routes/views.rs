//! Derived views under `/api/views/*`, computed from the dashboard caches.
//!
//! Views read the last good snapshot and revalidate in the background when it
//! is stale. A cold cache is filled on demand; if that fails the view answers
//! 503 with the resource's failure message.
//!
//! Every view answers `{ "data": ..., "meta": { <resource>: Freshness } }` so a
//! client can tell when it is looking at a value whose last refresh failed.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use treasury_client::{Freshness, ResourceCache};
use treasury_core::calendar::{date_range_label, group_by_month, normalize_events, upcoming};
use treasury_core::{
    bucket_timeline, build_graph, build_overview, build_treemap, calendar_cards, compute_metrics,
    ExplorerView, MetricCard, MonthGroup, SyncState,
};

use super::{bad_request_response, failure_response, json_response};
use crate::server::AppState;

type HttpResponse = Response<Full<Bytes>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Timeline,
    Graph,
    Treemap,
    Metrics,
    Calendar,
    Contracts,
}

impl View {
    pub const PREFIX: &'static str = "/api/views/";

    /// Match a request path such as `/api/views/graph`.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.strip_prefix(Self::PREFIX)? {
            "overview" => Some(Self::Overview),
            "timeline" => Some(Self::Timeline),
            "graph" => Some(Self::Graph),
            "treemap" => Some(Self::Treemap),
            "metrics" => Some(Self::Metrics),
            "calendar" => Some(Self::Calendar),
            "contracts" => Some(Self::Contracts),
            _ => None,
        }
    }
}

/// Query for the contract explorer: `?q=<text>&focus=<trsc id>`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContractsQuery {
    q: String,
    focus: Option<String>,
}

#[derive(Debug, Serialize)]
struct CalendarView {
    range: String,
    total: usize,
    cards: Vec<MetricCard>,
    months: Vec<MonthGroup>,
}

#[derive(Debug, Serialize)]
struct ViewBody<T> {
    data: T,
    meta: BTreeMap<&'static str, Freshness>,
}

fn freshness<T: Send + Sync + 'static>(cache: &ResourceCache<T>) -> (&'static str, Freshness) {
    (cache.resource().name(), cache.freshness())
}

fn view_response<T: Serialize, const N: usize>(
    data: T,
    meta: [(&'static str, Freshness); N],
) -> HttpResponse {
    json_response(
        StatusCode::OK,
        &ViewBody {
            data,
            meta: meta.into_iter().collect(),
        },
    )
}

/// Last good value, filling a cold cache on demand.
async fn cached<T: Send + Sync + 'static>(
    cache: &Arc<ResourceCache<T>>,
) -> Result<Arc<T>, HttpResponse> {
    if let Some(value) = cache.value() {
        cache.revalidate_if_stale();
        return Ok(value);
    }

    cache.refresh().await.map_err(|err| {
        failure_response(
            StatusCode::SERVICE_UNAVAILABLE,
            cache.resource().failure_message(),
            err,
        )
    })
}

pub async fn handle_view(state: &AppState, view: View, query: Option<&str>) -> HttpResponse {
    debug!(view = ?view, "Serving derived view");
    match build_view(state, view, query).await {
        Ok(response) | Err(response) => response,
    }
}

async fn build_view(
    state: &AppState,
    view: View,
    query: Option<&str>,
) -> Result<HttpResponse, HttpResponse> {
    let dashboard = &state.dashboard;
    let response = match view {
        View::Overview => {
            // Hero figures render as placeholders until their resource loads
            let stats = cached(&dashboard.stats).await.ok();
            let version = cached(&dashboard.version).await.ok();
            view_response(
                build_overview(stats.as_deref(), version.as_deref()),
                [freshness(&dashboard.stats), freshness(&dashboard.version)],
            )
        }
        View::Timeline => {
            let data = cached(&dashboard.data).await?;
            view_response(bucket_timeline(&data.trsc), [freshness(&dashboard.data)])
        }
        View::Graph => {
            let data = cached(&dashboard.data).await?;
            view_response(build_graph(&data), [freshness(&dashboard.data)])
        }
        View::Treemap => {
            let data = cached(&dashboard.data).await?;
            view_response(build_treemap(&data), [freshness(&dashboard.data)])
        }
        View::Metrics => {
            // Placeholder cards stand in while stats are unavailable
            let stats = cached(&dashboard.stats).await.ok();
            view_response(compute_metrics(stats.as_deref()), [freshness(&dashboard.stats)])
        }
        View::Calendar => {
            let events = cached(&dashboard.calendar).await?;
            let stats = cached(&dashboard.stats).await.ok();
            let entries = normalize_events(&events);
            let window = upcoming(&entries, Utc::now(), state.args.upcoming_limit);

            let snapshot = dashboard.calendar.snapshot();
            let sync = SyncState {
                has_value: snapshot.has_value(),
                has_error: snapshot.error.is_some(),
                validating: snapshot.is_validating,
            };
            let calendar = CalendarView {
                range: date_range_label(&window),
                total: window.len(),
                cards: calendar_cards(&window, entries.len(), stats.as_deref(), sync),
                months: group_by_month(&window),
            };
            view_response(
                calendar,
                [freshness(&dashboard.calendar), freshness(&dashboard.stats)],
            )
        }
        View::Contracts => {
            let params: ContractsQuery = serde_urlencoded::from_str(query.unwrap_or_default())
                .map_err(|e| bad_request_response(&format!("Invalid query: {e}")))?;
            let data = cached(&dashboard.data).await?;
            let focus = params.focus.as_deref().filter(|id| !id.is_empty());
            view_response(
                ExplorerView::build(&data, focus, &params.q),
                [freshness(&dashboard.data)],
            )
        }
    };
    Ok(response)
}
