//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one task per connection.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};
use treasury_client::{DashboardCache, Resource, TreasurySource};

use crate::config::Args;
use crate::error::Result;
use crate::routes::{self, views::View};

/// Shared state for every connection.
pub struct AppState {
    pub args: Args,
    /// Upstream used by the pass-through endpoints
    pub source: Arc<dyn TreasurySource>,
    /// Caches backing the derived views
    pub dashboard: DashboardCache,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, source: Arc<dyn TreasurySource>) -> Self {
        let dashboard = DashboardCache::new(Arc::clone(&source));
        Self {
            args,
            source,
            dashboard,
            started_at: Instant::now(),
        }
    }
}

/// Bind to the configured address and serve until the process exits.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;
    info!("Treasury gateway listening on {}", state.args.listen);
    serve(listener, state).await
}

/// Serve connections from an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    info!(%addr, %method, %path, "Request");

    Ok(route(&state, &method, &path, query.as_deref()).await)
}

/// Dispatch one request to its handler.
pub async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> Response<Full<Bytes>> {
    if method == Method::OPTIONS {
        return routes::preflight_response();
    }

    let is_known = path == "/health" || api_resource(path).is_some() || View::from_path(path).is_some();
    if method != Method::GET {
        return if is_known {
            routes::method_not_allowed_response(method, path)
        } else {
            routes::not_found_response(path)
        };
    }

    if path == "/health" {
        return routes::health_check(state);
    }
    if let Some(resource) = api_resource(path) {
        return routes::handle_passthrough(state, resource).await;
    }
    if let Some(view) = View::from_path(path) {
        return routes::handle_view(state, view, query).await;
    }

    routes::not_found_response(path)
}

/// `/api/treasury-data` and friends.
fn api_resource(path: &str) -> Option<Resource> {
    path.strip_prefix("/api").and_then(Resource::from_path)
}
