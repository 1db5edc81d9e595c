//! Treasury gateway - HTTP front for the Cardano treasury explorer
//!
//! ## Endpoints
//!
//! - **Pass-through**: `/api/treasury-data`, `/api/treasury-stats`,
//!   `/api/calendar-events`, `/api/data-version` relay the upstream JSON with
//!   shared-cache directives
//! - **Views**: `/api/views/{overview,timeline,graph,treemap,metrics,calendar,contracts}`
//!   serve shapes computed from the refreshed dashboard caches
//! - **Health**: `/health` reports per-resource cache state

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::Args;
pub use error::{GatewayError, Result};
pub use server::{route, run, serve, AppState};
