//! Upstream access for the Cardano treasury dashboard
//!
//! Fetches the four treasury documents from the public API and keeps each in
//! a revalidating cache with a fixed refresh interval.
//!
//! # Key Components
//!
//! - [`TreasurySource`]: Trait over anything that produces upstream documents
//! - [`TreasuryApi`]: reqwest-backed HTTP source
//! - [`ResourceCache`]: Stale-while-revalidate cache with request coalescing
//! - [`DashboardCache`]: The data, stats, calendar and version caches together
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use treasury_client::{DashboardCache, TreasuryApi};
//!
//! let api = Arc::new(TreasuryApi::public()?);
//! let dashboard = DashboardCache::new(api);
//! dashboard.refresh_all().await;
//! let _loops = dashboard.spawn_all();
//! ```

pub mod cache;
pub mod dashboard;
pub mod error;
pub mod resource;
pub mod source;

pub use cache::{spawn_refresh_loop, CacheSnapshot, Freshness, RefreshHandle, ResourceCache};
pub use dashboard::{DashboardCache, DashboardRefresh, RefreshReport, ResourceStatus};
pub use error::FetchError;
pub use resource::Resource;
pub use source::{MockSource, TreasuryApi, TreasurySource};
