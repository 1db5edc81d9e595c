//! Data shaping for the Cardano treasury dashboard
//!
//! Pure, synchronous transformations from the upstream treasury documents into
//! display-ready structures. Nothing here performs I/O; fetching and caching
//! live in `treasury-client`.
//!
//! # Key Components
//!
//! - [`model`]: Upstream record shapes (`TreasuryData`, `TreasuryStats`, `CalendarEvent`, ...)
//! - [`ProjectIndex`]: Soft join from child links to project contracts by `fund_tx`
//! - [`contracts`]: Text filtering, focus, and budget/claim totals for the explorer
//! - [`timeline`]: Monthly incoming/outgoing buckets
//! - [`graph`]: Node/edge layout of the routing hierarchy
//! - [`treemap`]: Budget distribution groups
//! - [`calendar`]: Milestone normalization and month grouping
//! - [`metrics`] and [`format`]: Headline cards, hero overview and ADA formatting
//!
//! # Example
//!
//! ```ignore
//! use treasury_core::{build_graph, bucket_timeline, TreasuryData};
//!
//! let data: TreasuryData = serde_json::from_str(&body)?;
//! let graph = build_graph(&data);
//! let points = bucket_timeline(&data.trsc);
//! ```

pub mod calendar;
pub mod contracts;
pub mod dates;
pub mod format;
pub mod graph;
pub mod index;
pub mod metrics;
pub mod model;
pub mod timeline;
pub mod treemap;

// Re-export main types
pub use calendar::{group_by_month, normalize_events, upcoming, CalendarEntry, MonthGroup};
pub use contracts::{
    aggregate, filter_by_query, resolve_focused, select_projects, ContractTotals, ExplorerView,
    FocusState, ProjectRow, RoutingSummary, Selection,
};
pub use dates::{parse_date, DateParseError};
pub use format::{format_ada, format_ada_brief, format_amount, format_currency, format_percent};
pub use graph::{build_graph, log_size, Graph, GraphCounts, GraphEdge, GraphNode, NodeKind};
pub use index::ProjectIndex;
pub use metrics::{
    build_overview, calendar_cards, compute_metrics, MetricCard, Overview, SyncState, Tone,
};
pub use model::*;
pub use timeline::{bucket_timeline, TimelineBucket};
pub use treemap::{build_treemap, TreemapGroup, TreemapTile};
