//! The four dashboard caches, built from one source and refreshed together.

use std::sync::Arc;

use futures::future::join4;
use tracing::info;
use treasury_core::{CalendarEvent, DataVersion, TreasuryData, TreasuryStats};

use crate::cache::{spawn_refresh_loop, RefreshHandle, ResourceCache};
use crate::error::FetchError;
use crate::resource::Resource;
use crate::source::TreasurySource;

/// Freshness summary for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResourceStatus {
    pub has_value: bool,
    pub has_error: bool,
    pub validating: bool,
}

/// Outcome of refreshing every resource once.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub succeeded: Vec<Resource>,
    pub failed: Vec<(Resource, FetchError)>,
}

impl RefreshReport {
    fn record<T>(&mut self, resource: Resource, result: Result<T, FetchError>) {
        match result {
            Ok(_) => self.succeeded.push(resource),
            Err(err) => self.failed.push((resource, err)),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shared handle to the data, stats, calendar and version caches.
#[derive(Clone)]
pub struct DashboardCache {
    pub data: Arc<ResourceCache<TreasuryData>>,
    pub stats: Arc<ResourceCache<TreasuryStats>>,
    pub calendar: Arc<ResourceCache<Vec<CalendarEvent>>>,
    pub version: Arc<ResourceCache<DataVersion>>,
}

impl DashboardCache {
    pub fn new(source: Arc<dyn TreasurySource>) -> Self {
        info!(source = source.id(), "Dashboard cache initialized");
        Self {
            data: Arc::new(ResourceCache::from_source(Arc::clone(&source), Resource::TreasuryData)),
            stats: Arc::new(ResourceCache::from_source(Arc::clone(&source), Resource::TreasuryStats)),
            calendar: Arc::new(ResourceCache::from_source(Arc::clone(&source), Resource::CalendarEvents)),
            version: Arc::new(ResourceCache::from_source(source, Resource::DataVersion)),
        }
    }

    /// Refresh all four resources concurrently.
    pub async fn refresh_all(&self) -> RefreshReport {
        let (data, stats, calendar, version) = join4(
            self.data.refresh(),
            self.stats.refresh(),
            self.calendar.refresh(),
            self.version.refresh(),
        )
        .await;

        let mut report = RefreshReport::default();
        report.record(Resource::TreasuryData, data);
        report.record(Resource::TreasuryStats, stats);
        report.record(Resource::CalendarEvents, calendar);
        report.record(Resource::DataVersion, version);

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Dashboard refresh complete"
        );
        report
    }

    /// Start a refresh loop per resource at its own interval.
    pub fn spawn_all(&self) -> DashboardRefresh {
        DashboardRefresh {
            handles: vec![
                spawn_refresh_loop(Arc::clone(&self.data)),
                spawn_refresh_loop(Arc::clone(&self.stats)),
                spawn_refresh_loop(Arc::clone(&self.calendar)),
                spawn_refresh_loop(Arc::clone(&self.version)),
            ],
        }
    }

    pub fn status(&self, resource: Resource) -> ResourceStatus {
        fn summarize<T>(cache: &ResourceCache<T>) -> ResourceStatus
        where
            T: Send + Sync + 'static,
        {
            let snapshot = cache.snapshot();
            ResourceStatus {
                has_value: snapshot.has_value(),
                has_error: snapshot.error.is_some(),
                validating: snapshot.is_validating,
            }
        }

        match resource {
            Resource::TreasuryData => summarize(&self.data),
            Resource::TreasuryStats => summarize(&self.stats),
            Resource::CalendarEvents => summarize(&self.calendar),
            Resource::DataVersion => summarize(&self.version),
        }
    }

    /// Close every cache; in-flight results are discarded.
    pub fn close(&self) {
        self.data.close();
        self.stats.close();
        self.calendar.close();
        self.version.close();
    }
}

/// Owns the dashboard's refresh loops; dropping it tears them all down.
pub struct DashboardRefresh {
    handles: Vec<RefreshHandle>,
}

impl DashboardRefresh {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn shutdown(self) {
        info!(loops = self.handles.len(), "Stopping dashboard refresh loops");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn full_source() -> Arc<MockSource> {
        Arc::new(
            MockSource::new()
                .with_value(Resource::TreasuryData, json!({"trsc": [], "pssc": []}))
                .with_value(Resource::TreasuryStats, json!({"trsc_count": 2}))
                .with_value(Resource::CalendarEvents, json!([]))
                .with_value(Resource::DataVersion, json!({"lastModified": 7})),
        )
    }

    #[tokio::test]
    async fn test_refresh_all_fills_every_cache() {
        let source = full_source();
        let dashboard = DashboardCache::new(source.clone());

        let report = dashboard.refresh_all().await;
        assert!(report.all_succeeded());
        assert_eq!(report.succeeded.len(), 4);
        assert_eq!(source.call_count(), 4);

        for resource in Resource::ALL {
            let status = dashboard.status(resource);
            assert!(status.has_value && !status.has_error && !status.validating);
        }
        assert_eq!(dashboard.version.value().unwrap().last_modified, 7);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_rest() {
        let source = full_source();
        source.set_error(
            Resource::CalendarEvents,
            FetchError::Network {
                path: "/calendar-events".to_string(),
                message: "connection reset".to_string(),
            },
        );
        let dashboard = DashboardCache::new(source.clone());

        let report = dashboard.refresh_all().await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Resource::CalendarEvents);

        assert_ok!(dashboard.data.refresh().await);
        assert_err!(dashboard.calendar.refresh().await);
        assert!(dashboard.status(Resource::CalendarEvents).has_error);
    }

    #[tokio::test]
    async fn test_dropping_refresh_closes_caches() {
        let dashboard = DashboardCache::new(full_source());
        let loops = dashboard.spawn_all();
        assert_eq!(loops.len(), 4);

        loops.shutdown();
        assert!(dashboard.data.is_closed());
        assert!(dashboard.version.is_closed());
        assert_eq!(dashboard.stats.refresh().await.unwrap_err(), FetchError::Closed);
    }
}
