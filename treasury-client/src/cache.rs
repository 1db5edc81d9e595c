//! Stale-while-revalidate cache for one upstream resource.
//!
//! Each [`ResourceCache`] holds the last good value and the last error behind a
//! `watch` channel, so readers always get a complete snapshot and can await
//! changes. Concurrent refreshes are coalesced: the first caller fetches, the
//! rest subscribe to a broadcast of its result.
//!
//! ```text
//!   subscribe() ──► snapshot now ──► (stale?) spawn refresh()
//!   refresh()   ──► in flight? ──yes──► wait on broadcast
//!                        │no
//!                        ▼
//!                     loader() ──► replace snapshot ──► broadcast result
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::resource::Resource;
use crate::source::{decode, TreasurySource};

type Loader<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;
type FetchResult<T> = Result<Arc<T>, FetchError>;

// =============================================================================
// Snapshot
// =============================================================================

/// Point-in-time view of a cached resource.
#[derive(Debug)]
pub struct CacheSnapshot<T> {
    /// Last successfully fetched value; kept across failed refreshes
    pub value: Option<Arc<T>>,
    /// Error from the most recent refresh, cleared on success
    pub error: Option<FetchError>,
    /// A refresh is in flight
    pub is_validating: bool,
    /// When `value` was last replaced
    pub updated_at: Option<DateTime<Utc>>,
    fetched_at: Option<Instant>,
}

impl<T> CacheSnapshot<T> {
    fn empty() -> Self {
        Self {
            value: None,
            error: None,
            is_validating: false,
            updated_at: None,
            fetched_at: None,
        }
    }

    /// Validating with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.is_validating && self.value.is_none()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Clone for CacheSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            error: self.error.clone(),
            is_validating: self.is_validating,
            updated_at: self.updated_at,
            fetched_at: self.fetched_at,
        }
    }
}

/// Freshness metadata served next to a cached value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Freshness {
    /// Missing, or older than the revalidation period
    pub stale: bool,
    pub validating: bool,
    /// Error from the most recent refresh; the served value predates it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Resource Cache
// =============================================================================

pub struct ResourceCache<T> {
    resource: Resource,
    period: Duration,
    loader: Loader<T>,
    state: watch::Sender<CacheSnapshot<T>>,
    in_flight: Mutex<Option<broadcast::Sender<FetchResult<T>>>>,
    closed: AtomicBool,
}

impl<T: Send + Sync + 'static> ResourceCache<T> {
    /// Create a cache that calls `loader` for every refresh and treats its
    /// value as stale after `period`.
    pub fn new<F, Fut>(resource: Resource, period: Duration, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (state, _) = watch::channel(CacheSnapshot::empty());
        Self {
            resource,
            period,
            loader: Box::new(move || loader().boxed()),
            state,
            in_flight: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Revalidation period.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn snapshot(&self) -> CacheSnapshot<T> {
        self.state.borrow().clone()
    }

    /// Current value, if any.
    pub fn value(&self) -> Option<Arc<T>> {
        self.state.borrow().value.clone()
    }

    /// Missing, or older than the revalidation period.
    pub fn is_stale(&self) -> bool {
        match self.state.borrow().fetched_at {
            Some(at) => at.elapsed() >= self.period,
            None => true,
        }
    }

    pub fn freshness(&self) -> Freshness {
        let snapshot = self.state.borrow();
        Freshness {
            stale: snapshot
                .fetched_at
                .map_or(true, |at| at.elapsed() >= self.period),
            validating: snapshot.is_validating,
            error: snapshot.error.as_ref().map(ToString::to_string),
            updated_at: snapshot.updated_at,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop accepting results. In-flight fetches still complete but their
    /// outcome is discarded.
    pub fn close(&self) {
        // Flipped under the state lock so no refresh commits after this returns.
        let mut newly_closed = false;
        self.state.send_if_modified(|_| {
            newly_closed = !self.closed.swap(true, Ordering::SeqCst);
            false
        });
        if newly_closed {
            debug!(resource = %self.resource, "Cache closed");
        }
    }

    /// Watch the cache. The receiver holds the current snapshot immediately;
    /// a background refresh is started when the value is missing or stale.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(self: &Arc<Self>) -> watch::Receiver<CacheSnapshot<T>> {
        let receiver = self.state.subscribe();
        self.revalidate_if_stale();
        receiver
    }

    /// Start a background refresh when the value is missing or stale.
    /// Returns whether one was started.
    pub fn revalidate_if_stale(self: &Arc<Self>) -> bool {
        if self.is_closed() || !self.is_stale() {
            return false;
        }
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let _ = cache.refresh().await;
        });
        true
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<broadcast::Sender<FetchResult<T>>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch now.
    ///
    /// Concurrent callers share a single upstream request. On success the
    /// value is replaced and the error cleared; on failure the previous value
    /// is kept and the error recorded.
    pub async fn refresh(&self) -> FetchResult<T> {
        if self.is_closed() {
            return Err(FetchError::Closed);
        }

        let leader = {
            let mut in_flight = self.lock_in_flight();
            match in_flight.as_ref() {
                Some(sender) => Err(sender.subscribe()),
                None => {
                    let (sender, _) = broadcast::channel(1);
                    *in_flight = Some(sender.clone());
                    Ok(sender)
                }
            }
        };
        let sender = match leader {
            Ok(sender) => sender,
            Err(mut receiver) => {
                debug!(resource = %self.resource, "Joining in-flight refresh");
                return receiver.recv().await.unwrap_or(Err(FetchError::Closed));
            }
        };
        let guard = InFlightGuard {
            cache: self,
            armed: true,
        };

        self.state.send_modify(|snapshot| snapshot.is_validating = true);
        debug!(resource = %self.resource, "Refreshing");

        let result = (self.loader)().await.map(Arc::new);

        // Commit, broadcast and free the slot under one lock: joiners always
        // see this result and the next leader starts from the committed state.
        let committed = {
            let mut in_flight = self.lock_in_flight();
            let committed = self.commit(&result);
            let outcome = if committed {
                result.clone()
            } else {
                Err(FetchError::Closed)
            };
            let _ = sender.send(outcome);
            in_flight.take();
            committed
        };
        guard.disarm();

        if !committed {
            debug!(resource = %self.resource, "Discarding result for closed cache");
            return Err(FetchError::Closed);
        }
        match &result {
            Ok(_) => debug!(resource = %self.resource, "Refreshed"),
            Err(err) => warn!(
                resource = %self.resource,
                error = %err,
                kept_value = self.state.borrow().value.is_some(),
                "Refresh failed"
            ),
        }
        result
    }

    /// Apply a fetch result to the snapshot unless the cache is closed.
    fn commit(&self, result: &FetchResult<T>) -> bool {
        self.state.send_if_modified(|snapshot| {
            if self.is_closed() {
                return false;
            }
            snapshot.is_validating = false;
            match result {
                Ok(value) => {
                    snapshot.value = Some(Arc::clone(value));
                    snapshot.error = None;
                    snapshot.updated_at = Some(Utc::now());
                    snapshot.fetched_at = Some(Instant::now());
                }
                Err(err) => snapshot.error = Some(err.clone()),
            }
            true
        })
    }
}

impl<T: DeserializeOwned + Send + Sync + 'static> ResourceCache<T> {
    /// Cache `resource` from `source` with the resource's refresh interval.
    pub fn from_source(source: Arc<dyn TreasurySource>, resource: Resource) -> Self {
        Self::new(resource, resource.refresh_interval(), move || {
            let source = Arc::clone(&source);
            async move { decode(resource, source.fetch_value(resource).await?) }
        })
    }
}

/// Clears the in-flight slot if the leading refresh is cancelled, so waiters
/// are released and later callers can fetch again.
struct InFlightGuard<'a, T: Send + Sync + 'static> {
    cache: &'a ResourceCache<T>,
    armed: bool,
}

impl<T: Send + Sync + 'static> InFlightGuard<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: Send + Sync + 'static> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.cache.lock_in_flight().take();
        self.cache
            .state
            .send_if_modified(|snapshot| std::mem::replace(&mut snapshot.is_validating, false));
    }
}

// =============================================================================
// Refresh Loop
// =============================================================================

/// Owns a periodic refresh task. Dropping or shutting down the handle stops
/// the timer and closes the cache.
pub struct RefreshHandle {
    resource: Resource,
    task: JoinHandle<()>,
    close: Box<dyn Fn() + Send + Sync>,
}

impl RefreshHandle {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and close the cache.
    pub fn shutdown(self) {}
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
        (self.close)();
        debug!(resource = %self.resource, "Refresh loop stopped");
    }
}

/// Spawn a task that refetches `cache` every period, regardless of staleness.
/// The first tick fires one period from now.
pub fn spawn_refresh_loop<T: Send + Sync + 'static>(cache: Arc<ResourceCache<T>>) -> RefreshHandle {
    let resource = cache.resource;
    let period = cache.period;
    let close = {
        let cache = Arc::clone(&cache);
        Box::new(move || cache.close())
    };

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if cache.is_closed() {
                break;
            }
            let _ = cache.refresh().await;
        }
    });

    info!(
        resource = %resource,
        interval_secs = period.as_secs(),
        "Refresh loop started"
    );

    RefreshHandle {
        resource,
        task,
        close,
    }
}

// =============================================================================
// Tests
// =============================================================================
