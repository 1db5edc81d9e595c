//! In-memory treasury source for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::traits::TreasurySource;
use crate::error::FetchError;
use crate::resource::Resource;

/// Mock source for testing.
///
/// Serves canned documents per resource, optionally after a delay, and counts
/// calls so tests can assert on deduplication.
pub struct MockSource {
    responses: Mutex<HashMap<Resource, Result<Value, FetchError>>>,
    delay: Duration,
    call_count: AtomicU32,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay: Duration::ZERO,
            call_count: AtomicU32::new(0),
        }
    }

    /// Serve `value` for `resource`.
    pub fn with_value(self, resource: Resource, value: Value) -> Self {
        self.set_value(resource, value);
        self
    }

    /// Delay every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_value(&self, resource: Resource, value: Value) {
        self.set_response(resource, Ok(value));
    }

    pub fn set_error(&self, resource: Resource, error: FetchError) {
        self.set_response(resource, Err(error));
    }

    fn set_response(&self, resource: Resource, response: Result<Value, FetchError>) {
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        responses.insert(resource, response);
    }

    /// Get the number of times `fetch_value` was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreasurySource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch_value(&self, resource: Resource) -> Result<Value, FetchError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        responses.get(&resource).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                path: resource.path().to_string(),
                status: "404 Not Found".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_counts_calls() {
        let source = MockSource::new().with_value(Resource::DataVersion, serde_json::json!({"lastModified": 1}));

        assert!(source.fetch_value(Resource::DataVersion).await.is_ok());
        assert!(source.fetch_value(Resource::TreasuryData).await.is_err());
        assert_eq!(source.call_count(), 2);

        source.reset_call_count();
        assert_eq!(source.call_count(), 0);
    }
}
