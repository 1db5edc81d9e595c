//! HTTP client for the public treasury API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use treasury_core::{CalendarEvent, DataVersion, TreasuryData, TreasuryStats};

use super::traits::TreasurySource;
use crate::error::FetchError;
use crate::resource::Resource;

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://cardanotreasury.fi/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream treasury API.
///
/// One GET per call, no retries and no schema validation beyond JSON
/// decoding. Every request bypasses intermediate caches.
#[derive(Debug, Clone)]
pub struct TreasuryApi {
    client: Client,
    base_url: String,
}

impl TreasuryApi {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::network(&base_url, e))?;

        Ok(Self { client, base_url })
    }

    /// Client for the public API with the default timeout.
    pub fn public() -> Result<Self, FetchError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }

    async fn send(&self, resource: Resource) -> Result<Response, FetchError> {
        let path = resource.path();
        let response = self
            .client
            .get(self.url(resource))
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| {
                warn!(resource = %resource, path, error = %e, "Upstream request failed");
                FetchError::network(path, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(resource = %resource, path, status = %status, "Upstream returned error status");
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.to_string(),
            });
        }

        debug!(resource = %resource, path, status = %status, "Upstream responded");
        Ok(response)
    }

    /// Fetch and decode one resource.
    pub async fn fetch_json<T: DeserializeOwned>(&self, resource: Resource) -> Result<T, FetchError> {
        self.send(resource)
            .await?
            .json::<T>()
            .await
            .map_err(|e| FetchError::decode(resource.path(), e))
    }

    pub async fn treasury_data(&self) -> Result<TreasuryData, FetchError> {
        self.fetch_json(Resource::TreasuryData).await
    }

    pub async fn treasury_stats(&self) -> Result<TreasuryStats, FetchError> {
        self.fetch_json(Resource::TreasuryStats).await
    }

    pub async fn calendar_events(&self) -> Result<Vec<CalendarEvent>, FetchError> {
        self.fetch_json(Resource::CalendarEvents).await
    }

    pub async fn data_version(&self) -> Result<DataVersion, FetchError> {
        self.fetch_json(Resource::DataVersion).await
    }
}

#[async_trait]
impl TreasurySource for TreasuryApi {
    fn id(&self) -> &str {
        &self.base_url
    }

    async fn fetch_value(&self, resource: Resource) -> Result<Value, FetchError> {
        self.fetch_json(resource).await
    }
}
