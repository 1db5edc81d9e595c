//! The `TreasurySource` trait - the seam between the caches and the network.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;
use crate::resource::Resource;

/// Anything that can produce upstream treasury documents.
///
/// Implemented by [`super::TreasuryApi`] over HTTP and by
/// [`super::MockSource`] in tests.
#[async_trait]
pub trait TreasurySource: Send + Sync {
    /// Short identifier for logs.
    fn id(&self) -> &str;

    /// Fetch one resource as untyped JSON.
    async fn fetch_value(&self, resource: Resource) -> Result<Value, FetchError>;
}

/// Decode an untyped document into its record shape.
pub fn decode<T: DeserializeOwned>(resource: Resource, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::decode(resource.path(), e))
}
