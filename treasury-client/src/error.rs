//! Error type shared by the upstream client and the resource caches.

/// Failure to obtain one upstream resource.
///
/// `Clone` so a single failed fetch can be handed to every coalesced waiter
/// and kept in the cache snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status
    #[error("Failed to fetch {path}: {status}")]
    Status { path: String, status: String },

    /// Connection, TLS or timeout failure
    #[error("Network error fetching {path}: {message}")]
    Network { path: String, message: String },

    /// Body was not the expected JSON
    #[error("Invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    /// The cache was closed before the fetch completed
    #[error("Cache closed")]
    Closed,
}

impl FetchError {
    /// Upstream path the error relates to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Status { path, .. } | Self::Network { path, .. } | Self::Decode { path, .. } => {
                Some(path)
            }
            Self::Closed => None,
        }
    }

    pub(crate) fn network(path: &str, err: impl std::fmt::Display) -> Self {
        Self::Network {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(path: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}
