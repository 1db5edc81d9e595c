//! Gateway error type.

use treasury_client::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Socket bind or accept failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream client could not be built or queried
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
