//! Upstream source abstraction.
//!
//! - HTTP client for the public treasury API
//! - Mock source for testing

pub mod http;
pub mod mock;
pub mod traits;

pub use http::{TreasuryApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use mock::MockSource;
pub use traits::{decode, TreasurySource};
