//! Error types for the order cache client.

use crate::backend::BackendError;
use crate::framework::FrameworkError;
use thiserror::Error;

/// Errors surfaced by [`OrderCacheClient`](crate::clients::OrderCacheClient).
///
/// Malformed transaction references and cache misses are not errors; they come
/// back as `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderCacheError {
    /// The cache store task is no longer running.
    #[error("Order cache unavailable: {0}")]
    Store(#[from] FrameworkError),

    /// The backend call failed. The message is also recorded on the cache state.
    #[error("Order backend error: {0}")]
    Backend(#[from] BackendError),
}
