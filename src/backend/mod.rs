//! The backend order listing the cache reads through.
//!
//! The cache never talks HTTP itself; it is handed an [`OrderBackend`] at
//! construction time. [`InMemoryBackend`] serves a seeded list (demo binary,
//! integration tests) and [`mock::MockBackend`] replays scripted responses.

pub mod memory;
pub mod mock;

pub use memory::InMemoryBackend;

use crate::model::{Order, OrderFilter, OrderId, Page, PageRequest};
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error status.
    #[error("backend returned {code}: {message}")]
    Status { code: u16, message: String },

    /// No order with this id exists on the backend.
    #[error("order {0} not found")]
    NotFound(OrderId),
}

/// Source of authoritative order data.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Fetch one page of orders matching `filter`.
    async fn fetch_page(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, BackendError>;

    /// Fetch a single order by id.
    async fn fetch_order(&self, id: OrderId) -> Result<Order, BackendError>;
}
