//! Durable snapshots of the order cache.
//!
//! Only the order collection and the session-level `last_updated` stamp are ever
//! written. Loading flags, error messages, the selected order and pagination are
//! transient and start empty after a restore.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileSnapshotStore;
pub use memory::MemorySnapshotStore;

use crate::model::Order;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace key used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "order-storage";

/// The persisted part of the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Somewhere to keep snapshots between sessions, keyed by namespace.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the snapshot stored under `key`, or `None` if there is none yet.
    async fn load(&self, key: &str) -> Result<Option<CacheSnapshot>, PersistError>;

    /// Replaces the snapshot stored under `key`.
    async fn save(&self, key: &str, snapshot: &CacheSnapshot) -> Result<(), PersistError>;
}
