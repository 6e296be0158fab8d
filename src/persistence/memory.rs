use super::{CacheSnapshot, PersistError, SnapshotStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Keeps snapshots in process memory. Used for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<String, CacheSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of namespaces holding a snapshot.
    pub async fn len(&self) -> usize {
        self.snapshots.lock().await.len()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<CacheSnapshot>, PersistError> {
        Ok(self.snapshots.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, snapshot: &CacheSnapshot) -> Result<(), PersistError> {
        self.snapshots
            .lock()
            .await
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }
}
