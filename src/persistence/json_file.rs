//! Snapshots as JSON files, one per namespace: `<dir>/<namespace>.json`.

use super::{CacheSnapshot, PersistError, SnapshotStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The file a namespace is stored in.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<CacheSnapshot>, PersistError> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: CacheSnapshot = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), orders = snapshot.orders.len(), "Snapshot loaded");
        Ok(Some(snapshot))
    }

    async fn save(&self, key: &str, snapshot: &CacheSnapshot) -> Result<(), PersistError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let body = serde_json::to_vec_pretty(snapshot)?;
        // readers never see a partially written file
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), orders = snapshot.orders.len(), "Snapshot saved");
        Ok(())
    }
}
