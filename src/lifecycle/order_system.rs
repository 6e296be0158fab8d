use crate::backend::OrderBackend;
use crate::clients::OrderCacheClient;
use crate::config::CacheConfig;
use crate::order_cache::{self, OrderCacheContext, OrderCacheState};
use crate::persistence::{JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// The runtime orchestrator for the order cache.
///
/// `OrderCacheSystem` is responsible for:
/// - **Restore**: loading the persisted snapshot before the store starts
/// - **Dependency Wiring**: injecting the snapshot store into the store task and
///   the backend into the client
/// - **Lifecycle Management**: spawning the store task and awaiting it on shutdown
///
/// # Example
///
/// ```ignore
/// let system = OrderCacheSystem::from_config(&config, backend).await;
///
/// system.client.refresh(&config.first_page()).await?;
/// let order = system.client.find_by_txn_ref("20250821160529_7").await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderCacheSystem {
    /// Client for the order cache store
    pub client: OrderCacheClient,

    /// Task handle of the store (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl OrderCacheSystem {
    /// Starts the system with the snapshot store chosen by `config.snapshot_dir`.
    pub async fn from_config(config: &CacheConfig, backend: Arc<dyn OrderBackend>) -> Self {
        let snapshots: Arc<dyn SnapshotStore> = match &config.snapshot_dir {
            Some(dir) => Arc::new(JsonFileSnapshotStore::new(dir)),
            None => Arc::new(MemorySnapshotStore::new()),
        };
        Self::start(config, backend, snapshots).await
    }

    /// Restores the cache from `snapshots`, then spawns the store task.
    ///
    /// A snapshot that cannot be read is logged and ignored; the cache starts empty.
    pub async fn start(
        config: &CacheConfig,
        backend: Arc<dyn OrderBackend>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        let state = match snapshots.load(&config.namespace).await {
            Ok(Some(snapshot)) => {
                info!(namespace = %config.namespace, orders = snapshot.orders.len(), "Restored order cache");
                OrderCacheState::restore(snapshot)
            }
            Ok(None) => OrderCacheState::new(),
            Err(e) => {
                warn!(namespace = %config.namespace, error = %e, "Ignoring unreadable snapshot");
                OrderCacheState::new()
            }
        };

        let (actor, inner) = order_cache::new(state, config.channel_capacity);
        let context = OrderCacheContext {
            snapshots,
            namespace: config.namespace.clone(),
        };
        let handle = tokio::spawn(actor.run(context));

        Self {
            client: OrderCacheClient::new(inner, backend),
            handle,
        }
    }

    /// Gracefully shuts down the store.
    ///
    /// Drops the system's client, which closes the mailbox once every other clone
    /// is gone too, then waits for the store task to drain its queue.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the store shut down cleanly
    /// - `Err(String)` if the store task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down order cache...");

        drop(self.client);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("Order cache shutdown complete.");
        Ok(())
    }
}
