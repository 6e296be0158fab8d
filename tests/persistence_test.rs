use async_trait::async_trait;
use order_cache::backend::mock::MockBackend;
use order_cache::config::CacheConfig;
use order_cache::lifecycle::OrderCacheSystem;
use order_cache::model::{
    CourseRef, Order, OrderDetail, OrderId, OrderPatch, OrderQuery, OrderStatus, Page, PaymentMethod,
};
use order_cache::persistence::{
    CacheSnapshot, JsonFileSnapshotStore, MemorySnapshotStore, PersistError, SnapshotStore,
};
use std::sync::Arc;

fn order(id: u64) -> Order {
    Order::new(
        id,
        PaymentMethod::VnPay,
        OrderDetail {
            price: 42.0,
            course: CourseRef {
                id: 11,
                title: "Trait Objects".into(),
                thumbnail: Some("/img/traits.png".into()),
            },
        },
    )
}

fn seeded_backend() -> MockBackend {
    let mock = MockBackend::new();
    mock.expect_fetch_page()
        .return_ok(Page::single(vec![order(7), order(12)]));
    mock
}

/// A second session sees the first session's orders, including reconciled status.
#[tokio::test]
async fn test_restore_across_sessions() {
    let store = Arc::new(MemorySnapshotStore::new());
    let config = CacheConfig::default();

    let first = OrderCacheSystem::start(&config, Arc::new(seeded_backend()), store.clone()).await;
    first.client.refresh(&OrderQuery::first_page(10)).await.unwrap();
    first
        .client
        .reconcile_txn_ref("20250821160529_7", OrderPatch::status(OrderStatus::Completed))
        .await
        .unwrap();
    first.client.select_order(OrderId(12)).await.unwrap();
    let saved = first.client.view().await.unwrap();
    first.shutdown().await.unwrap();

    let second = OrderCacheSystem::start(&config, Arc::new(MockBackend::new()), store.clone()).await;
    let restored = second.client.view().await.unwrap();
    assert_eq!(restored.orders, saved.orders);
    assert_eq!(restored.last_updated, saved.last_updated);
    assert_eq!(
        restored.order(OrderId(7)).map(|o| o.status),
        Some(OrderStatus::Completed)
    );
    // transient fields are not persisted
    assert!(restored.current_order.is_none());
    assert!(restored.error.is_none());
    assert!(!restored.loading);

    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reset_persists_empty_snapshot() {
    let store = Arc::new(MemorySnapshotStore::new());
    let config = CacheConfig::default();

    let system = OrderCacheSystem::start(&config, Arc::new(seeded_backend()), store.clone()).await;
    system.client.refresh(&OrderQuery::first_page(10)).await.unwrap();
    system.client.reset().await.unwrap();
    system.shutdown().await.unwrap();

    let snapshot = store.load(&config.namespace).await.unwrap().unwrap();
    assert!(snapshot.orders.is_empty());
    assert!(snapshot.last_updated.is_none());
}

#[tokio::test]
async fn test_json_file_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = CacheConfig {
        snapshot_dir: Some(dir.path().to_path_buf()),
        ..CacheConfig::default()
    };

    let first = OrderCacheSystem::from_config(&config, Arc::new(seeded_backend())).await;
    first.client.refresh(&config.first_page()).await.unwrap();
    first.shutdown().await.unwrap();

    let file = JsonFileSnapshotStore::new(dir.path()).path_for(&config.namespace);
    assert!(file.ends_with("order-storage.json"));
    let raw = std::fs::read_to_string(&file).unwrap();
    assert!(raw.contains("\"lastUpdated\""));
    assert!(raw.contains("\"totalAmount\""));

    let second = OrderCacheSystem::from_config(&config, Arc::new(MockBackend::new())).await;
    let ids: Vec<OrderId> = second
        .client
        .orders()
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&OrderId(7)));
    assert!(ids.contains(&OrderId(12)));
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("order-storage.json"), "{ not json").unwrap();
    let config = CacheConfig {
        snapshot_dir: Some(dir.path().to_path_buf()),
        ..CacheConfig::default()
    };

    let system = OrderCacheSystem::from_config(&config, Arc::new(MockBackend::new())).await;
    assert!(system.client.orders().await.unwrap().is_empty());
    system.shutdown().await.unwrap();
}

struct BrokenStore;

#[async_trait]
impl SnapshotStore for BrokenStore {
    async fn load(&self, _key: &str) -> Result<Option<CacheSnapshot>, PersistError> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _snapshot: &CacheSnapshot) -> Result<(), PersistError> {
        Err(PersistError::Io(std::io::Error::other("disk full")))
    }
}

/// Failing to persist never fails the operation that triggered it.
#[tokio::test]
async fn test_save_failure_is_not_fatal() {
    let system = OrderCacheSystem::start(
        &CacheConfig::default(),
        Arc::new(seeded_backend()),
        Arc::new(BrokenStore),
    )
    .await;

    system.client.refresh(&OrderQuery::first_page(10)).await.unwrap();
    let reconciled = system
        .client
        .update_order_status(OrderId(12), OrderStatus::Failed)
        .await
        .unwrap();
    assert_eq!(reconciled.map(|o| o.status), Some(OrderStatus::Failed));
    assert_eq!(system.client.orders().await.unwrap().len(), 2);

    system.shutdown().await.unwrap();
}
