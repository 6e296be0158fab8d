//! # Order Cache Demo
//!
//! Seeds an in-memory backend, refreshes the cache, then plays the part of a
//! payment gateway callback: resolve the transaction reference and mark the order
//! completed.

use chrono::{Duration, Utc};
use order_cache::backend::InMemoryBackend;
use order_cache::config::CacheConfig;
use order_cache::lifecycle::{setup_tracing, OrderCacheSystem};
use order_cache::model::{CourseRef, Order, OrderDetail, OrderPatch, OrderStatus, PaymentMethod};
use std::sync::Arc;
use tracing::{error, info, Instrument};

fn seed() -> Vec<Order> {
    let courses = [
        (7u64, "Async Rust in Practice", PaymentMethod::VnPay, 49.0),
        (12, "Ownership from Scratch", PaymentMethod::Momo, 29.0),
        (15, "Writing Parsers with nom", PaymentMethod::BankTransfer, 39.0),
    ];
    let now = Utc::now();
    courses
        .into_iter()
        .enumerate()
        .map(|(i, (id, title, method, price))| {
            let mut order = Order::new(
                id,
                method,
                OrderDetail {
                    price,
                    course: CourseRef {
                        id: 100 + id,
                        title: title.to_string(),
                        thumbnail: None,
                    },
                },
            );
            order.created_at = now - Duration::hours(i as i64);
            order.updated_at = order.created_at;
            order.total_amount = Some(price);
            order
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = CacheConfig::from_env().map_err(|e| e.to_string())?;
    info!(namespace = %config.namespace, "Starting order cache demo");

    let backend = Arc::new(InMemoryBackend::new(seed()));
    let system = OrderCacheSystem::from_config(&config, backend).await;

    let span = tracing::info_span!("initial_refresh");
    async {
        info!("Loading first page of orders");
        system
            .client
            .refresh(&config.first_page())
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    let txn_ref = "20250821160529_7";
    let span = tracing::info_span!("payment_callback", txn_ref);
    let reconciled = async {
        match system.client.find_by_txn_ref(txn_ref).await {
            Ok(Some(order)) => info!(id = %order.id, status = %order.status, "Resolved order"),
            Ok(None) => info!("No cached order for reference"),
            Err(e) => error!(error = %e, "Lookup failed"),
        }
        system
            .client
            .reconcile_txn_ref(txn_ref, OrderPatch::status(OrderStatus::Completed))
            .await
    }
    .instrument(span)
    .await;

    match reconciled {
        Ok(Some(order)) => info!(id = %order.id, status = %order.status, "Payment reconciled"),
        Ok(None) => info!("Nothing to reconcile"),
        Err(e) => error!(error = %e, "Reconciliation failed"),
    }

    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
