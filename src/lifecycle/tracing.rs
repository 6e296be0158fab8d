//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=info cargo run                  # lifecycle, refreshes, reconciliations
//! RUST_LOG=debug cargo run                 # every store request with its payload
//! RUST_LOG=order_cache::txn_ref=warn cargo run
//! ```
//!
//! With `RUST_LOG=info` a payment callback round trip reads:
//!
//! ```text
//! INFO Store started store_type="OrderCacheState" size=0
//! INFO refresh: Refreshed seq=1 orders=5 total=5
//! INFO reconcile_txn_ref: Reconciled id=7 status=COMPLETED
//! INFO Shutdown store_type="OrderCacheState" size=5
//! ```
//!
//! A malformed reference shows up once, at warn, and goes no further:
//!
//! ```text
//! WARN find_by_txn_ref: Ignoring malformed transaction reference txn_ref="2025_abc" error=...
//! ```

/// Initializes structured logging from `RUST_LOG`. Call once, from the binary.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
