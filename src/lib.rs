//! # Order Cache
//!
//! > **A client-side cache of course orders, kept honest by a single-writer store task.**
//!
//! This crate holds the orders a learner has placed, resolves the transaction
//! references a payment gateway hands back after checkout, and reconciles cached
//! orders with the status the gateway reports. The cache can be refreshed from the
//! backend at any time and is persisted between sessions.
//!
//! ## 🏗️ Design Philosophy
//!
//! Every read and every write goes through one Tokio task that owns the state.
//! Callers talk to it with messages that carry their own reply channel:
//! - **No locks**: the state is a plain struct, mutated by one task only.
//! - **No torn reads**: a lookup sees either all of a refresh or none of it.
//! - **No blocking**: backend fetches run on the caller's task; the store only
//!   receives their results.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic single-writer loop. [`StoreActor`](framework::StoreActor) drives any
//! [`StoreState`](framework::StoreState); [`StoreClient`](framework::StoreClient) is the
//! cloneable handle that sends it requests.
//!
//! ### 2. The Cache ([`order_cache`])
//! [`OrderCacheState`](order_cache::OrderCacheState) and its request set: lookups,
//! reconciliation patches, sequenced refreshes, selection and reset.
//!
//! ### 3. The Interface ([`clients`])
//! [`OrderCacheClient`](clients::OrderCacheClient) is what application code holds.
//! It decodes transaction references ([`txn_ref`]) and talks to the [`backend`].
//!
//! ### 4. The Edges ([`backend`], [`persistence`])
//! [`OrderBackend`](backend::OrderBackend) fetches pages and single orders;
//! [`SnapshotStore`](persistence::SnapshotStore) keeps the cache between sessions.
//! Each has an in-memory implementation, and the backend has a scripted
//! [`MockBackend`](backend::mock::MockBackend) for tests.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! [`OrderCacheSystem`](lifecycle::OrderCacheSystem) restores the snapshot, spawns the
//! store and shuts it down; [`CacheConfig`](config::CacheConfig) reads its settings
//! from the environment.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod backend;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_cache;
pub mod persistence;
pub mod txn_ref;
