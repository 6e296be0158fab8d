//! Type-safe wrappers around [`StoreClient`](crate::framework::StoreClient).

pub mod order_cache_client;

pub use order_cache_client::*;
