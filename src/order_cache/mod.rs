//! Order cache state, its requests and the factory that starts it.

pub mod error;
pub mod requests;
pub mod state;

pub use error::*;
pub use requests::*;
pub use state::*;

use crate::framework::{StoreActor, StoreClient};

/// Creates the order cache actor around `state` and its generic client.
///
/// The actor does nothing until it is spawned with an [`OrderCacheContext`].
pub fn new(
    state: OrderCacheState,
    buffer_size: usize,
) -> (StoreActor<OrderCacheState>, StoreClient<OrderCacheState>) {
    StoreActor::new(state, buffer_size)
}
