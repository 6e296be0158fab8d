//! Pure data structures shared by the cache, the backend and persistence.

pub mod order;
pub mod page;

pub use order::*;
pub use page::*;
