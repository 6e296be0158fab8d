//! Generic single-writer store framework.
//!
//! This module provides the building blocks for keeping a piece of mutable state
//! inside one Tokio task and talking to it through typed request messages.
//!
//! # Main Components
//!
//! - [`StoreState`] - Trait implemented by the state a store task owns
//! - [`StoreActor`] - Generic actor that runs the request loop
//! - [`StoreClient`] - Cloneable handle that sends requests and awaits replies
//! - [`FrameworkError`] - Communication errors
//!
//! # Testing
//!
//! See [`crate::backend::mock`] for a scripted backend used to drive stores in tests.

pub mod core;

// Re-export core types for convenience
pub use self::core::*;
