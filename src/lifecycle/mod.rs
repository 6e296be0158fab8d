//! # System Lifecycle & Orchestration
//!
//! This module starts, wires and stops the order cache.
//!
//! **Key Responsibilities:**
//! 1. **Restore** - Load the persisted snapshot before the store task starts
//! 2. **Dependency Injection** - Hand the snapshot store to the store task via `run(context)`
//!    and the backend to the client
//! 3. **Graceful Shutdown** - Drop the client and await the store task
//! 4. **Observability Setup** - Initialize tracing
//!
//! ## Dependency Injection via Context
//!
//! The store state is built first, with no dependencies; persistence is injected
//! when the task is started:
//!
//! ```rust,ignore
//! let (actor, inner) = order_cache::new(state, config.channel_capacity);
//! tokio::spawn(actor.run(OrderCacheContext { snapshots, namespace }));
//! let client = OrderCacheClient::new(inner, backend);
//! ```
//!
//! The backend lives on the client, not in the store: fetches run on the caller's
//! task and only their results are sent to the store.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - Closes the sender side of the mailbox
//! 2. **Store detects closure** - `receiver.recv()` returns `None`
//! 3. **Store drains** - Remaining requests are processed, final size is logged
//! 4. **Await completion** - [`OrderCacheSystem::shutdown`] waits for the task
//!
//! Clones of the client held elsewhere keep the store alive; drop them first.

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use self::tracing::*;
