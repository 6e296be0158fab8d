//! # Core Store Framework
//!
//! This module defines the generic building blocks for a single-writer store.
//!
//! ## Key Types
//!
//! - [`StoreState`]: The trait a piece of state implements to be owned by a store task.
//! - [`StoreActor`]: The generic actor that owns the state and processes requests in order.
//! - [`StoreClient`]: The cloneable handle used to talk to the actor.
//! - [`FrameworkError`]: Communication errors (the actor is gone).

use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// State that is owned exclusively by a [`StoreActor`].
///
/// # Architecture Note
/// The actor hands every request to [`StoreState::handle`] one at a time, so the
/// state never needs a `Mutex`: each request runs to completion before the next
/// one is looked at. Requests carry their own [`Response`] senders, which keeps
/// every reply strongly typed without a catch-all reply enum.
///
/// # Context
/// `Context` holds the dependencies injected at [`StoreActor::run`] time
/// (persistence, configuration). Use `()` if none are needed.
#[async_trait]
pub trait StoreState: Send + 'static {
    /// The request enum accepted by this store.
    type Request: Send + Debug;

    /// The runtime context injected into every handler call.
    type Context: Send + Sync;

    /// Apply one request to the state.
    async fn handle(&mut self, request: Self::Request, ctx: &Self::Context);

    /// Number of records held, for lifecycle logging.
    fn size(&self) -> usize;
}

// =============================================================================
// 2. MESSAGES & ERRORS
// =============================================================================

/// Errors raised when the store task cannot be reached.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
    #[error("Store actor mailbox is full")]
    MailboxFull,
}

/// Type alias for the one-shot response channel carried by requests.
pub type Response<T> = oneshot::Sender<T>;

// =============================================================================
// 3. THE GENERIC ACTOR
// =============================================================================

/// The generic actor that owns a [`StoreState`].
///
/// This is the "server" half: it holds the state and the receiving end of the
/// mailbox. [`StoreActor::new`] returns the actor together with its
/// [`StoreClient`]; the actor does nothing until [`StoreActor::run`] is spawned.
pub struct StoreActor<S: StoreState> {
    receiver: mpsc::Receiver<S::Request>,
    state: S,
}

impl<S: StoreState> StoreActor<S> {
    /// Creates the actor around `state` with a mailbox of `buffer_size` requests.
    ///
    /// When the mailbox is full, client calls wait for space.
    pub fn new(state: S, buffer_size: usize) -> (Self, StoreClient<S>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, state };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// The `context` is lent to every [`StoreState::handle`] call.
    pub async fn run(mut self, context: S::Context) {
        // Just the type name, e.g. "OrderCacheState"
        let store_type = std::any::type_name::<S>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(store_type, size = self.state.size(), "Store started");

        while let Some(request) = self.receiver.recv().await {
            debug!(store_type, ?request, "Request");
            self.state.handle(request, &context).await;
        }

        info!(store_type, size = self.state.size(), "Shutdown");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A cloneable handle for sending requests to a [`StoreActor`].
pub struct StoreClient<S: StoreState> {
    sender: mpsc::Sender<S::Request>,
}

impl<S: StoreState> Clone for StoreClient<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: StoreState> StoreClient<S> {
    pub fn new(sender: mpsc::Sender<S::Request>) -> Self {
        Self { sender }
    }

    /// Sends a request built around a fresh response channel and waits for the reply.
    pub async fn call<T>(
        &self,
        build: impl FnOnce(Response<T>) -> S::Request,
    ) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    /// Queues a request whose reply is awaited separately.
    pub async fn send(&self, request: S::Request) -> Result<(), FrameworkError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    /// Queues a request without waiting, for use where `.await` is not possible (e.g. `Drop`).
    ///
    /// When the mailbox is full the request is handed to a spawned task that waits
    /// for space. Outside a Tokio runtime a full mailbox is reported as
    /// [`FrameworkError::MailboxFull`].
    pub fn notify(&self, request: S::Request) -> Result<(), FrameworkError> {
        match self.sender.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(FrameworkError::ActorClosed),
            Err(TrySendError::Full(request)) => {
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    return Err(FrameworkError::MailboxFull);
                };
                let sender = self.sender.clone();
                runtime.spawn(async move {
                    // the store may have shut down in the meantime
                    let _ = sender.send(request).await;
                });
                Ok(())
            }
        }
    }

    /// Whether the actor has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- A counter store ---

    #[derive(Default)]
    struct Tally {
        entries: Vec<u32>,
    }

    #[derive(Debug)]
    enum TallyRequest {
        Push {
            value: u32,
            respond_to: Response<usize>,
        },
        Sum {
            respond_to: Response<u32>,
        },
        Clear,
    }

    #[async_trait]
    impl StoreState for Tally {
        type Request = TallyRequest;
        type Context = u32;

        async fn handle(&mut self, request: TallyRequest, ctx: &u32) {
            match request {
                TallyRequest::Push { value, respond_to } => {
                    self.entries.push(value * ctx);
                    let _ = respond_to.send(self.entries.len());
                }
                TallyRequest::Sum { respond_to } => {
                    let _ = respond_to.send(self.entries.iter().sum());
                }
                TallyRequest::Clear => self.entries.clear(),
            }
        }

        fn size(&self) -> usize {
            self.entries.len()
        }
    }

    #[tokio::test]
    async fn test_requests_are_applied_in_order_with_context() {
        let (actor, client) = StoreActor::new(Tally::default(), 8);
        let handle = tokio::spawn(actor.run(10));

        assert_eq!(client.call(|r| TallyRequest::Push { value: 1, respond_to: r }).await, Ok(1));
        assert_eq!(client.call(|r| TallyRequest::Push { value: 2, respond_to: r }).await, Ok(2));
        assert_eq!(client.call(|r| TallyRequest::Sum { respond_to: r }).await, Ok(30));

        client.notify(TallyRequest::Clear).unwrap();
        assert_eq!(client.call(|r| TallyRequest::Sum { respond_to: r }).await, Ok(0));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_actor_reports_error() {
        let (actor, client) = StoreActor::new(Tally::default(), 8);
        drop(actor);

        assert!(client.is_closed());
        let result = client.call(|r| TallyRequest::Sum { respond_to: r }).await;
        assert_eq!(result, Err(FrameworkError::ActorClosed));
        assert_eq!(
            client.notify(TallyRequest::Clear),
            Err(FrameworkError::ActorClosed)
        );
    }

    #[test]
    fn test_full_mailbox_without_runtime_is_reported() {
        let (_actor, client) = StoreActor::new(Tally::default(), 1);

        assert_eq!(client.notify(TallyRequest::Clear), Ok(()));
        assert_eq!(
            client.notify(TallyRequest::Clear),
            Err(FrameworkError::MailboxFull)
        );
    }

    #[tokio::test]
    async fn test_notify_waits_for_space_on_full_mailbox() {
        let (actor, client) = StoreActor::new(Tally::default(), 1);

        let (respond_to, first) = oneshot::channel();
        client
            .send(TallyRequest::Push { value: 1, respond_to })
            .await
            .unwrap();
        // the mailbox holds one request; this one is deferred, not lost
        client.notify(TallyRequest::Clear).unwrap();

        let handle = tokio::spawn(actor.run(5));
        assert_eq!(first.await, Ok(1));

        let mut sum = client.call(|r| TallyRequest::Sum { respond_to: r }).await.unwrap();
        while sum != 0 {
            tokio::task::yield_now().await;
            sum = client.call(|r| TallyRequest::Sum { respond_to: r }).await.unwrap();
        }

        drop(client);
        handle.await.unwrap();
    }
}
