//! # Order Cache Client
//!
//! The handle UI code holds. It wraps the generic `StoreClient<OrderCacheState>`
//! and the backend, decodes transaction references at the boundary, and runs
//! backend fetches on the caller's task so the store is never blocked on I/O.

use crate::backend::OrderBackend;
use crate::framework::{FrameworkError, Response, StoreClient};
use crate::model::{Order, OrderId, OrderPatch, OrderQuery, OrderStatus};
use crate::order_cache::{
    CacheView, OrderCacheError, OrderCacheRequest, OrderCacheState, RefreshOutcome, RefreshTicket,
};
use crate::txn_ref::decode_or_warn;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

/// Client for the order cache.
///
/// Cheap to clone; every clone talks to the same store task.
#[derive(Clone)]
pub struct OrderCacheClient {
    inner: StoreClient<OrderCacheState>,
    backend: Arc<dyn OrderBackend>,
}

/// Sends `AbandonRefresh` if a refresh is dropped before its completion is delivered.
///
/// The guard is armed before `BeginRefresh` is sent and owns the ticket reply, so a
/// ticket the store handed out is never lost, however early the refresh is dropped.
struct InFlightGuard<'a> {
    inner: &'a StoreClient<OrderCacheState>,
    reply: Option<oneshot::Receiver<RefreshTicket>>,
    ticket: Option<RefreshTicket>,
    settled: bool,
}

impl<'a> InFlightGuard<'a> {
    fn arm(inner: &'a StoreClient<OrderCacheState>) -> (Self, Response<RefreshTicket>) {
        let (respond_to, reply) = oneshot::channel();
        let guard = Self {
            inner,
            reply: Some(reply),
            ticket: None,
            settled: false,
        };
        (guard, respond_to)
    }

    async fn ticket(&mut self) -> Result<RefreshTicket, FrameworkError> {
        let Some(reply) = self.reply.as_mut() else {
            return self.ticket.ok_or(FrameworkError::ActorDropped);
        };
        let ticket = reply.await.map_err(|_| FrameworkError::ActorDropped)?;
        self.reply = None;
        self.ticket = Some(ticket);
        Ok(ticket)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let ticket = match (self.ticket, self.reply.as_mut()) {
            (Some(ticket), _) => Some(ticket),
            (None, Some(reply)) => {
                // closing first means the store either already sent the ticket or
                // will see the send fail and abandon it itself
                reply.close();
                reply.try_recv().ok()
            }
            (None, None) => None,
        };
        let Some(ticket) = ticket else {
            return;
        };
        let request = OrderCacheRequest::AbandonRefresh { ticket };
        if let Err(e) = self.inner.notify(request) {
            warn!(seq = ticket.0, error = %e, "Could not report abandoned refresh");
        }
    }
}

impl OrderCacheClient {
    pub fn new(inner: StoreClient<OrderCacheState>, backend: Arc<dyn OrderBackend>) -> Self {
        Self { inner, backend }
    }

    /// Looks up the cached order a gateway transaction reference points at.
    ///
    /// Malformed references are logged at warn and, like cache misses, return `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn find_by_txn_ref(&self, txn_ref: &str) -> Result<Option<Order>, OrderCacheError> {
        let Some(id) = decode_or_warn(txn_ref) else {
            return Ok(None);
        };
        self.get(id).await
    }

    /// Applies `patch` to the cached order a transaction reference points at.
    ///
    /// Returns the merged order, or `None` when the reference is malformed or the
    /// order is not cached; in both cases nothing changes.
    #[instrument(skip(self))]
    pub async fn reconcile_txn_ref(
        &self,
        txn_ref: &str,
        patch: OrderPatch,
    ) -> Result<Option<Order>, OrderCacheError> {
        let Some(id) = decode_or_warn(txn_ref) else {
            return Ok(None);
        };
        self.patch(id, patch).await
    }

    /// Sets the status of a cached order. No-op on a cache miss.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderCacheError> {
        self.patch(id, OrderPatch::status(status)).await
    }

    /// Cached order by id, without touching the backend.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderCacheError> {
        Ok(self
            .inner
            .call(|respond_to| OrderCacheRequest::Find { id, respond_to })
            .await?)
    }

    async fn patch(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>, OrderCacheError> {
        debug!(%id, ?patch, "Sending patch");
        Ok(self
            .inner
            .call(|respond_to| OrderCacheRequest::Patch { id, patch, respond_to })
            .await?)
    }

    /// Replaces the cached collection with one page from the backend.
    ///
    /// A failed fetch leaves the collection untouched, records the message on the
    /// state and returns `Err(OrderCacheError::Backend)`. If a refresh started
    /// later has already landed, the result is discarded and `Ok(RefreshOutcome::Stale)`
    /// is returned, whether the fetch succeeded or not.
    #[instrument(skip(self))]
    pub async fn refresh(&self, query: &OrderQuery) -> Result<RefreshOutcome, OrderCacheError> {
        let (mut guard, respond_to) = InFlightGuard::arm(&self.inner);
        self.inner
            .send(OrderCacheRequest::BeginRefresh { respond_to })
            .await?;
        let ticket = guard.ticket().await?;

        let fetched = self.backend.fetch_page(&query.filter, &query.page).await;
        let (result, backend_error) = match fetched {
            Ok(page) => (Ok(page), None),
            Err(e) => (Err(e.to_string()), Some(e)),
        };

        let outcome = self
            .inner
            .call(|respond_to| OrderCacheRequest::CompleteRefresh {
                ticket,
                result,
                respond_to,
            })
            .await?;
        guard.settled = true;

        match (outcome, backend_error) {
            (RefreshOutcome::Failed { .. }, Some(e)) => Err(OrderCacheError::Backend(e)),
            (outcome, _) => Ok(outcome),
        }
    }

    /// Makes `id` the current order, from the cache if possible, otherwise from the backend.
    ///
    /// A backend failure is recorded on the state and the previous selection is kept.
    /// The fetched order is not added to the cached collection.
    #[instrument(skip(self))]
    pub async fn select_order(&self, id: OrderId) -> Result<Order, OrderCacheError> {
        let cached = self
            .inner
            .call(|respond_to| OrderCacheRequest::SelectCached { id, respond_to })
            .await?;
        if let Some(order) = cached {
            return Ok(order);
        }

        debug!(%id, "Not cached, fetching from backend");
        match self.backend.fetch_order(id).await {
            Ok(order) => {
                let current = order.clone();
                self.inner
                    .call(|respond_to| OrderCacheRequest::SetCurrent {
                        order: current,
                        respond_to,
                    })
                    .await?;
                Ok(order)
            }
            Err(e) => {
                let message = e.to_string();
                self.inner
                    .call(|respond_to| OrderCacheRequest::RecordError { message, respond_to })
                    .await?;
                Err(e.into())
            }
        }
    }

    pub async fn clear_current_order(&self) -> Result<(), OrderCacheError> {
        Ok(self
            .inner
            .call(|respond_to| OrderCacheRequest::ClearCurrent { respond_to })
            .await?)
    }

    pub async fn clear_error(&self) -> Result<(), OrderCacheError> {
        Ok(self
            .inner
            .call(|respond_to| OrderCacheRequest::ClearError { respond_to })
            .await?)
    }

    /// Empties the cache and persists the empty snapshot.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), OrderCacheError> {
        Ok(self
            .inner
            .call(|respond_to| OrderCacheRequest::Reset { respond_to })
            .await?)
    }

    /// A copy of the whole cache state.
    pub async fn view(&self) -> Result<CacheView, OrderCacheError> {
        Ok(self
            .inner
            .call(|respond_to| OrderCacheRequest::View { respond_to })
            .await?)
    }

    /// The cached orders, newest first.
    pub async fn orders(&self) -> Result<Vec<Order>, OrderCacheError> {
        Ok(self.view().await?.orders)
    }
}
