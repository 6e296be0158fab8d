//! [`StoreState`] implementation for the order cache.
//!
//! Every mutation replaces whole records. Persistence runs after the in-memory
//! change is made and never fails the request.

use super::requests::{CacheView, OrderCacheRequest, RefreshOutcome, RefreshTicket};
use crate::framework::StoreState;
use crate::model::{Order, OrderId, OrderPatch, Page, Pagination};
use crate::persistence::{CacheSnapshot, SnapshotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies injected into the cache store at `run()` time.
#[derive(Clone)]
pub struct OrderCacheContext {
    pub snapshots: Arc<dyn SnapshotStore>,
    pub namespace: String,
}

#[derive(Debug, Default)]
pub struct OrderCacheState {
    orders: Vec<Order>,
    pagination: Pagination,
    error: Option<String>,
    current_order: Option<Order>,
    last_updated: Option<DateTime<Utc>>,
    next_ticket: u64,
    last_applied: u64,
    in_flight: HashSet<u64>,
}

/// Drops repeated ids (first one wins) and orders newest first.
fn normalize(orders: Vec<Order>) -> Vec<Order> {
    let mut seen = HashSet::new();
    let mut orders: Vec<Order> = orders.into_iter().filter(|o| seen.insert(o.id)).collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

impl OrderCacheState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the persisted part of the state; transient fields start empty.
    pub fn restore(snapshot: CacheSnapshot) -> Self {
        Self {
            orders: normalize(snapshot.orders),
            last_updated: snapshot.last_updated,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            orders: self.orders.clone(),
            last_updated: self.last_updated,
        }
    }

    pub fn view(&self) -> CacheView {
        CacheView {
            orders: self.orders.clone(),
            pagination: self.pagination,
            loading: self.is_loading(),
            error: self.error.clone(),
            current_order: self.current_order.clone(),
            last_updated: self.last_updated,
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Overlays `patch` on the cached order `id`. Returns `None` on a cache miss.
    pub fn apply_patch(&mut self, id: OrderId, patch: &OrderPatch, now: DateTime<Utc>) -> Option<Order> {
        let index = self.orders.iter().position(|o| o.id == id)?;
        let merged = self.orders[index].merged(patch, now);
        self.orders[index] = merged.clone();
        if self.current_order.as_ref().is_some_and(|o| o.id == id) {
            self.current_order = Some(merged.clone());
        }
        self.last_updated = Some(now);
        Some(merged)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.next_ticket += 1;
        self.in_flight.insert(self.next_ticket);
        RefreshTicket(self.next_ticket)
    }

    pub fn abandon_refresh(&mut self, ticket: RefreshTicket) {
        self.in_flight.remove(&ticket.0);
    }

    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Page<Order>, String>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        self.in_flight.remove(&ticket.0);
        if ticket.0 <= self.last_applied {
            return RefreshOutcome::Stale;
        }
        self.last_applied = ticket.0;

        match result {
            Ok(page) => {
                self.pagination = Pagination::from(&page);
                self.orders = normalize(page.content);
                self.error = None;
                self.last_updated = Some(now);
                RefreshOutcome::Applied {
                    orders: self.orders.len(),
                    pagination: self.pagination,
                }
            }
            Err(message) => {
                self.error = Some(message.clone());
                RefreshOutcome::Failed { message }
            }
        }
    }

    pub fn reset(&mut self) {
        self.orders.clear();
        self.pagination = Pagination::default();
        self.error = None;
        self.current_order = None;
        self.last_updated = None;
    }

    async fn persist(&self, ctx: &OrderCacheContext) {
        if let Err(e) = ctx.snapshots.save(&ctx.namespace, &self.snapshot()).await {
            warn!(namespace = %ctx.namespace, error = %e, "Failed to persist order cache");
        }
    }
}

#[async_trait]
impl StoreState for OrderCacheState {
    type Request = OrderCacheRequest;
    type Context = OrderCacheContext;

    async fn handle(&mut self, request: OrderCacheRequest, ctx: &OrderCacheContext) {
        match request {
            OrderCacheRequest::Find { id, respond_to } => {
                let order = self.find(id).cloned();
                debug!(%id, found = order.is_some(), "Find");
                let _ = respond_to.send(order);
            }
            OrderCacheRequest::Patch { id, patch, respond_to } => {
                let merged = self.apply_patch(id, &patch, Utc::now());
                match &merged {
                    Some(order) => {
                        info!(%id, status = %order.status, "Reconciled");
                        self.persist(ctx).await;
                    }
                    None => debug!(%id, "Reconcile skipped, order not cached"),
                }
                let _ = respond_to.send(merged);
            }
            OrderCacheRequest::BeginRefresh { respond_to } => {
                let ticket = self.begin_refresh();
                debug!(seq = ticket.0, in_flight = self.in_flight.len(), "Refresh started");
                if respond_to.send(ticket).is_err() {
                    debug!(seq = ticket.0, "Refresh caller gone before it got its ticket");
                    self.abandon_refresh(ticket);
                }
            }
            OrderCacheRequest::CompleteRefresh {
                ticket,
                result,
                respond_to,
            } => {
                let outcome = self.complete_refresh(ticket, result, Utc::now());
                match &outcome {
                    RefreshOutcome::Applied { orders, pagination } => {
                        info!(seq = ticket.0, orders, total = pagination.total_elements, "Refreshed");
                        self.persist(ctx).await;
                    }
                    RefreshOutcome::Failed { message } => {
                        warn!(seq = ticket.0, error = %message, "Refresh failed")
                    }
                    RefreshOutcome::Stale => {
                        debug!(seq = ticket.0, applied = self.last_applied, "Discarding stale refresh")
                    }
                }
                let _ = respond_to.send(outcome);
            }
            OrderCacheRequest::AbandonRefresh { ticket } => {
                if self.in_flight.contains(&ticket.0) {
                    debug!(seq = ticket.0, "Refresh abandoned");
                }
                self.abandon_refresh(ticket);
            }
            OrderCacheRequest::SelectCached { id, respond_to } => {
                let order = self.find(id).cloned();
                if let Some(order) = &order {
                    self.current_order = Some(order.clone());
                }
                let _ = respond_to.send(order);
            }
            OrderCacheRequest::SetCurrent { order, respond_to } => {
                self.current_order = Some(order);
                let _ = respond_to.send(());
            }
            OrderCacheRequest::RecordError { message, respond_to } => {
                self.error = Some(message);
                let _ = respond_to.send(());
            }
            OrderCacheRequest::ClearCurrent { respond_to } => {
                self.current_order = None;
                let _ = respond_to.send(());
            }
            OrderCacheRequest::ClearError { respond_to } => {
                self.error = None;
                let _ = respond_to.send(());
            }
            OrderCacheRequest::Reset { respond_to } => {
                self.reset();
                info!("Order cache reset");
                self.persist(ctx).await;
                let _ = respond_to.send(());
            }
            OrderCacheRequest::View { respond_to } => {
                let _ = respond_to.send(self.view());
            }
        }
    }

    fn size(&self) -> usize {
        self.orders.len()
    }
}
