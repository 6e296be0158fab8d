//! Messages understood by the order cache store and the values it replies with.

use crate::framework::Response;
use crate::model::{Order, OrderId, OrderPatch, Page, Pagination};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sequence number handed out when a refresh starts.
///
/// Completions are applied only when their ticket is newer than the last applied
/// one, so among overlapping refreshes the most recently started one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(pub u64);

/// What a refresh completion did to the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The page replaced the collection.
    Applied { orders: usize, pagination: Pagination },
    /// The fetch failed; the message is now on the state and the collection is untouched.
    Failed { message: String },
    /// A newer refresh already landed; this completion was dropped.
    Stale,
}

/// Read-only copy of the cache state handed to readers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheView {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<String>,
    pub current_order: Option<Order>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CacheView {
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }
}

/// Requests processed by [`OrderCacheState`](super::OrderCacheState).
#[derive(Debug)]
pub enum OrderCacheRequest {
    Find {
        id: OrderId,
        respond_to: Response<Option<Order>>,
    },
    Patch {
        id: OrderId,
        patch: OrderPatch,
        respond_to: Response<Option<Order>>,
    },
    BeginRefresh {
        respond_to: Response<RefreshTicket>,
    },
    CompleteRefresh {
        ticket: RefreshTicket,
        result: Result<Page<Order>, String>,
        respond_to: Response<RefreshOutcome>,
    },
    /// The caller went away before the fetch finished.
    AbandonRefresh {
        ticket: RefreshTicket,
    },
    SelectCached {
        id: OrderId,
        respond_to: Response<Option<Order>>,
    },
    SetCurrent {
        order: Order,
        respond_to: Response<()>,
    },
    RecordError {
        message: String,
        respond_to: Response<()>,
    },
    ClearCurrent {
        respond_to: Response<()>,
    },
    ClearError {
        respond_to: Response<()>,
    },
    Reset {
        respond_to: Response<()>,
    },
    View {
        respond_to: Response<CacheView>,
    },
}
