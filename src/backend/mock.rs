//! # Scripted Backend
//!
//! `MockBackend` answers [`OrderBackend`] calls from a queue of expectations, in the
//! order they were registered. It is the backend to reach for when a test needs a
//! failure, a specific page, or a response that only arrives when the test says so.
//!
//! | Need | Use |
//! |------|-----|
//! | A page of orders | `expect_fetch_page().return_ok(page)` |
//! | A network failure | `expect_fetch_page().return_err(e)` |
//! | A slow response | `expect_fetch_page().return_ok_when_released(page)` |
//! | A single order | `expect_fetch_order(id).return_ok(order)` |
//!
//! ```rust
//! use order_cache::backend::mock::MockBackend;
//! use order_cache::backend::{BackendError, OrderBackend};
//! use order_cache::model::{OrderFilter, PageRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockBackend::new();
//!     mock.expect_fetch_page()
//!         .return_err(BackendError::Unavailable("connection reset".into()));
//!
//!     let result = mock.fetch_page(&OrderFilter::default(), &PageRequest::new(0, 10)).await;
//!     assert!(result.is_err());
//!     mock.verify();
//! }
//! ```

use super::{BackendError, OrderBackend};
use crate::model::{Order, OrderFilter, OrderId, Page, PageRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, watch};

// =============================================================================
// EXPECTATIONS
// =============================================================================

enum Expectation {
    FetchPage {
        response: Result<Page<Order>, BackendError>,
        gate: Option<oneshot::Receiver<()>>,
    },
    FetchOrder {
        id: OrderId,
        response: Result<Order, BackendError>,
    },
}

/// A backend that replays registered responses.
///
/// Clones share the same queue, so a test can hand one clone to the system and keep
/// another to register expectations and call [`MockBackend::verify`].
#[derive(Clone)]
pub struct MockBackend {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<watch::Sender<usize>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let (calls, _) = watch::channel(0);
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(calls),
        }
    }

    /// Expects a `fetch_page` call.
    pub fn expect_fetch_page(&self) -> FetchPageExpectationBuilder {
        FetchPageExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `fetch_order` call for `id`.
    pub fn expect_fetch_order(&self, id: OrderId) -> FetchOrderExpectationBuilder {
        FetchOrderExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Number of backend calls received so far.
    pub fn calls(&self) -> usize {
        *self.calls.borrow()
    }

    /// Waits until at least `n` calls have been received.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.calls.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self) -> Option<Expectation> {
        let expectation = self.expectations.lock().unwrap().pop_front();
        self.calls.send_modify(|count| *count += 1);
        expectation
    }
}

#[async_trait]
impl OrderBackend for MockBackend {
    async fn fetch_page(
        &self,
        _filter: &OrderFilter,
        _page: &PageRequest,
    ) -> Result<Page<Order>, BackendError> {
        match self.next() {
            Some(Expectation::FetchPage { response, gate }) => {
                if let Some(gate) = gate {
                    // a dropped release handle lets the response through as well
                    let _ = gate.await;
                }
                response
            }
            _ => panic!("Unexpected fetch_page call or expectation mismatch"),
        }
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Order, BackendError> {
        match self.next() {
            Some(Expectation::FetchOrder { id: expected, response }) => {
                assert_eq!(id, expected, "fetch_order called with unexpected id");
                response
            }
            _ => panic!("Unexpected fetch_order call or expectation mismatch"),
        }
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Builder for `fetch_page` expectations.
pub struct FetchPageExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl FetchPageExpectationBuilder {
    /// Sets the expectation to return a page.
    pub fn return_ok(self, page: Page<Order>) {
        self.push(Ok(page), None);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: BackendError) {
        self.push(Err(error), None);
    }

    /// Returns the page only once the returned [`Release`] is fired (or dropped).
    pub fn return_ok_when_released(self, page: Page<Order>) -> Release {
        let (tx, rx) = oneshot::channel();
        self.push(Ok(page), Some(rx));
        Release(tx)
    }

    /// Returns the error only once the returned [`Release`] is fired (or dropped).
    pub fn return_err_when_released(self, error: BackendError) -> Release {
        let (tx, rx) = oneshot::channel();
        self.push(Err(error), Some(rx));
        Release(tx)
    }

    fn push(self, response: Result<Page<Order>, BackendError>, gate: Option<oneshot::Receiver<()>>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::FetchPage { response, gate });
    }
}

/// Builder for `fetch_order` expectations.
pub struct FetchOrderExpectationBuilder {
    id: OrderId,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl FetchOrderExpectationBuilder {
    /// Sets the expectation to return an order.
    pub fn return_ok(self, order: Order) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::FetchOrder {
            id: self.id,
            response: Ok(order),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: BackendError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::FetchOrder {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Holds back a gated response until [`Release::release`] is called.
pub struct Release(oneshot::Sender<()>);

impl Release {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}
