//! # In-Memory Backend
//!
//! Serves a seeded order list with the listing endpoint's filtering, sorting and
//! paging rules applied locally. The list can be edited while the backend is in
//! use, which lets callers simulate changes made by other sessions.

use super::{BackendError, OrderBackend};
use crate::model::{Order, OrderFilter, OrderId, OrderStatus, Page, PageRequest, SortDirection};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryBackend {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: RwLock::new(orders),
        }
    }

    /// Adds or replaces an order.
    pub async fn upsert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => *existing = order,
            None => orders.push(order),
        }
    }

    /// Changes an order's status server-side. Returns `false` if the id is unknown.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> bool {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: OrderId) -> Option<Order> {
        let mut orders = self.orders.write().await;
        let index = orders.iter().position(|o| o.id == id)?;
        Some(orders.remove(index))
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

fn matches(order: &Order, filter: &OrderFilter) -> bool {
    if let Some(status) = filter.status_order {
        if order.status != status {
            return false;
        }
    }
    let day = order.created_at.date_naive();
    if filter.from_date.is_some_and(|from| day < from) {
        return false;
    }
    if filter.to_date.is_some_and(|to| day > to) {
        return false;
    }
    match filter.search_string.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(text) => {
            let needle = text.to_lowercase();
            order.id.to_string() == needle
                || order.detail.course.title.to_lowercase().contains(&needle)
        }
    }
}

fn compare(a: &Order, b: &Order, field: &str) -> Ordering {
    match field {
        "id" => a.id.cmp(&b.id),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "totalAmount" => a
            .total_amount
            .unwrap_or_default()
            .total_cmp(&b.total_amount.unwrap_or_default()),
        "status" => a.status.to_string().cmp(&b.status.to_string()),
        _ => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl OrderBackend for InMemoryBackend {
    #[instrument(skip(self))]
    async fn fetch_page(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, BackendError> {
        if page.size == 0 {
            return Err(BackendError::Status {
                code: 400,
                message: "page size must be greater than zero".into(),
            });
        }

        let orders = self.orders.read().await;
        let mut selected: Vec<Order> = orders.iter().filter(|o| matches(o, filter)).cloned().collect();
        drop(orders);

        selected.sort_by(|a, b| {
            let ordering = compare(a, b, &page.sort.field);
            match page.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total_elements = u64::try_from(selected.len()).unwrap_or(u64::MAX);
        let size = u64::from(page.size);
        let total_pages = u32::try_from(total_elements.div_ceil(size)).unwrap_or(u32::MAX);
        let offset = u64::from(page.page).saturating_mul(size);
        let content: Vec<Order> = selected
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(size).unwrap_or(usize::MAX))
            .collect();
        debug!(returned = content.len(), total_elements, "Serving page");

        Ok(Page {
            content,
            number: page.page,
            size: page.size,
            total_elements,
            total_pages,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_order(&self, id: OrderId) -> Result<Order, BackendError> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(BackendError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseRef, OrderDetail, PaymentMethod, SortSpec};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn order(id: u64, title: &str, status: OrderStatus, day: u32) -> Order {
        let created = Utc.with_ymd_and_hms(2025, 8, day, 9, 0, 0).unwrap();
        Order {
            id: OrderId(id),
            status,
            total_amount: Some(100.0 * id as f64),
            payment_method: PaymentMethod::Momo,
            created_at: created,
            updated_at: created + Duration::minutes(5),
            detail: OrderDetail {
                price: 100.0 * id as f64,
                course: CourseRef {
                    id,
                    title: title.into(),
                    thumbnail: None,
                },
            },
        }
    }

    fn seeded() -> InMemoryBackend {
        InMemoryBackend::new(vec![
            order(1, "Intro to Rust", OrderStatus::Completed, 1),
            order(2, "Async Rust", OrderStatus::Pending, 2),
            order(3, "Databases 101", OrderStatus::Pending, 3),
            order(4, "Advanced Rust", OrderStatus::Failed, 4),
            order(5, "Networking", OrderStatus::Cancelled, 5),
        ])
    }

    #[tokio::test]
    async fn pages_newest_first_by_default() {
        let backend = seeded();
        let page = backend
            .fetch_page(&OrderFilter::default(), &PageRequest::new(0, 2))
            .await
            .unwrap();
        let ids: Vec<u64> = page.content.iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![5, 4]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);

        let last = backend
            .fetch_page(&OrderFilter::default(), &PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(last.content.len(), 1);
        assert_eq!(last.content[0].id, OrderId(1));
    }

    #[tokio::test]
    async fn filters_by_text_status_and_dates() {
        let backend = seeded();
        let request = PageRequest::new(0, 10).sorted_by(SortSpec::asc("id"));

        let rust = backend.fetch_page(&OrderFilter::search("rust"), &request).await.unwrap();
        let ids: Vec<u64> = rust.content.iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![1, 2, 4]);

        let pending_rust = backend
            .fetch_page(&OrderFilter::search("RUST").with_status(OrderStatus::Pending), &request)
            .await
            .unwrap();
        assert_eq!(pending_rust.content.len(), 1);
        assert_eq!(pending_rust.content[0].id, OrderId(2));

        let window = OrderFilter::default().between(
            NaiveDate::from_ymd_opt(2025, 8, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
        );
        let dated = backend.fetch_page(&window, &request).await.unwrap();
        let ids: Vec<u64> = dated.content.iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let page = seeded()
            .fetch_page(&OrderFilter::default(), &PageRequest::new(u32::MAX, u32::MAX))
            .await
            .unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn rejects_zero_page_size() {
        let result = seeded()
            .fetch_page(&OrderFilter::default(), &PageRequest::new(0, 0))
            .await;
        assert!(matches!(result, Err(BackendError::Status { code: 400, .. })));
    }

    #[tokio::test]
    async fn edits_are_visible_to_later_fetches() {
        let backend = seeded();
        assert!(backend.set_status(OrderId(2), OrderStatus::Completed).await);
        assert!(!backend.set_status(OrderId(99), OrderStatus::Completed).await);
        assert_eq!(
            backend.fetch_order(OrderId(2)).await.unwrap().status,
            OrderStatus::Completed
        );

        backend.remove(OrderId(2)).await;
        assert_eq!(backend.len().await, 4);

        backend.upsert(order(6, "Embedded Rust", OrderStatus::Pending, 6)).await;
        backend.upsert(order(1, "Intro to Rust", OrderStatus::Cancelled, 1)).await;
        assert_eq!(backend.len().await, 5);
        assert_eq!(
            backend.fetch_order(OrderId(1)).await.unwrap().status,
            OrderStatus::Cancelled
        );
        assert_eq!(
            backend.fetch_order(OrderId(2)).await,
            Err(BackendError::NotFound(OrderId(2)))
        );
    }
}
