//! Query and paging types for the backend order listing.

use crate::model::{Order, OrderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Search filter sent with a listing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_order: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
}

impl OrderFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search_string: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status_order = Some(status);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from_date = Some(from);
        self.to_date = Some(to);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort specification, rendered on the wire as `field,direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::desc("createdAt")
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{},{}", self.field, direction)
    }
}

/// Zero-based page selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortSpec,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: SortSpec::default(),
        }
    }

    pub fn sorted_by(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }
}

/// Everything a refresh needs: what to search for and which page to bring back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub filter: OrderFilter,
    pub page: PageRequest,
}

impl OrderQuery {
    pub fn new(filter: OrderFilter, page: PageRequest) -> Self {
        Self { filter, page }
    }

    /// First page of `size` with no filter.
    pub fn first_page(size: u32) -> Self {
        Self::new(OrderFilter::default(), PageRequest::new(0, size))
    }
}

/// One page of a listing as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// A single page holding every element.
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            number: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
            total_elements: u64::try_from(len).unwrap_or(u64::MAX),
            total_pages: u32::from(len > 0),
            content,
        }
    }
}

/// Pagination metadata kept on the cache after a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl From<&Page<Order>> for Pagination {
    fn from(page: &Page<Order>) -> Self {
        Self {
            page: page.number,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_renders_as_query_param() {
        assert_eq!(SortSpec::default().to_string(), "createdAt,desc");
        assert_eq!(SortSpec::asc("totalAmount").to_string(), "totalAmount,asc");
    }

    #[test]
    fn filter_omits_unset_fields() {
        let filter = OrderFilter::search("rust").with_status(OrderStatus::Pending);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "searchString": "rust", "statusOrder": "PENDING" })
        );
    }

    #[test]
    fn page_reads_backend_shape() {
        let raw = r#"{"content":[],"number":2,"size":10,"totalElements":25,"totalPages":3}"#;
        let page: Page<Order> = serde_json::from_str(raw).unwrap();
        let pagination = Pagination::from(&page);
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.total_elements, 25);
        assert_eq!(pagination.total_pages, 3);
    }
}
