//! Paginated list results.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::filters::QueryFilters;

/// Default page size when neither the request nor the response says.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination snapshot nested inside list payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(alias = "current_page", alias = "page")]
    pub current_page: u32,
    #[serde(alias = "total_pages")]
    pub total_pages: u32,
    #[serde(alias = "total_items", alias = "total")]
    pub total_items: u64,
    #[serde(alias = "items_per_page", alias = "limit")]
    pub items_per_page: u32,
    #[serde(default, alias = "has_next_page")]
    pub has_next_page: bool,
    #[serde(default, alias = "has_prev_page")]
    pub has_prev_page: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_items: 0,
            items_per_page: DEFAULT_PAGE_SIZE,
            has_next_page: false,
            has_prev_page: false,
        }
    }
}

impl Pagination {
    /// Compute a snapshot from raw counts.
    pub fn from_counts(current_page: u32, items_per_page: u32, total_items: u64) -> Self {
        let per_page = items_per_page.max(1);
        let total_pages = total_items.div_ceil(per_page as u64) as u32;
        Self {
            current_page: current_page.max(1),
            total_pages,
            total_items,
            items_per_page: per_page,
            has_next_page: false,
            has_prev_page: false,
        }
        .normalized()
    }

    /// Recompute the navigation flags from the page numbers so that
    /// `has_next_page == (current_page < total_pages)` always holds.
    pub fn normalized(mut self) -> Self {
        self.current_page = self.current_page.max(1);
        self.has_next_page = self.current_page < self.total_pages;
        self.has_prev_page = self.current_page > 1;
        self
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next_page.then_some(self.current_page + 1)
    }
}

/// One page of items plus its pagination snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
        }
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            pagination: pagination.normalized(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Normalize a list payload into a page.
    ///
    /// Accepted shapes of `data`:
    /// - `{ "<key>": [...], "pagination": {...} }`
    /// - `{ "<key>": [...], "currentPage": .., "totalPages": .., ... }`
    /// - `{ "<key>": [...] }` or a bare array, in which case pagination is
    ///   synthesized from the requested page and limit.
    pub fn from_list_data(data: Value, key: &str, requested: &QueryFilters) -> ModelResult<Self> {
        let (items_value, pagination_value) = match data {
            Value::Array(items) => (Value::Array(items), None),
            Value::Object(mut map) => {
                let items = map
                    .remove(key)
                    .or_else(|| map.remove("items"))
                    .ok_or_else(|| {
                        ModelError::invalid_payload(format!("list payload is missing '{}'", key))
                    })?;
                let pagination = match map.remove("pagination") {
                    Some(Value::Object(p)) => Some(Value::Object(p)),
                    _ if map.contains_key("currentPage") || map.contains_key("current_page") => {
                        Some(Value::Object(map))
                    }
                    _ => None,
                };
                (items, pagination)
            }
            other => {
                return Err(ModelError::invalid_payload(format!(
                    "list payload must be an object or array, got {}",
                    other
                )))
            }
        };

        let items: Vec<T> = serde_json::from_value(items_value)?;
        let pagination = match pagination_value {
            Some(value) => serde_json::from_value::<Pagination>(value)?,
            None => synthesize(items.len(), requested),
        };

        Ok(Self::new(items, pagination))
    }
}

fn synthesize(count: usize, requested: &QueryFilters) -> Pagination {
    let page = requested.current_page().unwrap_or(1).max(1);
    let per_page = requested
        .limit()
        .unwrap_or_else(|| (count as u32).max(DEFAULT_PAGE_SIZE));
    let total_items = (page as u64 - 1) * per_page as u64 + count as u64;
    Pagination {
        current_page: page,
        total_pages: page,
        total_items,
        items_per_page: per_page,
        has_next_page: false,
        has_prev_page: page > 1,
    }
}
