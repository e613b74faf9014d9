//! Query filter objects for list and search endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

pub const PAGE_KEY: &str = "page";
pub const LIMIT_KEY: &str = "limit";

/// Ordered `key -> optional value` map.
///
/// A key set to `None` stays in the map (so it can override an earlier value
/// when merged) but is never rendered into a query string. Empty strings are
/// dropped the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    entries: Vec<(String, Option<String>)>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters for a single page request.
    pub fn page(page: u32, limit: u32) -> Self {
        Self::new().with(PAGE_KEY, page).with(LIMIT_KEY, limit)
    }

    /// Build filters from any serializable struct.
    ///
    /// Top-level fields become keys in declaration order. `null` becomes an
    /// absent value, arrays are joined with commas and nested objects are
    /// rejected.
    pub fn from_serialize<T: Serialize>(value: &T) -> ModelResult<Self> {
        let Value::Object(map) = serde_json::to_value(value)? else {
            return Err(ModelError::invalid_payload("filters must serialize to an object"));
        };

        let mut filters = Self::new();
        for (key, value) in map {
            let rendered = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Array(items) => {
                    let parts: Vec<String> = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s),
                            Value::Null => None,
                            other => Some(other.to_string()),
                        })
                        .collect();
                    Some(parts.join(","))
                }
                Value::Object(_) => {
                    return Err(ModelError::invalid_payload(format!(
                        "filter '{}' cannot be a nested object",
                        key
                    )))
                }
            };
            filters.set_opt(key, rendered);
        }
        Ok(filters)
    }

    /// Set a key, keeping its original position if already present.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.set_opt(key, Some(value.to_string()))
    }

    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<String>) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Mark a key as absent so it overrides any earlier value on merge.
    pub fn unset(&mut self, key: impl Into<String>) -> &mut Self {
        self.set_opt(key, None)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    pub fn current_page(&self) -> Option<u32> {
        self.get_u32(PAGE_KEY)
    }

    pub fn limit(&self) -> Option<u32> {
        self.get_u32(LIMIT_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `self` overlaid with every key of `other`.
    pub fn merged(&self, other: &QueryFilters) -> QueryFilters {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            merged.set_opt(key.clone(), value.clone());
        }
        merged
    }

    /// Pairs that belong in a query string.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| match v.as_deref() {
                Some(value) if !value.is_empty() => Some((k.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct JobSearch {
        page: u32,
        limit: u32,
        search: Option<String>,
        location: String,
        remote: Option<bool>,
        skills: Vec<String>,
    }

    #[test]
    fn test_page_limit_query_string() {
        let filters = QueryFilters::page(1, 5);
        assert_eq!(filters.to_query_string(), "page=1&limit=5");
    }

    #[test]
    fn test_omits_absent_and_empty_values() {
        let mut filters = QueryFilters::page(1, 5);
        filters.set_opt("status", None);
        filters.set("search", "");
        assert_eq!(filters.to_query_string(), "page=1&limit=5");
    }

    #[test]
    fn test_from_serialize_keeps_order_and_drops_nulls() {
        let search = JobSearch {
            page: 2,
            limit: 10,
            search: None,
            location: String::new(),
            remote: Some(true),
            skills: vec!["rust".to_string(), "sql".to_string()],
        };
        let filters = QueryFilters::from_serialize(&search).unwrap();
        assert_eq!(
            filters.to_query_string(),
            "page=2&limit=10&remote=true&skills=rust%2Csql"
        );
    }

    #[test]
    fn test_from_serialize_rejects_non_object() {
        assert!(QueryFilters::from_serialize(&vec![1, 2]).is_err());
    }

    #[test]
    fn test_merge_overrides_in_place() {
        let base = QueryFilters::page(1, 20).with("status", "open");
        let mut next = QueryFilters::new().with(PAGE_KEY, 2);
        next.unset("status");

        let merged = base.merged(&next);
        assert_eq!(merged.current_page(), Some(2));
        assert_eq!(merged.limit(), Some(20));
        assert_eq!(merged.get("status"), None);
        assert_eq!(merged.to_query_string(), "page=2&limit=20");
    }

    #[test]
    fn test_encodes_special_characters() {
        let filters = QueryFilters::new().with("search", "senior dev & lead");
        assert_eq!(filters.to_query_string(), "search=senior%20dev%20%26%20lead");
    }
}
