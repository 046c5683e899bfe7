//! Search responses.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ProductWithDiscount;

/// API version reported in response metadata.
pub const API_VERSION: &str = "v1";

/// Result of a product search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub products: Vec<ProductWithDiscount>,
    /// Whether the search term is a palindrome.
    pub is_palindrome: bool,
    /// Percentage discount applied to every product (0 or 50).
    pub discount_applied: u8,
    pub total_results: usize,
    /// The term exactly as received.
    pub search_term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SearchMeta>,
}

impl SearchResponse {
    pub fn with_meta(mut self, meta: SearchMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Check if there are no results.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Timing and version information attached by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    /// Search duration in milliseconds.
    pub search_time: u64,
    /// RFC 3339 timestamp with millisecond precision.
    pub timestamp: String,
    pub version: String,
}

impl SearchMeta {
    pub fn new(search_time_ms: u64, at: DateTime<Utc>) -> Self {
        Self {
            search_time: search_time_ms,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: API_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn empty_response() -> SearchResponse {
        SearchResponse {
            products: vec![],
            is_palindrome: false,
            discount_applied: 0,
            total_results: 0,
            search_term: "xyz".to_string(),
            meta: None,
        }
    }

    #[test]
    fn test_meta_omitted_until_attached() {
        let value = serde_json::to_value(empty_response()).unwrap();
        assert_eq!(
            value,
            json!({
                "products": [],
                "isPalindrome": false,
                "discountApplied": 0,
                "totalResults": 0,
                "searchTerm": "xyz"
            })
        );
    }

    #[test]
    fn test_meta_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let response = empty_response().with_meta(SearchMeta::new(7, at));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value["meta"],
            json!({
                "searchTime": 7,
                "timestamp": "2024-05-01T12:30:00.000Z",
                "version": "v1"
            })
        );
        assert!(response.is_empty());
    }
}
