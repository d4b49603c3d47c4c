//! Validated request shapes produced by the request validator.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sort order accepted by the search endpoint.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    Rating,
    Title,
    ViewCount,
}

/// Validated single-video lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub video_id: String,
}

impl LookupRequest {
    /// Cache key for this lookup.
    ///
    /// Video identifiers are case-sensitive, so the id is kept verbatim.
    pub fn cache_key(&self, namespace: &str) -> String {
        format!("{namespace}:{}", self.video_id)
    }
}

/// Validated keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u8,
    pub page_token: Option<String>,
    pub order: SearchOrder,
}

impl SearchRequest {
    /// Cache key for this search.
    ///
    /// The free-text query is lower-cased so that two requests differing
    /// only in case share an entry; every other dimension is exact-match.
    pub fn cache_key(&self, namespace: &str, region: &str) -> String {
        format!(
            "{namespace}:{}:{}:{}:{}:{region}",
            self.query.to_lowercase(),
            self.limit,
            self.page_token.as_deref().unwrap_or(""),
            self.order,
        )
    }
}

/// Validated shorts search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortsRequest {
    pub query: String,
    pub limit: u8,
}

impl ShortsRequest {
    /// Cache key for this shorts search.
    ///
    /// Shorts requests have no pagination token or configurable order;
    /// the key keeps the same six-part shape as search with those slots
    /// fixed.
    pub fn cache_key(&self, namespace: &str, region: &str) -> String {
        format!(
            "{namespace}:{}:{}::{}:{region}",
            self.query.to_lowercase(),
            self.limit,
            SearchOrder::Relevance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn search_order_round_trips_camel_case() {
        use std::str::FromStr;
        assert_eq!(SearchOrder::ViewCount.to_string(), "viewCount");
        assert_eq!(
            SearchOrder::from_str("viewCount").unwrap(),
            SearchOrder::ViewCount
        );
        assert_eq!(
            SearchOrder::from_str("relevance").unwrap(),
            SearchOrder::Relevance
        );
        assert!(SearchOrder::from_str("bogus").is_err());
    }

    #[test]
    fn lookup_key_preserves_id_case() {
        let req = LookupRequest {
            video_id: "dQw4w9WgXcQ".into(),
        };
        assert_eq!(req.cache_key("video"), "video:dQw4w9WgXcQ");
    }

    #[test]
    fn search_key_lowercases_query_only() {
        let req = SearchRequest {
            query: "Rust Tutorials".into(),
            limit: 8,
            page_token: Some("CAUQAA".into()),
            order: SearchOrder::Date,
        };
        assert_eq!(
            req.cache_key("search", "US"),
            "search:rust tutorials:8:CAUQAA:date:US"
        );
    }

    #[test]
    fn search_key_empty_token_slot() {
        let req = SearchRequest {
            query: "lofi".into(),
            limit: 8,
            page_token: None,
            order: SearchOrder::Relevance,
        };
        assert_eq!(req.cache_key("search", "US"), "search:lofi:8::relevance:US");
    }

    #[test]
    fn shorts_key_shape_matches_search() {
        let req = ShortsRequest {
            query: "Cats".into(),
            limit: 12,
        };
        assert_eq!(req.cache_key("shorts", "GB"), "shorts:cats:12::relevance:GB");
    }
}
