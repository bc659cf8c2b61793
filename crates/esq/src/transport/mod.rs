//! HTTP seam between the scroll executor and the cluster.
//!
//! The executor only talks to a [`ScrollTransport`]. The production
//! implementation is [`ElasticsearchTransport`]; tests substitute a scripted
//! double.

mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::query::SearchRequest;

pub use self::client::ElasticsearchTransport;

/// The parts of a search or scroll response the executor reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    /// Cursor for the next page. `None` when the cluster did not send one.
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,

    #[serde(default)]
    pub hits: HitsEnvelope,
}

/// The `hits` object of a search response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Value>,
}

impl SearchResponse {
    /// Creates a response carrying `hits` and an optional cursor.
    pub fn new(scroll_id: Option<&str>, hits: Vec<Value>) -> Self {
        Self {
            scroll_id: scroll_id.map(str::to_string),
            hits: HitsEnvelope { hits },
        }
    }

    /// Returns the cursor id, treating an empty string as absent.
    pub fn cursor(&self) -> Option<&str> {
        self.scroll_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Returns the hits on this page.
    pub fn hits(&self) -> &[Value] {
        &self.hits.hits
    }
}

/// Body of a `POST /_search/scroll` continuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollRequest {
    pub scroll: String,
    pub scroll_id: String,
}

impl ScrollRequest {
    /// Creates a continuation for `scroll_id`, extending its keep-alive.
    pub fn new(scroll: impl Into<String>, scroll_id: impl Into<String>) -> Self {
        Self {
            scroll: scroll.into(),
            scroll_id: scroll_id.into(),
        }
    }
}

/// Body of a `DELETE /_search/scroll` cleanup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearScrollRequest {
    pub scroll_id: Vec<String>,
}

/// Issues the three scroll protocol calls.
#[async_trait]
pub trait ScrollTransport: Send + Sync {
    /// `POST /<indices>/_search?scroll=<keep_alive>`.
    ///
    /// An empty `indices` slice searches every index.
    async fn open_scroll(
        &self,
        indices: &[String],
        keep_alive: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse>;

    /// `POST /_search/scroll`.
    async fn continue_scroll(&self, request: &ScrollRequest) -> Result<SearchResponse>;

    /// `DELETE /_search/scroll`.
    async fn clear_scroll(&self, request: &ClearScrollRequest) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_deserialization() {
        let response: SearchResponse = serde_json::from_value(json!({
            "_scroll_id": "abc",
            "took": 3,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [ { "_id": "1" }, { "_id": "2" } ]
            }
        }))
        .unwrap();

        assert_eq!(response.cursor(), Some("abc"));
        assert_eq!(response.hits().len(), 2);
    }

    #[test]
    fn test_response_without_cursor_or_hits() {
        let response: SearchResponse = serde_json::from_value(json!({ "took": 1 })).unwrap();
        assert_eq!(response.cursor(), None);
        assert!(response.hits().is_empty());

        let response = SearchResponse::new(Some(""), vec![]);
        assert_eq!(response.cursor(), None);
    }

    #[test]
    fn test_request_bodies() {
        assert_eq!(
            serde_json::to_value(ScrollRequest::new("1m", "abc")).unwrap(),
            json!({ "scroll": "1m", "scroll_id": "abc" })
        );
        assert_eq!(
            serde_json::to_value(ClearScrollRequest {
                scroll_id: vec!["a".to_string(), "b".to_string()]
            })
            .unwrap(),
            json!({ "scroll_id": ["a", "b"] })
        );
    }
}
