//! Per-invocation scroll bookkeeping.

use serde_json::Value;
use tracing::debug;

use crate::error::{EsqError, Result, ScrollPhase};
use crate::transport::{ClearScrollRequest, ScrollRequest, SearchResponse};

/// The current scroll cursor and its keep-alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    scroll_id: String,
    ttl_minutes: u32,
}

impl ScrollState {
    /// Creates a state for `scroll_id`.
    pub fn new(scroll_id: impl Into<String>, ttl_minutes: u32) -> Self {
        Self {
            scroll_id: scroll_id.into(),
            ttl_minutes,
        }
    }

    /// Returns the current cursor id.
    pub fn scroll_id(&self) -> &str {
        &self.scroll_id
    }

    /// Returns the keep-alive in Elasticsearch time units.
    pub fn keep_alive(&self) -> String {
        format!("{}m", self.ttl_minutes)
    }

    /// Replaces the cursor with the one from a newer response.
    pub fn advance(&mut self, scroll_id: impl Into<String>) {
        self.scroll_id = scroll_id.into();
    }

    /// Builds the continuation request for the current cursor.
    pub fn next_request(&self) -> ScrollRequest {
        ScrollRequest::new(self.keep_alive(), self.scroll_id.clone())
    }
}

/// Distinct cursor ids seen during one invocation, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollRegistry {
    ids: Vec<String>,
}

impl ScrollRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cursor id. Returns false if it was already known.
    pub fn record(&mut self, scroll_id: &str) -> bool {
        if self.ids.iter().any(|id| id == scroll_id) {
            return false;
        }
        self.ids.push(scroll_id.to_string());
        true
    }

    /// Returns the recorded ids.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns the number of distinct ids recorded.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no id has been recorded.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Builds the cleanup request, or `None` if nothing needs clearing.
    pub fn into_clear_request(self) -> Option<ClearScrollRequest> {
        if self.ids.is_empty() {
            None
        } else {
            Some(ClearScrollRequest {
                scroll_id: self.ids,
            })
        }
    }
}

/// Everything one executor invocation owns while draining a scroll.
#[derive(Debug, Default)]
pub(crate) struct ScrollSession {
    pub(crate) state: Option<ScrollState>,
    pub(crate) registry: ScrollRegistry,
    pub(crate) hits: Vec<Value>,
    pub(crate) pages: usize,
}

impl ScrollSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Consumes one response: checks its cursor, records it and appends its hits.
    ///
    /// Returns the number of hits on the page. A missing cursor fails without
    /// touching the accumulated hits.
    pub(crate) fn accept(
        &mut self,
        response: SearchResponse,
        phase: ScrollPhase,
        ttl_minutes: u32,
    ) -> Result<usize> {
        let scroll_id = response
            .cursor()
            .ok_or(EsqError::Protocol { phase })?
            .to_string();

        if !self.registry.record(&scroll_id) {
            debug!(phase = %phase, "Cluster reused a known scroll id");
        }

        self.state
            .get_or_insert_with(|| ScrollState::new(String::new(), ttl_minutes))
            .advance(scroll_id);

        let page = response.hits.hits;
        let count = page.len();
        if count > 0 {
            self.pages += 1;
            self.hits.extend(page);
        }

        debug!(phase = %phase, page_hits = count, total_hits = self.hits.len(), "Scroll page received");
        Ok(count)
    }
}
