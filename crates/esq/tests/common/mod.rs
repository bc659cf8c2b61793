//! Shared test utilities.
//!
//! [`ScriptedTransport`] plays back a fixed list of responses and records
//! every call made against it.

#![allow(dead_code)]

pub mod http;

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use esq::transport::{ClearScrollRequest, ScrollRequest, ScrollTransport, SearchResponse};
use esq::{EsqError, Result, SearchRequest};

/// A request observed by the scripted transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search {
        indices: Vec<String>,
        keep_alive: String,
        body: Value,
    },
    Scroll {
        scroll: String,
        scroll_id: String,
    },
    Clear {
        scroll_ids: Vec<String>,
    },
}

/// What the transport does when a search or scroll call arrives.
pub enum Step {
    Respond(SearchResponse),
    Fail(EsqError),
    /// Never answers. Used to exercise cancellation.
    Stall,
}

#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    fail_clear: bool,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Makes every clear-scroll call fail.
    pub fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Clear { scroll_ids } => Some(scroll_ids),
                _ => None,
            })
            .collect()
    }

    pub fn scroll_ids_requested(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Scroll { scroll_id, .. } => Some(scroll_id),
                _ => None,
            })
            .collect()
    }

    async fn next_step(&self) -> Result<SearchResponse> {
        let step = self
            .steps
            .lock()
            .pop_front()
            .expect("scripted transport ran out of responses");
        match step {
            Step::Respond(response) => Ok(response),
            Step::Fail(err) => Err(err),
            Step::Stall => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ScrollTransport for ScriptedTransport {
    async fn open_scroll(
        &self,
        indices: &[String],
        keep_alive: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse> {
        self.calls.lock().push(Call::Search {
            indices: indices.to_vec(),
            keep_alive: keep_alive.to_string(),
            body: serde_json::to_value(request).unwrap(),
        });
        self.next_step().await
    }

    async fn continue_scroll(&self, request: &ScrollRequest) -> Result<SearchResponse> {
        self.calls.lock().push(Call::Scroll {
            scroll: request.scroll.clone(),
            scroll_id: request.scroll_id.clone(),
        });
        self.next_step().await
    }

    async fn clear_scroll(&self, request: &ClearScrollRequest) -> Result<()> {
        self.calls.lock().push(Call::Clear {
            scroll_ids: request.scroll_id.clone(),
        });
        if self.fail_clear {
            return Err(EsqError::Status {
                operation: "clear scroll",
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

/// A page of `count` hits tagged with the cursor that produced it.
pub fn page(scroll_id: &str, count: usize) -> Step {
    let hits = (0..count)
        .map(|i| json!({ "_id": format!("{}-{}", scroll_id, i), "_source": { "n": i } }))
        .collect();
    Step::Respond(SearchResponse::new(Some(scroll_id), hits))
}

/// A page of `count` hits without a cursor.
pub fn page_without_cursor(count: usize) -> Step {
    let hits = (0..count).map(|i| json!({ "_id": i.to_string() })).collect();
    Step::Respond(SearchResponse::new(None, hits))
}
