//! Drives the scroll protocol to exhaustion.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ScrollOptions;
use crate::error::{EsqError, Result, ScrollPhase};
use crate::query::{BoolClauses, QueryCompiler, SearchRequest};
use crate::transport::ScrollTransport;

use super::cleanup::{self, CleanupHandle};
use super::state::ScrollSession;

/// Every hit of a completed scroll, plus the pending cursor cleanup.
#[derive(Debug)]
pub struct ScrollResults {
    /// Hits in page-arrival order.
    pub hits: Vec<Value>,
    /// Number of non-empty pages received.
    pub pages: usize,
    /// Distinct cursor ids the cluster handed out.
    pub scroll_ids: Vec<String>,
    /// The cursor cleanup, already running unless it was skipped.
    pub cleanup: CleanupHandle,
}

impl ScrollResults {
    /// Returns the number of hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the search matched nothing.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterates over the `_source` document of every hit that has one.
    pub fn sources(&self) -> impl Iterator<Item = &Value> {
        self.hits.iter().filter_map(|hit| hit.get("_source"))
    }
}

/// Runs one search and follows its scroll cursor until the cluster runs out of hits.
///
/// Each call owns its own accumulated hits and cursor registry, so one executor
/// can serve concurrent searches.
pub struct ScrollExecutor {
    transport: Arc<dyn ScrollTransport>,
    options: ScrollOptions,
}

impl std::fmt::Debug for ScrollExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollExecutor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ScrollExecutor {
    /// Creates an executor over `transport`.
    pub fn new(transport: Arc<dyn ScrollTransport>, options: ScrollOptions) -> Self {
        Self { transport, options }
    }

    /// Returns the scroll options.
    pub fn options(&self) -> &ScrollOptions {
        &self.options
    }

    /// Returns a compiler configured with this executor's default leaf type.
    pub fn compiler(&self) -> QueryCompiler {
        QueryCompiler::new(self.options.default_leaf)
    }

    /// Compiles `clauses` and retrieves every matching hit.
    pub async fn search(&self, clauses: &BoolClauses) -> Result<ScrollResults> {
        let request = self.compiler().compile_request(clauses, self.options.page_size);
        self.execute(&request).await
    }

    /// Sends `request` and retrieves every matching hit.
    pub async fn execute(&self, request: &SearchRequest) -> Result<ScrollResults> {
        self.execute_until(request, std::future::pending()).await
    }

    /// Like [`execute`](Self::execute), but gives up when `cancel` resolves.
    ///
    /// On cancellation the accumulated hits are discarded and
    /// [`EsqError::Cancelled`] is returned. Cursors seen so far are still
    /// cleared unless `keep_scrolls` is set.
    ///
    /// Cleanup after a successful search is spawned on the current tokio
    /// runtime. When polled outside a runtime, the cleanup is awaited before
    /// the results are returned instead.
    pub async fn execute_until<F>(&self, request: &SearchRequest, cancel: F) -> Result<ScrollResults>
    where
        F: Future<Output = ()>,
    {
        let mut session = ScrollSession::new();

        let outcome = tokio::select! {
            biased;
            _ = cancel => Err(EsqError::Cancelled),
            drained = self.drain(request, &mut session) => drained,
        };

        let ScrollSession {
            registry,
            hits,
            pages,
            ..
        } = session;
        let scroll_ids = registry.ids().to_vec();

        let cleanup = if self.options.keep_scrolls {
            debug!(ids = registry.len(), "Keeping scroll cursors");
            CleanupHandle::skipped()
        } else {
            match registry.into_clear_request() {
                Some(clear) => CleanupHandle::start(self.transport.clone(), clear).await,
                None => CleanupHandle::skipped(),
            }
        };

        match outcome {
            Ok(()) => {
                info!(
                    hits = hits.len(),
                    pages,
                    indices = %self.options.index_expression(),
                    "Scroll search complete"
                );
                Ok(ScrollResults {
                    hits,
                    pages,
                    scroll_ids,
                    cleanup,
                })
            }
            Err(e) => {
                // No early hand-off on failure, so finish the cleanup first
                cleanup.wait().await;
                match e {
                    EsqError::Cancelled => {
                        warn!(discarded = hits.len(), "Scroll search cancelled");
                        Err(EsqError::Cancelled)
                    }
                    e if hits.is_empty() => Err(e),
                    e => {
                        warn!(hits = hits.len(), error = %e, "Scroll search aborted");
                        Err(EsqError::Incomplete {
                            source: Box::new(e),
                            partial: hits,
                        })
                    }
                }
            }
        }
    }

    /// Runs the init and scroll phases until an empty page arrives.
    async fn drain(&self, request: &SearchRequest, session: &mut ScrollSession) -> Result<()> {
        let ttl = self.options.scroll_ttl_minutes;

        let response = self
            .transport
            .open_scroll(&self.options.indices, &self.options.keep_alive(), request)
            .await?;
        let mut page_hits = session.accept(response, ScrollPhase::Init, ttl)?;

        while page_hits > 0 {
            let next = match session.state {
                Some(ref state) => state.next_request(),
                None => return Err(EsqError::Protocol { phase: ScrollPhase::Init }),
            };
            let response = self.transport.continue_scroll(&next).await?;
            page_hits = session.accept(response, ScrollPhase::Scroll, ttl)?;
        }

        Ok(())
    }
}

/// Clears `scroll_ids` without running a search.
///
/// Useful for releasing cursors left behind by a `keep_scrolls` run.
pub async fn clear_scrolls(
    transport: &dyn ScrollTransport,
    scroll_ids: Vec<String>,
) -> cleanup::CleanupReport {
    let mut registry = super::state::ScrollRegistry::new();
    for id in &scroll_ids {
        registry.record(id);
    }
    match registry.into_clear_request() {
        Some(request) => cleanup::clear(transport, request).await,
        None => cleanup::CleanupReport::Skipped,
    }
}
