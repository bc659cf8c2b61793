//! # esq
//!
//! Compiles shorthand clause lists into an Elasticsearch bool query, runs it,
//! and follows the scroll cursor until every matching hit has been collected.
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use esq::{BoolClauses, ClauseSpec, ClauseValue, ClientConfig, ElasticsearchTransport,
//!     LeafType, ScrollExecutor, ScrollOptions};
//!
//! let transport = Arc::new(ElasticsearchTransport::new(&ClientConfig::default())?);
//! let executor = ScrollExecutor::new(transport, ScrollOptions::default().with_indices(["logs-*"]));
//!
//! let clauses = BoolClauses::new()
//!     .must(ClauseSpec::new().field("status", "error"))
//!     .filter(ClauseSpec::new().field("host.name", ClauseValue::typed(LeafType::Wildcard, "web*")));
//!
//! let results = executor.search(&clauses).await?;
//! println!("{} hits", results.len());
//! results.cleanup.wait().await;
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod scroll;
pub mod transport;

pub use config::{ClientConfig, EsAuth, ScrollOptions};
pub use error::{CompileError, EsqError, Result, ScrollPhase};
pub use query::{
    BoolClauses, BoolQuery, ClauseSpec, ClauseValue, LeafStatement, LeafType, QueryCompiler,
    SearchRequest,
};
pub use scroll::{CleanupHandle, CleanupReport, ScrollExecutor, ScrollResults, clear_scrolls};
pub use transport::{ElasticsearchTransport, ScrollTransport, SearchResponse};
