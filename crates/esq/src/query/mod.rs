//! Shorthand clauses and the bool-query compiler.
//!
//! Callers describe a search as four lists of field/value maps. The compiler
//! turns them into an Elasticsearch bool query:
//!
//! ```json
//! {
//!   "size": 2,
//!   "query": {
//!     "bool": {
//!       "must": [ { "match": { "status": "error" } } ],
//!       "filter": [ { "wildcard": { "host.name": "web*" } } ]
//!     }
//!   }
//! }
//! ```

pub mod clause;
pub mod compiler;
pub mod dsl;

pub use clause::{ClauseSpec, ClauseValue, PlainValue, Scalar};
pub use compiler::{BoolClauses, QueryCompiler};
pub use dsl::{BoolQuery, DEFAULT_PAGE_SIZE, LeafStatement, LeafType, QueryBody, SearchRequest};
