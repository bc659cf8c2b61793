//! Error types for query compilation and scroll execution.
//!
//! Compilation problems are reported as [`CompileError`] before any request
//! leaves the process. Everything that can go wrong once the scroll protocol
//! is running is an [`EsqError`].

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The phase of the scroll protocol in which a response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    /// The initial `_search?scroll=` request.
    Init,
    /// A `_search/scroll` continuation request.
    Scroll,
}

impl fmt::Display for ScrollPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollPhase::Init => write!(f, "initial search"),
            ScrollPhase::Scroll => write!(f, "scroll continuation"),
        }
    }
}

/// A clause value that cannot be resolved to a leaf query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("clause spec must be a JSON object, got {found}")]
    NotAnObject { found: String },

    #[error("invalid clause JSON: {0}")]
    InvalidJson(String),

    #[error("clause field name must not be empty")]
    EmptyField,

    #[error("field '{field}': object value has no 'Type' key, cannot pick a leaf query")]
    MissingType { field: String },

    #[error("field '{field}': descriptor 'Type' must be a string")]
    TypeNotString { field: String },

    #[error("field '{field}': descriptor has no 'Value' key")]
    MissingValue { field: String },

    #[error("field '{field}': null is not a valid clause value")]
    NullValue { field: String },

    #[error("field '{field}': array elements must be strings, numbers or booleans")]
    NestedArray { field: String },

    #[error("unknown leaf query type '{0}'")]
    UnknownLeafType(String),
}

/// The primary error type for search execution.
#[derive(Error, Debug)]
pub enum EsqError {
    /// A search or scroll response did not carry a scroll cursor id.
    #[error("{phase} response is missing a scroll id")]
    Protocol { phase: ScrollPhase },

    /// The HTTP call itself failed.
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),

    /// The cluster answered with a non-success status.
    #[error("{operation} returned status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// A clause could not be compiled.
    #[error(transparent)]
    Compilation(#[from] CompileError),

    /// Client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The caller cancelled the search while it was running.
    #[error("search cancelled")]
    Cancelled,

    /// A failure after some pages were already accumulated.
    ///
    /// The hits collected before the failure are handed back in `partial`.
    #[error("scroll aborted after {} hits: {source}", .partial.len())]
    Incomplete {
        #[source]
        source: Box<EsqError>,
        partial: Vec<Value>,
    },
}

impl EsqError {
    /// Returns the underlying error, looking through [`EsqError::Incomplete`].
    pub fn root(&self) -> &EsqError {
        match self {
            EsqError::Incomplete { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the hits accumulated before the failure, if any.
    pub fn partial_hits(&self) -> &[Value] {
        match self {
            EsqError::Incomplete { partial, .. } => partial,
            _ => &[],
        }
    }
}

/// Result type alias for search execution.
pub type Result<T> = std::result::Result<T, EsqError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_protocol_error_display() {
        let err = EsqError::Protocol {
            phase: ScrollPhase::Init,
        };
        assert_eq!(
            err.to_string(),
            "initial search response is missing a scroll id"
        );
    }

    #[test]
    fn test_incomplete_exposes_root_and_partial() {
        let err = EsqError::Incomplete {
            source: Box::new(EsqError::Protocol {
                phase: ScrollPhase::Scroll,
            }),
            partial: vec![json!({"_id": "1"}), json!({"_id": "2"})],
        };

        assert!(matches!(
            err.root(),
            EsqError::Protocol {
                phase: ScrollPhase::Scroll
            }
        ));
        assert_eq!(err.partial_hits().len(), 2);
        assert!(err.to_string().starts_with("scroll aborted after 2 hits"));
    }

    #[test]
    fn test_compile_error_converts() {
        let err: EsqError = CompileError::EmptyField.into();
        assert!(matches!(err, EsqError::Compilation(CompileError::EmptyField)));
        assert!(err.partial_hits().is_empty());
    }
}
