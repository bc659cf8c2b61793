//! Elasticsearch Query DSL documents produced by the compiler.
//!
//! Only the subset needed for a bool query made of single-field leaf queries
//! is modelled here.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::CompileError;

/// Default number of hits requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Leaf query types a clause can compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafType {
    Term,
    Terms,
    #[default]
    Match,
    MatchPhrase,
    MatchPhrasePrefix,
    Wildcard,
    Prefix,
    Regexp,
    Fuzzy,
}

impl LeafType {
    /// Every supported leaf type.
    pub const ALL: [LeafType; 9] = [
        LeafType::Term,
        LeafType::Terms,
        LeafType::Match,
        LeafType::MatchPhrase,
        LeafType::MatchPhrasePrefix,
        LeafType::Wildcard,
        LeafType::Prefix,
        LeafType::Regexp,
        LeafType::Fuzzy,
    ];

    /// Returns the query DSL key for this leaf type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafType::Term => "term",
            LeafType::Terms => "terms",
            LeafType::Match => "match",
            LeafType::MatchPhrase => "match_phrase",
            LeafType::MatchPhrasePrefix => "match_phrase_prefix",
            LeafType::Wildcard => "wildcard",
            LeafType::Prefix => "prefix",
            LeafType::Regexp => "regexp",
            LeafType::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        LeafType::ALL
            .into_iter()
            .find(|leaf| leaf.as_str() == name)
            .ok_or_else(|| CompileError::UnknownLeafType(s.to_string()))
    }
}

/// A single `{ <leaf>: { <field>: <value> } }` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafStatement {
    pub leaf: LeafType,
    pub field: String,
    pub value: Value,
}

impl LeafStatement {
    /// Creates a new leaf statement.
    pub fn new(leaf: LeafType, field: impl Into<String>, value: Value) -> Self {
        Self {
            leaf,
            field: field.into(),
            value,
        }
    }
}

impl Serialize for LeafStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            self.leaf.as_str(),
            &BTreeMap::from([(&self.field, &self.value)]),
        )?;
        map.end()
    }
}

/// The body of a `bool` query.
///
/// Empty groups are left out of the serialized document entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<LeafStatement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<LeafStatement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<LeafStatement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<LeafStatement>,
}

impl BoolQuery {
    /// Returns the total number of leaf statements across all groups.
    pub fn len(&self) -> usize {
        self.must.len() + self.must_not.len() + self.should.len() + self.filter.len()
    }

    /// Returns true when no group holds a statement.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The `query` wrapper: `{ "bool": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryBody {
    #[serde(rename = "bool")]
    pub bool_query: BoolQuery,
}

/// The body sent with the initial scroll search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Hits per page. Bounds a single response, not the total.
    pub size: usize,
    pub query: QueryBody,
}

impl SearchRequest {
    /// Wraps a bool query into a search request body.
    pub fn new(bool_query: BoolQuery, size: usize) -> Self {
        Self {
            size,
            query: QueryBody { bool_query },
        }
    }

    /// Returns the compiled bool query.
    pub fn bool_query(&self) -> &BoolQuery {
        &self.query.bool_query
    }
}
