//! Clause-to-bool-query compiler.
//!
//! Turns the four shorthand clause groups into a [`BoolQuery`]. Leaf types are
//! resolved per field:
//!
//! | Clause value | Leaf type |
//! |--------------|-----------|
//! | `{Type, Value}` descriptor | the descriptor's type |
//! | list | `terms` |
//! | text containing whitespace | `match_phrase` |
//! | anything else | the compiler's default (`match`) |

use tracing::debug;

use super::clause::{ClauseSpec, ClauseValue, PlainValue};
use super::dsl::{BoolQuery, LeafStatement, LeafType, SearchRequest};

/// Clause specifications for each bool group, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolClauses {
    pub must: Vec<ClauseSpec>,
    pub must_not: Vec<ClauseSpec>,
    pub should: Vec<ClauseSpec>,
    pub filter: Vec<ClauseSpec>,
}

impl BoolClauses {
    /// Creates an empty set of clauses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `must` clause spec.
    pub fn must(mut self, spec: ClauseSpec) -> Self {
        self.must.push(spec);
        self
    }

    /// Adds a `must_not` clause spec.
    pub fn must_not(mut self, spec: ClauseSpec) -> Self {
        self.must_not.push(spec);
        self
    }

    /// Adds a `should` clause spec.
    pub fn should(mut self, spec: ClauseSpec) -> Self {
        self.should.push(spec);
        self
    }

    /// Adds a `filter` clause spec.
    pub fn filter(mut self, spec: ClauseSpec) -> Self {
        self.filter.push(spec);
        self
    }
}

/// Compiles clause specifications into bool queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler {
    default_leaf: LeafType,
}

impl QueryCompiler {
    /// Creates a compiler using `default_leaf` for single whitespace-free values.
    pub fn new(default_leaf: LeafType) -> Self {
        Self { default_leaf }
    }

    /// Returns the leaf type used for single whitespace-free values.
    pub fn default_leaf(&self) -> LeafType {
        self.default_leaf
    }

    /// Picks the leaf type for a clause value.
    pub fn leaf_for(&self, value: &ClauseValue) -> LeafType {
        match value {
            ClauseValue::Typed { leaf, .. } => *leaf,
            ClauseValue::Plain(PlainValue::List(_)) => LeafType::Terms,
            ClauseValue::Plain(PlainValue::Scalar(scalar)) if scalar.has_whitespace() => {
                LeafType::MatchPhrase
            }
            ClauseValue::Plain(PlainValue::Scalar(_)) => self.default_leaf,
        }
    }

    /// Compiles a single field/value pair into a leaf statement.
    pub fn compile_field(&self, field: &str, value: &ClauseValue) -> LeafStatement {
        let leaf = self.leaf_for(value);
        let value = match value {
            ClauseValue::Typed { value, .. } => value.clone(),
            ClauseValue::Plain(plain) => plain.to_value(),
        };
        LeafStatement::new(leaf, field, value)
    }

    /// Compiles all four clause groups into a bool query.
    pub fn compile(&self, clauses: &BoolClauses) -> BoolQuery {
        let query = BoolQuery {
            must: self.compile_group(&clauses.must),
            must_not: self.compile_group(&clauses.must_not),
            should: self.compile_group(&clauses.should),
            filter: self.compile_group(&clauses.filter),
        };

        debug!(
            must = query.must.len(),
            must_not = query.must_not.len(),
            should = query.should.len(),
            filter = query.filter.len(),
            default_leaf = %self.default_leaf,
            "Compiled bool query"
        );

        query
    }

    /// Compiles clauses and wraps them in a search request with `size` hits per page.
    pub fn compile_request(&self, clauses: &BoolClauses, size: usize) -> SearchRequest {
        SearchRequest::new(self.compile(clauses), size)
    }

    fn compile_group(&self, specs: &[ClauseSpec]) -> Vec<LeafStatement> {
        specs
            .iter()
            .flat_map(|spec| spec.iter())
            .map(|(field, value)| self.compile_field(field, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::clause::Scalar;
    use serde_json::json;

    #[test]
    fn test_default_leaf_for_single_word() {
        let compiler = QueryCompiler::default();
        assert_eq!(compiler.leaf_for(&"error".into()), LeafType::Match);

        let compiler = QueryCompiler::new(LeafType::Term);
        assert_eq!(compiler.leaf_for(&"error".into()), LeafType::Term);
        assert_eq!(compiler.leaf_for(&42i64.into()), LeafType::Term);
        assert_eq!(compiler.leaf_for(&false.into()), LeafType::Term);
    }

    #[test]
    fn test_whitespace_forces_match_phrase() {
        for default in [LeafType::Match, LeafType::Term, LeafType::Wildcard] {
            let compiler = QueryCompiler::new(default);
            assert_eq!(
                compiler.leaf_for(&"connection reset".into()),
                LeafType::MatchPhrase
            );
        }
    }

    #[test]
    fn test_list_is_terms() {
        let compiler = QueryCompiler::new(LeafType::Term);
        let value = ClauseValue::list(["a b", "c"]);
        assert_eq!(compiler.leaf_for(&value), LeafType::Terms);

        let stmt = compiler.compile_field("tags", &value);
        assert_eq!(stmt.value, json!(["a b", "c"]));
    }

    #[test]
    fn test_typed_value_is_emitted_exactly() {
        let compiler = QueryCompiler::default();
        let value = ClauseValue::typed(LeafType::Term, json!({ "value": "x", "boost": 2 }));
        let stmt = compiler.compile_field("f", &value);
        assert_eq!(stmt.leaf, LeafType::Term);
        assert_eq!(stmt.value, json!({ "value": "x", "boost": 2 }));
    }

    #[test]
    fn test_multi_field_spec_decomposes() {
        let compiler = QueryCompiler::default();
        let clauses = BoolClauses::new().must(
            ClauseSpec::new()
                .field("a", "1")
                .field("b", Scalar::from(2i64)),
        );

        let query = compiler.compile(&clauses);
        assert_eq!(query.must.len(), 2);
        assert_eq!(query.must[0], LeafStatement::new(LeafType::Match, "a", json!("1")));
        assert_eq!(query.must[1], LeafStatement::new(LeafType::Match, "b", json!(2)));
    }

    #[test]
    fn test_group_order_follows_input() {
        let compiler = QueryCompiler::default();
        let clauses = BoolClauses::new()
            .should(ClauseSpec::new().field("first", "1"))
            .should(ClauseSpec::new().field("second", "2"));

        let fields: Vec<_> = compiler
            .compile(&clauses)
            .should
            .into_iter()
            .map(|s| s.field)
            .collect();
        assert_eq!(fields, vec!["first", "second"]);
    }

    #[test]
    fn test_empty_clauses_compile_to_empty_bool() {
        let request = QueryCompiler::default().compile_request(&BoolClauses::new(), 100);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "size": 100, "query": { "bool": {} } })
        );
    }
}
