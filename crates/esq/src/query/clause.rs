//! Shorthand clause specifications.
//!
//! A [`ClauseSpec`] maps field names to values. Each value is either a plain
//! scalar or list, from which the leaf query type is inferred, or an explicit
//! `{ "Type": ..., "Value": ... }` descriptor naming the leaf type directly.
//!
//! The decision between the two is made once, when the spec is built, so the
//! compiler never has to inspect raw JSON.
//!
//! ```
//! use esq::query::{ClauseSpec, ClauseValue, LeafType};
//!
//! let spec = ClauseSpec::new()
//!     .field("status", "error")
//!     .field("host.name", ClauseValue::typed(LeafType::Wildcard, "web*"));
//! assert_eq!(spec.len(), 2);
//!
//! let parsed: ClauseSpec = r#"{"tags": ["a", "b"]}"#.parse().unwrap();
//! assert_eq!(parsed.len(), 1);
//! ```

use std::str::FromStr;

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::CompileError;

use super::dsl::LeafType;

/// Descriptor keys naming the explicit leaf type.
const TYPE_KEYS: [&str; 2] = ["Type", "type"];

/// Descriptor keys holding the explicit value.
const VALUE_KEYS: [&str; 2] = ["Value", "value"];

/// A single scalar clause value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Returns true if this is text containing any whitespace.
    pub fn has_whitespace(&self) -> bool {
        match self {
            Scalar::Text(s) => s.chars().any(char::is_whitespace),
            Scalar::Number(_) | Scalar::Bool(_) => false,
        }
    }

    /// Converts the scalar to its JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }

    fn from_json(field: &str, value: Value) -> Result<Self, CompileError> {
        match value {
            Value::String(s) => Ok(Scalar::Text(s)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Null => Err(CompileError::NullValue {
                field: field.to_string(),
            }),
            Value::Array(_) | Value::Object(_) => Err(CompileError::NestedArray {
                field: field.to_string(),
            }),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A value whose leaf type is inferred from its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl PlainValue {
    /// Converts the value to its JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            PlainValue::Scalar(s) => s.to_value(),
            PlainValue::List(items) => Value::Array(items.iter().map(Scalar::to_value).collect()),
        }
    }
}

/// The value side of a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseValue {
    /// Leaf type inferred by the compiler.
    Plain(PlainValue),
    /// Leaf type given explicitly; the value is emitted as-is.
    Typed { leaf: LeafType, value: Value },
}

impl ClauseValue {
    /// Creates an explicit-type descriptor.
    pub fn typed(leaf: LeafType, value: impl Into<Value>) -> Self {
        ClauseValue::Typed {
            leaf,
            value: value.into(),
        }
    }

    /// Creates a list value, which compiles to a `terms` query.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        ClauseValue::Plain(PlainValue::List(items.into_iter().map(Into::into).collect()))
    }

    /// Resolves a raw JSON value into a clause value for `field`.
    pub fn from_json(field: &str, value: Value) -> Result<Self, CompileError> {
        match value {
            Value::Array(items) => {
                let scalars = items
                    .into_iter()
                    .map(|item| Scalar::from_json(field, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ClauseValue::Plain(PlainValue::List(scalars)))
            }
            Value::Object(descriptor) => Self::from_descriptor(field, descriptor),
            scalar => Ok(ClauseValue::Plain(PlainValue::Scalar(Scalar::from_json(
                field, scalar,
            )?))),
        }
    }

    fn from_descriptor(field: &str, mut descriptor: Map<String, Value>) -> Result<Self, CompileError> {
        let leaf = TYPE_KEYS
            .iter()
            .find_map(|key| descriptor.remove(*key))
            .ok_or_else(|| CompileError::MissingType {
                field: field.to_string(),
            })?;
        let leaf: LeafType = leaf
            .as_str()
            .ok_or_else(|| CompileError::TypeNotString {
                field: field.to_string(),
            })?
            .parse()?;

        let value = VALUE_KEYS
            .iter()
            .find_map(|key| descriptor.remove(*key))
            .ok_or_else(|| CompileError::MissingValue {
                field: field.to_string(),
            })?;

        if !descriptor.is_empty() {
            debug!(
                field = %field,
                ignored = ?descriptor.keys().collect::<Vec<_>>(),
                "Ignoring extra descriptor keys"
            );
        }

        Ok(ClauseValue::Typed { leaf, value })
    }
}

macro_rules! impl_scalar_clause_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ClauseValue {
                fn from(value: $ty) -> Self {
                    ClauseValue::Plain(PlainValue::Scalar(value.into()))
                }
            }
        )*
    };
}

impl_scalar_clause_value!(&str, String, i64, u64, bool, Scalar);

impl From<PlainValue> for ClauseValue {
    fn from(value: PlainValue) -> Self {
        ClauseValue::Plain(value)
    }
}

/// An ordered mapping from field name to clause value.
///
/// Every entry compiles to exactly one leaf statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseSpec {
    entries: Vec<(String, ClauseValue)>,
}

impl ClauseSpec {
    /// Creates an empty clause spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. A field that is already present has its value replaced.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field in place, replacing an existing value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ClauseValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Iterates over fields in insertion order. Parsed specs keep the order
    /// of the JSON document.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClauseValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the spec holds no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a clause spec from a JSON object.
    pub fn from_json(value: Value) -> Result<Self, CompileError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(CompileError::NotAnObject {
                    found: json_kind(&other).to_string(),
                });
            }
        };

        let mut spec = ClauseSpec::new();
        for (field, value) in map {
            if field.trim().is_empty() {
                return Err(CompileError::EmptyField);
            }
            let value = ClauseValue::from_json(&field, value)?;
            spec.insert(field, value);
        }
        Ok(spec)
    }
}

impl TryFrom<Value> for ClauseSpec {
    type Error = CompileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl FromStr for ClauseSpec {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| CompileError::InvalidJson(e.to_string()))?;
        Self::from_json(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
