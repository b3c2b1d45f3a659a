//! Property value model.
//!
//! Values are a small tagged union so that node/edge property maps can hold
//! arbitrary structured data while still letting the index manager pick out
//! the subset that is cheap to equality-index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single property value.
///
/// `List` and `Map` are deep-copied on construction (see [`Value::normalize`])
/// so that a caller mutating the collection they passed in can never reach a
/// value already stored in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of this value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether this value is eligible for equality indexing.
    ///
    /// Scalars and strings are hashable; `Null`, `List`, and `Map` are not —
    /// they fall back to a filtered scan at query time.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::Null | Value::List(_) | Value::Map(_) => false,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => true,
        }
    }

    /// Canonical key usable in a `BTreeMap`/`BTreeSet` posting index.
    ///
    /// Only called on values for which [`Value::is_hashable`] is true. Floats
    /// are rendered through their bit pattern so that equal floats produce
    /// equal keys without relying on `Eq`/`Ord` for `f64`.
    pub(crate) fn index_key(&self) -> HashableValue {
        match self {
            Value::Null => HashableValue::Null,
            Value::Bool(b) => HashableValue::Bool(*b),
            Value::Int(i) => HashableValue::Int(*i),
            Value::Float(f) => HashableValue::Float(f.to_bits()),
            Value::String(s) => HashableValue::String(s.clone()),
            Value::List(_) | Value::Map(_) => {
                unreachable!("index_key called on unhashable value")
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(fl) => write!(f, "{fl}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Totally-ordered, hashable representation of a [`Value`], used as the
/// right-hand side of a node/edge property index key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum HashableValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    String(String),
}
