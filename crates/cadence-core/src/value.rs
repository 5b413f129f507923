//! # Record Values — Tagged Variant
//!
//! Defines [`Value`], the single sum type carried in the value and context
//! fields of an activity record. The codec, the complexity analyzer and the
//! impact calculator all match exhaustively over it; there is no runtime
//! shape inspection anywhere in the workspace.
//!
//! Maps are `BTreeMap`s so that serialization order, and therefore the wire
//! text and integrity checksums, are deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// An ordered string-keyed map of values.
pub type Map = BTreeMap<String, Value>;

/// A record value or context node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value; produced when decoding a JSON `null`.
    Null,
    /// A numeric value. Integers are carried exactly up to 2^53.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// Free text. May contain the wire delimiter; the codec escapes it.
    Text(String),
    /// A point in time, rendered on the wire as epoch milliseconds.
    Temporal(DateTime<Utc>),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A nested string-keyed map.
    Map(Map),
}

impl Value {
    /// Returns the map if this value is a `Map`.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the text if this value is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this value is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True for `List` and `Map`.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Short variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Temporal(_) => "temporal",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Temporal(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

/// Structural conversion from a parsed JSON tree. Text is taken verbatim;
/// no unescaping is applied.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Self::Map(obj.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
