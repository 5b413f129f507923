//! # Impact Calculator
//!
//! Scores the magnitude of a record value. Pure and variant-dispatched:
//!
//! | Variant  | Impact |
//! |----------|--------|
//! | Number   | `|x|`, capped at 1000 (NaN scores 0) |
//! | Text     | 0.1 per character, capped at 100 |
//! | Bool     | 1 for `true`, 0 for `false` |
//! | Temporal | 1 |
//! | Null     | 0 |
//! | List     | sum over the first 100 elements |
//! | Map      | sum over the first 50 values (key order) |
//!
//! Containers nested deeper than [`MAX_IMPACT_DEPTH`] contribute 0, which
//! bounds recursion on adversarial values the same way the codec's depth cap
//! does.

use cadence_core::Value;
use serde::Serialize;

/// Cap on the impact of a single number.
pub const MAX_NUMBER_IMPACT: f64 = 1000.0;

/// Impact per text character.
pub const TEXT_IMPACT_PER_CHAR: f64 = 0.1;

/// Cap on the impact of a single text.
pub const MAX_TEXT_IMPACT: f64 = 100.0;

/// List elements considered.
pub const MAX_LIST_ITEMS: usize = 100;

/// Map values considered.
pub const MAX_MAP_VALUES: usize = 50;

/// Deepest container level that still contributes. The root is depth 0.
pub const MAX_IMPACT_DEPTH: usize = 10;

/// Impact of a value, always `>= 0`.
pub fn impact(value: &Value) -> f64 {
    impact_at(value, 0)
}

fn impact_at(value: &Value, depth: usize) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Number(n) if n.is_nan() => 0.0,
        Value::Number(n) => n.abs().min(MAX_NUMBER_IMPACT),
        Value::Text(s) => (s.chars().count() as f64 * TEXT_IMPACT_PER_CHAR).min(MAX_TEXT_IMPACT),
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Temporal(_) => 1.0,
        Value::List(_) | Value::Map(_) if depth > MAX_IMPACT_DEPTH => 0.0,
        Value::List(items) => items
            .iter()
            .take(MAX_LIST_ITEMS)
            .map(|item| impact_at(item, depth + 1))
            .sum(),
        Value::Map(map) => map
            .values()
            .take(MAX_MAP_VALUES)
            .map(|v| impact_at(v, depth + 1))
            .sum(),
    }
}

/// Qualitative band for an average impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    /// Average below 1.
    Minimal,
    /// Average in `[1, 10)`.
    Low,
    /// Average in `[10, 100)`.
    Medium,
    /// Average of 100 or more.
    High,
}

impl ImpactLevel {
    /// Band for an average impact.
    pub fn classify(average: f64) -> Self {
        if average < 1.0 {
            Self::Minimal
        } else if average < 10.0 {
            Self::Low
        } else if average < 100.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}
