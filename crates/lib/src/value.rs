//! Helpers over plain `serde_json::Value` data.
//!
//! The store accepts and returns plain data as [`serde_json::Value`]. This
//! module classifies values into the three node shapes and provides the
//! comparisons the mutation and validation engines rely on.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The structural shape of a value, and of the node that stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueShape {
    /// string, number, boolean or null
    Primitive,
    /// keyed record
    Object,
    /// ordered list
    Array,
}

impl ValueShape {
    /// Classifies a plain value. Arrays are checked before objects.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => ValueShape::Array,
            Value::Object(_) => ValueShape::Object,
            _ => ValueShape::Primitive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueShape::Primitive => "primitive",
            ValueShape::Object => "object",
            ValueShape::Array => "array",
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, ValueShape::Primitive)
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural equality, comparing numbers by numeric value.
///
/// `serde_json` distinguishes `1` from `1.0`; plain data coming from different
/// sources should not, so numbers are compared as `f64`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Coerces a primitive to a number the way loosely typed form input expects.
///
/// `null` and the empty (or blank) string are `0`, booleans are `0`/`1`,
/// numeric strings parse. Anything else has no numeric value and yields
/// `None`, which never satisfies a comparison.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}
