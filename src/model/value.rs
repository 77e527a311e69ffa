//! Cell values
//!
//! Rows expose their fields as a small closed set of value kinds so that
//! comparators, filters and formatters can be resolved without knowing the
//! application's record type.

use std::cmp::Ordering;
use std::fmt;

/// A single field value read from a row
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Discriminant of a [`CellValue`], used to look up default comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
}

impl CellValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            CellValue::Null => ValueKind::Null,
            CellValue::Bool(_) => ValueKind::Bool,
            CellValue::Int(_) | CellValue::Float(_) => ValueKind::Number,
            CellValue::Text(_) => ValueKind::Text,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Parse a raw text field, detecting integers, floats and booleans.
    ///
    /// Empty strings become `Null`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return CellValue::Int(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            if v.is_finite() {
                return CellValue::Float(v);
            }
        }
        match trimmed {
            "true" | "TRUE" | "True" => CellValue::Bool(true),
            "false" | "FALSE" | "False" => CellValue::Bool(false),
            _ => CellValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(CellValue::Int)
                .or_else(|| n.as_f64().map(CellValue::Float))
                .unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// Compare by stringified form. The fallback when nothing better is known.
pub fn lexical_cmp(a: &CellValue, b: &CellValue) -> Ordering {
    a.to_string().cmp(&b.to_string())
}

/// Numeric comparison; non-numbers sort after numbers, nulls last.
pub fn numeric_cmp(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => null_last(a, b).then_with(|| lexical_cmp(a, b)),
    }
}

/// Case-insensitive text comparison, nulls last
pub fn text_cmp(a: &CellValue, b: &CellValue) -> Ordering {
    null_last(a, b).then_with(|| {
        a.to_string()
            .to_lowercase()
            .cmp(&b.to_string().to_lowercase())
    })
}

/// `false < true`, nulls last
pub fn bool_cmp(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        _ => null_last(a, b).then_with(|| lexical_cmp(a, b)),
    }
}

fn null_last(a: &CellValue, b: &CellValue) -> Ordering {
    a.is_null().cmp(&b.is_null())
}
