//! Value normalization and comparison.
//!
//! Both sides of a condition are normalized before they are compared:
//! booleans and numbers keep their identity, arrays keep their elements,
//! everything else becomes a trimmed string.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

/// A field value (or expected value) in comparable form.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Normalized>),
}

impl Normalized {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Normalized::Null,
            Value::Bool(b) => Normalized::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(Normalized::Number)
                .unwrap_or_else(|| Normalized::Text(n.to_string())),
            Value::String(s) => Normalized::Text(s.trim().to_string()),
            Value::Array(items) => Normalized::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => Normalized::Text(value.to_string().trim().to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Normalized::Null)
    }

    /// Numeric view: numbers as-is, strings that parse as numbers.
    fn as_number(&self) -> Option<f64> {
        match self {
            Normalized::Number(n) => Some(*n),
            Normalized::Text(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// String view used for coercion and lexicographic ordering.
    fn as_text(&self) -> String {
        self.to_string()
    }

    /// Straightforward equality after normalization.
    ///
    /// Arrays equal arrays element-wise; an array never equals a scalar.
    pub fn loosely_equals(&self, other: &Normalized) -> bool {
        match (self, other) {
            (Normalized::Null, Normalized::Null) => true,
            (Normalized::Null, _) | (_, Normalized::Null) => false,
            (Normalized::Bool(a), Normalized::Bool(b)) => a == b,
            (Normalized::Number(a), Normalized::Number(b)) => a == b,
            (Normalized::Number(_), Normalized::Text(_))
            | (Normalized::Text(_), Normalized::Number(_)) => {
                match (self.as_number(), other.as_number()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (Normalized::List(a), Normalized::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            (Normalized::List(_), _) | (_, Normalized::List(_)) => false,
            _ => self.as_text() == other.as_text(),
        }
    }

    /// Membership for arrays, substring containment for everything else.
    pub fn contains(&self, needle: &Normalized) -> bool {
        match self {
            Normalized::Null => false,
            Normalized::List(items) => items.iter().any(|item| item.loosely_equals(needle)),
            _ => {
                if needle.is_null() {
                    return false;
                }
                self.as_text().contains(&needle.as_text())
            }
        }
    }

    /// Numeric ordering when both sides are numeric, lexicographic otherwise.
    pub fn compare(&self, other: &Normalized) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(self.as_text().cmp(&other.as_text())),
        }
    }
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalized::Null => write!(f, "null"),
            Normalized::Bool(b) => write!(f, "{}", b),
            Normalized::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Normalized::Text(s) => write!(f, "{}", s),
            Normalized::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
