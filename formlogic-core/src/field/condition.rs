//! Conditional-logic specification attached to a field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FieldId;

/// How the conditions of one field combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Logical AND. An empty condition list satisfies it vacuously.
    #[default]
    All,

    /// Logical OR. An empty condition list never satisfies it.
    Any,
}

/// Comparison applied between a referenced field's value and the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "does not equal",
            Operator::Contains => "contains",
            Operator::GreaterThan => "is greater than",
            Operator::LessThan => "is less than",
        };
        f.write_str(text)
    }
}

/// A single `{ referencedFieldId, operator, expectedValue }` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub referenced_field_id: FieldId,
    pub operator: Operator,
    #[serde(default)]
    pub expected_value: Value,
}

impl Condition {
    pub fn new(
        referenced: impl Into<FieldId>,
        operator: Operator,
        expected: impl Into<Value>,
    ) -> Self {
        Self {
            referenced_field_id: referenced.into(),
            operator,
            expected_value: expected.into(),
        }
    }

    pub fn equals(referenced: impl Into<FieldId>, expected: impl Into<Value>) -> Self {
        Self::new(referenced, Operator::Equals, expected)
    }
}

/// The show/hide rule of a conditionally visible field.
///
/// With `show_when_matched = true`, satisfied conditions show the field.
/// With `show_when_matched = false`, satisfied conditions hide it and
/// unsatisfied conditions show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalSpec {
    pub show_when_matched: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub combinator: Combinator,
}

impl ConditionalSpec {
    /// A spec that shows the field when all conditions match.
    pub fn show_when_all(conditions: Vec<Condition>) -> Self {
        Self {
            show_when_matched: true,
            conditions,
            combinator: Combinator::All,
        }
    }

    /// A spec that shows the field when any condition matches.
    pub fn show_when_any(conditions: Vec<Condition>) -> Self {
        Self {
            show_when_matched: true,
            conditions,
            combinator: Combinator::Any,
        }
    }

    /// A spec that hides the field when all conditions match.
    pub fn hide_when_all(conditions: Vec<Condition>) -> Self {
        Self {
            show_when_matched: false,
            conditions,
            combinator: Combinator::All,
        }
    }

    /// Drop every condition that references `id`. Returns how many were dropped.
    pub fn strip_references_to(&mut self, id: &str) -> usize {
        let before = self.conditions.len();
        self.conditions
            .retain(|condition| condition.referenced_field_id.as_str() != id);
        before - self.conditions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operators_use_snake_case() {
        let op: Operator = serde_json::from_value(json!("not_equals")).unwrap();
        assert_eq!(op, Operator::NotEquals);
        assert_eq!(serde_json::to_value(Operator::GreaterThan).unwrap(), json!("greater_than"));
    }

    #[test]
    fn missing_expected_value_is_null() {
        let condition: Condition = serde_json::from_value(json!({
            "referencedFieldId": "a",
            "operator": "not_equals"
        }))
        .unwrap();
        assert_eq!(condition.expected_value, Value::Null);
    }

    #[test]
    fn strip_references() {
        let mut spec = ConditionalSpec::show_when_any(vec![
            Condition::equals("a", "x"),
            Condition::equals("b", "y"),
            Condition::equals("a", "z"),
        ]);

        assert_eq!(spec.strip_references_to("a"), 2);
        assert_eq!(spec.conditions.len(), 1);
        assert_eq!(spec.conditions[0].referenced_field_id.as_str(), "b");
    }
}
