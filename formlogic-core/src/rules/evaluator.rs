//! Rule Evaluator
//!
//! Decides whether one field is visible given a snapshot of all values.
//! Pure: no state, no side effects, and no error path. Every failure case
//! turns into a visibility decision plus a human-readable reason.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{Combinator, Condition, ConditionalSpec, FieldCatalog, FieldValues, Operator};

use super::value::Normalized;

pub const REASON_NO_CONDITIONS: &str = "no conditions defined";

/// Outcome of evaluating one field's conditional logic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub visible: bool,
    pub reasons: Vec<String>,
}

impl EvaluationResult {
    pub fn visible() -> Self {
        Self {
            visible: true,
            reasons: Vec::new(),
        }
    }

    pub fn hidden(reasons: Vec<String>) -> Self {
        Self {
            visible: false,
            reasons,
        }
    }
}

/// Outcome of a single condition.
#[derive(Debug, Clone, PartialEq)]
struct ConditionOutcome {
    satisfied: bool,
    /// Why the condition failed, or what matched when it succeeded.
    detail: String,
}

/// Evaluate a field's conditional spec against the current values.
pub fn evaluate<C>(
    spec: Option<&ConditionalSpec>,
    values: &FieldValues,
    catalog: &C,
) -> EvaluationResult
where
    C: FieldCatalog + ?Sized,
{
    let Some(spec) = spec else {
        return EvaluationResult::visible();
    };

    if spec.conditions.is_empty() {
        return EvaluationResult {
            visible: spec.show_when_matched,
            reasons: vec![REASON_NO_CONDITIONS.to_string()],
        };
    }

    let outcomes: Vec<ConditionOutcome> = spec
        .conditions
        .iter()
        .map(|condition| evaluate_condition(condition, values, catalog))
        .collect();

    let matched = match spec.combinator {
        Combinator::All => outcomes.iter().all(|o| o.satisfied),
        Combinator::Any => outcomes.iter().any(|o| o.satisfied),
    };

    let visible = if matched {
        spec.show_when_matched
    } else {
        !spec.show_when_matched
    };

    if visible {
        return EvaluationResult::visible();
    }

    // Hidden because the conditions failed, or because they matched an
    // inverted gate. Report whichever side decided it.
    let reasons = outcomes
        .into_iter()
        .filter(|o| o.satisfied == matched)
        .map(|o| o.detail)
        .collect();

    EvaluationResult::hidden(reasons)
}

fn evaluate_condition<C>(
    condition: &Condition,
    values: &FieldValues,
    catalog: &C,
) -> ConditionOutcome
where
    C: FieldCatalog + ?Sized,
{
    let field = &condition.referenced_field_id;

    if !catalog.contains_field(field.as_str()) {
        return ConditionOutcome {
            satisfied: false,
            detail: format!("referenced field not found: '{}'", field),
        };
    }

    let actual = Normalized::from_json(values.get(field).unwrap_or(&Value::Null));
    let expected = Normalized::from_json(&condition.expected_value);

    if actual.is_null() {
        // Unanswered only satisfies "not equals null".
        let satisfied = condition.operator == Operator::NotEquals && expected.is_null();
        return ConditionOutcome {
            satisfied,
            detail: format!("field has no value: '{}'", field),
        };
    }

    let satisfied = match condition.operator {
        Operator::Equals => actual.loosely_equals(&expected),
        Operator::NotEquals => !actual.loosely_equals(&expected),
        Operator::Contains => actual.contains(&expected),
        Operator::GreaterThan => actual.compare(&expected).is_some_and(|o| o.is_gt()),
        Operator::LessThan => actual.compare(&expected).is_some_and(|o| o.is_lt()),
    };

    let detail = if satisfied {
        format!(
            "condition matched: '{}' {} \"{}\"",
            field, condition.operator, expected
        )
    } else {
        format!(
            "condition not met: '{}' {} \"{}\" (current value: \"{}\")",
            field, condition.operator, expected, actual
        )
    };

    ConditionOutcome { satisfied, detail }
}
