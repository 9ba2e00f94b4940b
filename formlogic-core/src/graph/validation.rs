//! Structural validation of the dependency graph.
//!
//! The editor surfaces these issues in its property panel and refuses to
//! save a form whose report is invalid. The engine itself keeps running.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::GraphError;
use crate::field::{Condition, ConditionalSpec, FieldDescriptor, FieldId, Operator};

use super::analysis::{self, render_cycle, Cycle};
use super::dependency::DependencyGraph;

/// A single structural problem.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("circular dependency: {}", render_cycle(.path))]
    Cycle { path: Cycle },

    #[error("field '{field_id}' references missing field '{missing}'")]
    DanglingReference { field_id: FieldId, missing: FieldId },
}

/// Result of [`DependencyGraph::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Human-readable messages, one per issue.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl DependencyGraph {
    /// Report every cycle and every dangling reference.
    pub fn validate(&self) -> ValidationReport {
        let mut errors: Vec<ValidationIssue> = self
            .cycles()
            .iter()
            .map(|cycle| ValidationIssue::Cycle { path: cycle.clone() })
            .collect();

        for id in analysis::display_sequence(self.fields()) {
            let Some(node) = self.nodes().get(id) else {
                continue;
            };
            for dep in node.dependencies() {
                if !self.nodes().contains_key(dep) {
                    errors.push(ValidationIssue::DanglingReference {
                        field_id: id.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Fields that `field_id` could reference without creating a cycle.
    ///
    /// Each candidate is checked by adding a hypothetical condition on it and
    /// rebuilding the graph. A graph that already contains a cycle offers no
    /// references until the cycle is resolved.
    pub fn available_references(&self, field_id: &str) -> Result<Vec<FieldId>, GraphError> {
        let source = self.field(field_id)?;

        let available = self
            .fields_in_display_order()
            .into_iter()
            .filter(|candidate| candidate.id != source.id)
            .filter(|candidate| {
                let hypothetical =
                    with_reference(self.fields().values(), &source.id, &candidate.id);
                !DependencyGraph::build(hypothetical).has_cycles()
            })
            .map(|candidate| candidate.id.clone())
            .collect();

        Ok(available)
    }
}

/// Clone the catalog with one extra condition `source -> target`.
fn with_reference<'a>(
    fields: impl Iterator<Item = &'a FieldDescriptor>,
    source: &FieldId,
    target: &FieldId,
) -> Vec<FieldDescriptor> {
    fields
        .map(|field| {
            let mut field = field.clone();
            if &field.id == source {
                field
                    .conditional
                    .get_or_insert_with(|| ConditionalSpec::show_when_all(Vec::new()))
                    .conditions
                    .push(Condition::new(target.clone(), Operator::NotEquals, Value::Null));
            }
            field
        })
        .collect()
}
