//! Graph Nodes
//!
//! This module defines the node type that lives in the dependency graph.

use indexmap::IndexSet;
use serde::Serialize;

use crate::field::{FieldDescriptor, FieldId};

/// A field's position in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    /// The field this node stands for.
    field_id: FieldId,

    /// Fields this field's conditions reference.
    /// Deduplicated, never contains `field_id` itself.
    dependencies: IndexSet<FieldId>,

    /// Fields whose conditions reference this field.
    dependents: IndexSet<FieldId>,

    /// Longest dependency chain ending at this node. 0 without dependencies.
    level: usize,
}

impl DependencyNode {
    /// Create a node with no edges.
    pub fn new(field_id: FieldId) -> Self {
        Self {
            field_id,
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
            level: 0,
        }
    }

    /// Create a node with the dependencies extracted from a field's spec.
    pub fn from_field(field: &FieldDescriptor) -> Self {
        let mut node = Self::new(field.id.clone());
        node.dependencies = extract_dependencies(field);
        node
    }

    /// Get the field id.
    pub fn field_id(&self) -> &FieldId {
        &self.field_id
    }

    /// Get the node's level.
    pub fn level(&self) -> usize {
        self.level
    }

    pub(crate) fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    /// Add a dependency (a field this node reads from).
    ///
    /// Self-references are ignored.
    pub fn add_dependency(&mut self, field_id: FieldId) {
        if field_id != self.field_id {
            self.dependencies.insert(field_id);
        }
    }

    /// Remove a dependency.
    pub fn remove_dependency(&mut self, field_id: &str) -> bool {
        self.dependencies.shift_remove(field_id)
    }

    /// Replace the dependency set, returning the old one.
    pub fn replace_dependencies(&mut self, dependencies: IndexSet<FieldId>) -> IndexSet<FieldId> {
        std::mem::replace(&mut self.dependencies, dependencies)
    }

    /// Get all dependencies.
    pub fn dependencies(&self) -> &IndexSet<FieldId> {
        &self.dependencies
    }

    /// Add a dependent (a field that reads from this node).
    pub fn add_dependent(&mut self, field_id: FieldId) {
        if field_id != self.field_id {
            self.dependents.insert(field_id);
        }
    }

    /// Remove a dependent.
    pub fn remove_dependent(&mut self, field_id: &str) -> bool {
        self.dependents.shift_remove(field_id)
    }

    /// Get all dependents.
    pub fn dependents(&self) -> &IndexSet<FieldId> {
        &self.dependents
    }

    /// Check whether this node depends on `field_id` directly.
    pub fn depends_on(&self, field_id: &str) -> bool {
        self.dependencies.contains(field_id)
    }
}

/// Deduplicated ids referenced by a field, in condition order, minus itself.
pub fn extract_dependencies(field: &FieldDescriptor) -> IndexSet<FieldId> {
    field
        .referenced_fields()
        .filter(|id| **id != field.id)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Condition, ConditionalSpec};

    #[test]
    fn extraction_dedups_and_strips_self() {
        let field = FieldDescriptor::new("c", 2).with_conditional(ConditionalSpec::show_when_any(
            vec![
                Condition::equals("a", "1"),
                Condition::equals("c", "loop"),
                Condition::equals("b", "2"),
                Condition::equals("a", "3"),
            ],
        ));

        let node = DependencyNode::from_field(&field);
        let deps: Vec<&str> = node.dependencies().iter().map(FieldId::as_str).collect();

        assert_eq!(deps, vec!["a", "b"]);
        assert!(!node.depends_on("c"));
        assert_eq!(node.level(), 0);
    }

    #[test]
    fn dependency_management() {
        let mut node = DependencyNode::new(FieldId::from("x"));

        node.add_dependency(FieldId::from("a"));
        node.add_dependency(FieldId::from("b"));
        node.add_dependency(FieldId::from("x"));

        assert_eq!(node.dependencies().len(), 2);
        assert!(node.remove_dependency("a"));
        assert!(!node.remove_dependency("a"));
        assert_eq!(node.dependencies().len(), 1);

        node.add_dependent(FieldId::from("y"));
        assert!(node.dependents().contains("y"));
        assert!(node.remove_dependent("y"));
        assert!(node.dependents().is_empty());
    }
}
