//! Dependency Graph
//!
//! Owns the field catalog snapshot and the node map derived from it, and
//! keeps levels, evaluation order and cycles current across edits.
//!
//! # Incremental edits
//!
//! `add_field`, `update_field` and `remove_field` patch the edges that
//! changed and then rerun the analysis passes. The result is always identical
//! to `DependencyGraph::build` over the same final field set; a full rebuild
//! is the fallback whenever the caller is unsure.

use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::GraphError;
use crate::field::{FieldDescriptor, FieldId};

use super::analysis::{self, render_cycle, Cycle};
use super::node::{extract_dependencies, DependencyNode};

/// What an incremental edit did to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Updated,
}

/// Change descriptor returned by incremental edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub field_id: FieldId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_dependencies: Option<IndexSet<FieldId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_dependencies: Option<IndexSet<FieldId>>,
    /// Fields whose specs lost conditions pointing at a removed field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stripped_from: Vec<FieldId>,
}

/// The dependency graph among form fields.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The catalog as the graph last saw it, including corrective edits.
    fields: IndexMap<FieldId, FieldDescriptor>,

    /// One node per field.
    nodes: IndexMap<FieldId, DependencyNode>,

    /// Every field id, dependencies before dependents where acyclic.
    evaluation_order: Vec<FieldId>,

    /// Cycles found by the last analysis pass.
    cycles: Vec<Cycle>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from the full field catalog.
    ///
    /// A later field with an already-seen id replaces the earlier one.
    pub fn build<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let mut graph = Self::new();

        for field in fields {
            let node = DependencyNode::from_field(&field);
            if graph.fields.insert(field.id.clone(), field).is_some() {
                warn!(
                    field = %node.field_id(),
                    "duplicate field id in catalog, keeping the last one"
                );
            }
            graph.nodes.insert(node.field_id().clone(), node);
        }

        graph.link_dependents();
        graph.recompute();

        debug!(
            fields = graph.nodes.len(),
            cycles = graph.cycles.len(),
            "built dependency graph"
        );
        graph
    }

    /// Fill every node's `dependents` from the other nodes' dependencies.
    fn link_dependents(&mut self) {
        let edges: Vec<(FieldId, FieldId)> = self
            .nodes
            .values()
            .flat_map(|node| {
                node.dependencies()
                    .iter()
                    .map(move |dep| (dep.clone(), node.field_id().clone()))
            })
            .collect();

        for (dependency, dependent) in edges {
            if let Some(node) = self.nodes.get_mut(&dependency) {
                node.add_dependent(dependent);
            }
        }
    }

    /// Rerun levels, evaluation order and cycle detection.
    fn recompute(&mut self) {
        let sequence = analysis::display_sequence(&self.fields);

        let levels = analysis::compute_levels(&self.nodes, &sequence);
        for (id, node) in self.nodes.iter_mut() {
            node.set_level(levels.get(id).copied().unwrap_or(0));
        }

        self.cycles = analysis::detect_cycles(&self.nodes, &sequence);
        self.evaluation_order = analysis::evaluation_order(&self.fields, &self.nodes);

        for cycle in &self.cycles {
            warn!(cycle = %render_cycle(cycle), "circular field dependency");
        }
        trace!(order = ?self.evaluation_order, "evaluation order recomputed");
    }

    /// Add a new field.
    pub fn add_field(&mut self, field: FieldDescriptor) -> Result<GraphChange, GraphError> {
        if self.nodes.contains_key(&field.id) {
            return Err(GraphError::DuplicateField(field.id));
        }

        let id = field.id.clone();
        let mut node = DependencyNode::from_field(&field);

        for dep in node.dependencies() {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.add_dependent(id.clone());
            }
        }

        // Fields that referenced this id while it was dangling now depend on it.
        for other in self.nodes.values() {
            if other.depends_on(id.as_str()) {
                node.add_dependent(other.field_id().clone());
            }
        }

        let new_dependencies = node.dependencies().clone();
        self.fields.insert(id.clone(), field);
        self.nodes.insert(id.clone(), node);
        self.recompute();

        debug!(field = %id, "added field to dependency graph");
        Ok(GraphChange {
            kind: ChangeKind::Added,
            field_id: id,
            old_dependencies: None,
            new_dependencies: Some(new_dependencies),
            stripped_from: Vec::new(),
        })
    }

    /// Remove a field.
    ///
    /// Conditions in other fields that referenced it are stripped from their
    /// specs, since those references would now dangle.
    pub fn remove_field(&mut self, id: &str) -> Result<GraphChange, GraphError> {
        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| GraphError::FieldNotFound(FieldId::from(id)))?;
        self.fields.shift_remove(id);

        for dep in node.dependencies() {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.remove_dependent(id);
            }
        }

        let mut stripped_from = Vec::new();
        for (field_id, field) in self.fields.iter_mut() {
            let Some(spec) = field.conditional.as_mut() else {
                continue;
            };
            if spec.strip_references_to(id) > 0 {
                if let Some(other) = self.nodes.get_mut(field_id) {
                    other.remove_dependency(id);
                }
                stripped_from.push(field_id.clone());
            }
        }

        self.recompute();

        debug!(field = %id, stripped = stripped_from.len(), "removed field from dependency graph");
        Ok(GraphChange {
            kind: ChangeKind::Removed,
            field_id: node.field_id().clone(),
            old_dependencies: Some(node.dependencies().clone()),
            new_dependencies: None,
            stripped_from,
        })
    }

    /// Replace an existing field's descriptor, patching edges on both sides.
    pub fn update_field(&mut self, field: FieldDescriptor) -> Result<GraphChange, GraphError> {
        let id = field.id.clone();
        let new_dependencies = extract_dependencies(&field);

        let old_dependencies = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::FieldNotFound(id.clone()))?
            .replace_dependencies(new_dependencies.clone());

        for removed in old_dependencies.difference(&new_dependencies) {
            if let Some(dep_node) = self.nodes.get_mut(removed) {
                dep_node.remove_dependent(id.as_str());
            }
        }
        for added in new_dependencies.difference(&old_dependencies) {
            if let Some(dep_node) = self.nodes.get_mut(added) {
                dep_node.add_dependent(id.clone());
            }
        }

        self.fields.insert(id.clone(), field);
        self.recompute();

        debug!(field = %id, "updated field in dependency graph");
        Ok(GraphChange {
            kind: ChangeKind::Updated,
            field_id: id,
            old_dependencies: Some(old_dependencies),
            new_dependencies: Some(new_dependencies),
            stripped_from: Vec::new(),
        })
    }

    /// The catalog as currently held by the graph.
    pub fn fields(&self) -> &IndexMap<FieldId, FieldDescriptor> {
        &self.fields
    }

    /// Fields sorted by display order.
    pub fn fields_in_display_order(&self) -> Vec<&FieldDescriptor> {
        analysis::display_sequence(&self.fields)
            .into_iter()
            .filter_map(|id| self.fields.get(id))
            .collect()
    }

    pub fn field(&self, id: &str) -> Result<&FieldDescriptor, GraphError> {
        self.fields
            .get(id)
            .ok_or_else(|| GraphError::FieldNotFound(FieldId::from(id)))
    }

    pub fn node(&self, id: &str) -> Result<&DependencyNode, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::FieldNotFound(FieldId::from(id)))
    }

    pub fn nodes(&self) -> &IndexMap<FieldId, DependencyNode> {
        &self.nodes
    }

    /// Fields that `id` references ("depends on").
    pub fn dependencies_of(&self, id: &str) -> Result<&IndexSet<FieldId>, GraphError> {
        Ok(self.node(id)?.dependencies())
    }

    /// Fields that reference `id` ("depended on by").
    pub fn dependents_of(&self, id: &str) -> Result<&IndexSet<FieldId>, GraphError> {
        Ok(self.node(id)?.dependents())
    }

    /// Every field whose visibility can change when `id`'s value changes,
    /// directly or through a chain, in evaluation order.
    pub fn transitive_dependents(&self, id: &str) -> Result<Vec<FieldId>, GraphError> {
        let start = self.node(id)?;
        let mut reached: HashSet<&FieldId> = HashSet::new();
        let mut queue: VecDeque<&FieldId> = start.dependents().iter().collect();

        while let Some(current) = queue.pop_front() {
            if !reached.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                queue.extend(node.dependents().iter());
            }
        }

        Ok(self
            .evaluation_order
            .iter()
            .filter(|field| reached.contains(field) && field.as_str() != id)
            .cloned()
            .collect())
    }

    pub fn evaluation_order(&self) -> &[FieldId] {
        &self.evaluation_order
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Every field that appears in at least one reported cycle.
    pub fn cyclic_fields(&self) -> HashSet<&FieldId> {
        self.cycles.iter().flat_map(|cycle| cycle.iter()).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
