//! Graph Analysis
//!
//! Derived data recomputed after every build or edit: node levels, the
//! evaluation order, and the list of cycles.
//!
//! Every pass walks fields in display sequence (`order`, then id), never in
//! map insertion order, so an incrementally edited graph and a fresh build of
//! the same fields produce identical results even when cycles make levels
//! traversal-dependent.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::field::{FieldDescriptor, FieldId};

use super::node::DependencyNode;

/// One cycle, as the chain of field ids that closes on itself: `[a, b, a]`.
pub type Cycle = SmallVec<[FieldId; 4]>;

/// Field ids sorted by display order, id as tie-break.
pub(crate) fn display_sequence(fields: &IndexMap<FieldId, FieldDescriptor>) -> Vec<&FieldId> {
    let mut sequence: Vec<&FieldDescriptor> = fields.values().collect();
    sequence.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    sequence.into_iter().map(|field| &field.id).collect()
}

/// Compute `level(n) = 1 + max(level(d))`, or 0 without dependencies.
///
/// Memoized per call. A node reached again while it is still being resolved
/// contributes 0; cycles are reported separately.
///
/// Recursion depth is bounded by the longest dependency chain.
pub(crate) fn compute_levels(
    nodes: &IndexMap<FieldId, DependencyNode>,
    sequence: &[&FieldId],
) -> HashMap<FieldId, usize> {
    let mut memo = HashMap::with_capacity(nodes.len());
    let mut in_progress = HashSet::new();

    for id in sequence {
        level_of(id, nodes, &mut memo, &mut in_progress);
    }

    memo
}

fn level_of(
    id: &FieldId,
    nodes: &IndexMap<FieldId, DependencyNode>,
    memo: &mut HashMap<FieldId, usize>,
    in_progress: &mut HashSet<FieldId>,
) -> usize {
    if let Some(level) = memo.get(id) {
        return *level;
    }

    // Dangling references sit at level 0.
    let Some(node) = nodes.get(id) else {
        return 0;
    };

    if !in_progress.insert(id.clone()) {
        return 0;
    }

    let level = node
        .dependencies()
        .iter()
        .map(|dep| level_of(dep, nodes, memo, in_progress) + 1)
        .max()
        .unwrap_or(0);

    in_progress.remove(id);
    memo.insert(id.clone(), level);
    level
}

/// Sort every node by `(level, order, id)`.
pub(crate) fn evaluation_order(
    fields: &IndexMap<FieldId, FieldDescriptor>,
    nodes: &IndexMap<FieldId, DependencyNode>,
) -> Vec<FieldId> {
    let mut keyed: Vec<(usize, i64, &FieldId)> = nodes
        .values()
        .map(|node| {
            let order = fields.get(node.field_id()).map_or(0, |f| f.order);
            (node.level(), order, node.field_id())
        })
        .collect();

    keyed.sort();
    keyed.into_iter().map(|(_, _, id)| id.clone()).collect()
}

/// Find cycles with a depth-first search over dependency edges.
///
/// Starts from every unvisited node in `sequence`, so disconnected cycles are
/// all found. Edges to dangling references are skipped. Like `compute_levels`
/// this recurses once per link in the longest dependency chain.
pub(crate) fn detect_cycles(
    nodes: &IndexMap<FieldId, DependencyNode>,
    sequence: &[&FieldId],
) -> Vec<Cycle> {
    let mut search = CycleSearch {
        nodes,
        visited: HashSet::with_capacity(nodes.len()),
        on_stack: HashSet::new(),
        path: Vec::new(),
        cycles: Vec::new(),
    };

    for id in sequence {
        if !search.visited.contains(*id) {
            search.visit(id);
        }
    }

    search.cycles
}

struct CycleSearch<'a> {
    nodes: &'a IndexMap<FieldId, DependencyNode>,
    visited: HashSet<&'a FieldId>,
    on_stack: HashSet<&'a FieldId>,
    path: Vec<&'a FieldId>,
    cycles: Vec<Cycle>,
}

impl<'a> CycleSearch<'a> {
    fn visit(&mut self, id: &'a FieldId) {
        let nodes = self.nodes;
        let Some(node) = nodes.get(id) else {
            return;
        };

        self.visited.insert(id);
        self.on_stack.insert(id);
        self.path.push(id);

        for dep in node.dependencies() {
            // Dangling references have no node to walk into.
            let Some((dep, _)) = nodes.get_key_value(dep) else {
                continue;
            };

            if self.on_stack.contains(dep) {
                if let Some(start) = self.path.iter().position(|p| *p == dep) {
                    let mut cycle: Cycle =
                        self.path[start..].iter().map(|p| (*p).clone()).collect();
                    cycle.push(dep.clone());
                    self.cycles.push(cycle);
                }
            } else if !self.visited.contains(dep) {
                self.visit(dep);
            }
        }

        self.path.pop();
        self.on_stack.remove(id);
    }
}

/// Render a cycle as `a -> b -> a`.
pub fn render_cycle(cycle: &[FieldId]) -> String {
    cycle
        .iter()
        .map(FieldId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
