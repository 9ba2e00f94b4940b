//! Dependency Graph
//!
//! This module tracks which fields' conditional logic references which other
//! fields, and derives from that a safe order in which to evaluate them.
//!
//! # Overview
//!
//! The dependency graph is a directed graph where:
//!
//! - Nodes represent form fields
//! - Edges represent references: if B's conditions read A's value, A is a
//!   dependency of B and B is a dependent of A
//!
//! Each node gets a level (longest dependency chain ending at it). Sorting by
//! level, then display order, yields the evaluation order. Cycles are allowed
//! to exist transiently while the editor is mid-edit: they are detected and
//! reported, never prevented at insertion time.
//!
//! # Design Decisions
//!
//! 1. Nodes are keyed by field id, and edges are stored as id sets on both
//!    ends (dependencies and dependents). Cycles are representable without
//!    any shared ownership between nodes.
//!
//! 2. Incremental edits patch edges and rerun the analysis passes, so their
//!    result never drifts from a full rebuild.
//!
//! 3. An unknown field id passed to an accessor is a programmer error and
//!    returns [`GraphError::FieldNotFound`](crate::error::GraphError).

mod analysis;
mod dependency;
mod node;
mod validation;

pub use analysis::{render_cycle, Cycle};
pub use dependency::{ChangeKind, DependencyGraph, GraphChange};
pub use node::{extract_dependencies, DependencyNode};
pub use validation::{ValidationIssue, ValidationReport};
