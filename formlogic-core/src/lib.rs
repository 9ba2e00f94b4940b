//! Formlogic Core
//!
//! This crate provides the conditional field-visibility engine for the
//! Formlogic conversational-form builder. It implements:
//!
//! - A rule evaluator for per-field show/hide logic
//! - A dependency graph among fields, with a safe evaluation order and cycle
//!   detection
//! - A reactive controller that recomputes visibility on every change
//! - An answer store that drops answers of fields that become hidden
//!
//! The editor, renderer and persistence layers live outside this crate. They
//! hand in a field catalog and value changes, and read back visibility maps
//! and human-readable reasons.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `field`: The catalog model (fields, conditional specs, conditions)
//! - `rules`: The pure rule evaluator
//! - `graph`: Dependency graph, evaluation order, validation
//! - `reactive`: Visibility controller, listeners, answer store
//! - `config`: Session configuration
//!
//! # Example
//!
//! ```rust
//! use formlogic_core::field::{Condition, ConditionalSpec, FieldDescriptor, FieldValues};
//! use formlogic_core::reactive::VisibilityController;
//! use serde_json::json;
//!
//! let fields = vec![
//!     FieldDescriptor::new("subscribe", 0),
//!     FieldDescriptor::new("email", 1).with_conditional(ConditionalSpec::show_when_all(vec![
//!         Condition::equals("subscribe", "yes"),
//!     ])),
//! ];
//!
//! let mut session = VisibilityController::new(fields, FieldValues::new());
//! assert!(!session.visibility("email"));
//!
//! session.set_field_value("subscribe", json!("yes"));
//! assert!(session.visibility("email"));
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod graph;
pub mod reactive;
pub mod rules;

pub use config::{CyclicFieldPolicy, EngineConfig};
pub use error::{ConfigError, GraphError};
pub use field::{
    Combinator, Condition, ConditionalSpec, FieldCatalog, FieldDescriptor, FieldId, FieldValues,
    Operator,
};
pub use graph::{DependencyGraph, GraphChange, ValidationIssue, ValidationReport};
pub use reactive::{AnswerStore, VisibilityController, VisibilityMap};
pub use rules::{evaluate, EvaluationResult};
