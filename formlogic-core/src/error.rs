//! Error types.
//!
//! Evaluation never fails: missing references, cycles and unanswered fields
//! all degrade to a visibility decision plus a reason. The only hard errors
//! are programmer errors against the dependency graph.

use thiserror::Error;

use crate::field::FieldId;

/// Errors raised by dependency graph accessors and incremental edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("field '{0}' not found in graph")]
    FieldNotFound(FieldId),

    #[error("field '{0}' is already part of the graph")]
    DuplicateField(FieldId),
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
