//! Conditional Rules
//!
//! The rule evaluator turns a field's [`ConditionalSpec`](crate::field::ConditionalSpec)
//! and a snapshot of the form's values into an [`EvaluationResult`].
//!
//! # Polarity
//!
//! The final decision is `matched ? show_when_matched : !show_when_matched`.
//! A spec with `show_when_matched = false` is an inverted gate: matching
//! conditions hide the field, failing conditions show it.

mod evaluator;
mod value;

pub use evaluator::{evaluate, EvaluationResult, REASON_NO_CONDITIONS};
pub use value::Normalized;
