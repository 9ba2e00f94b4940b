//! Field Catalog Model
//!
//! This module defines how a form field looks from the point of view of the
//! visibility engine. The surrounding editor owns the catalog; the engine only
//! reads it.
//!
//! # Overview
//!
//! - A [`FieldDescriptor`] is one field: a stable id, a display order, and an
//!   optional [`ConditionalSpec`].
//! - A [`ConditionalSpec`] is the show/hide rule: a polarity flag, a
//!   [`Combinator`], and a list of [`Condition`]s.
//! - Field values are plain JSON values (`serde_json::Value`), so scalars,
//!   booleans and multi-select arrays all travel the same way.

mod condition;

pub use condition::{Combinator, Condition, ConditionalSpec, Operator};

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Create a field id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FieldId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Snapshot of the values entered so far, keyed by field id.
///
/// A missing key and an explicit `Value::Null` both mean "unanswered".
pub type FieldValues = IndexMap<FieldId, Value>;

/// One form field as seen by the visibility engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: FieldId,

    /// Display order. Breaks ties in the evaluation order.
    #[serde(default)]
    pub order: i64,

    /// Editor-level field type (e.g. `"multi_select"`). Never interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalSpec>,
}

impl FieldDescriptor {
    /// Create an unconditional field.
    pub fn new(id: impl Into<FieldId>, order: i64) -> Self {
        Self {
            id: id.into(),
            order,
            field_type: None,
            conditional: None,
        }
    }

    /// Attach a conditional-logic spec.
    pub fn with_conditional(mut self, spec: ConditionalSpec) -> Self {
        self.conditional = Some(spec);
        self
    }

    /// Set the editor-level field type.
    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Ids referenced by this field's conditions, in condition order.
    ///
    /// May contain duplicates and self-references; the graph strips those.
    pub fn referenced_fields(&self) -> impl Iterator<Item = &FieldId> {
        self.conditional
            .iter()
            .flat_map(|spec| spec.conditions.iter())
            .map(|condition| &condition.referenced_field_id)
    }
}

/// Read access to the set of fields known to the form.
///
/// The rule evaluator only needs to know whether a referenced field exists.
pub trait FieldCatalog {
    fn contains_field(&self, id: &str) -> bool;
}

impl FieldCatalog for [FieldDescriptor] {
    fn contains_field(&self, id: &str) -> bool {
        self.iter().any(|field| field.id.as_str() == id)
    }
}

impl FieldCatalog for Vec<FieldDescriptor> {
    fn contains_field(&self, id: &str) -> bool {
        self.as_slice().contains_field(id)
    }
}

impl FieldCatalog for IndexMap<FieldId, FieldDescriptor> {
    fn contains_field(&self, id: &str) -> bool {
        self.contains_key(id)
    }
}
