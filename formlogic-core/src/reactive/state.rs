//! Visibility state owned by a controller.

use std::time::SystemTime;

use indexmap::IndexMap;

use crate::field::FieldId;

/// Visibility of every field, keyed by id in evaluation order.
pub type VisibilityMap = IndexMap<FieldId, bool>;

/// The current visibility map and when it was last written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityState {
    map: VisibilityMap,
    last_updated_at: Option<SystemTime>,
}

impl VisibilityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self) -> &VisibilityMap {
        &self.map
    }

    /// `None` until the first pass.
    pub fn last_updated_at(&self) -> Option<SystemTime> {
        self.last_updated_at
    }

    /// Unknown fields are visible.
    pub fn is_visible(&self, id: &str) -> bool {
        self.map.get(id).copied().unwrap_or(true)
    }

    /// Replace the map. Returns whether any entry changed.
    pub fn replace(&mut self, map: VisibilityMap) -> bool {
        let changed = map != self.map;
        self.map = map;
        self.last_updated_at = Some(SystemTime::now());
        changed
    }

    /// Mark every known field visible.
    pub fn show_all(&mut self) {
        for visible in self.map.values_mut() {
            *visible = true;
        }
        self.last_updated_at = Some(SystemTime::now());
    }
}
