//! Answer Store
//!
//! Owns the values a respondent has entered and keeps them consistent with
//! visibility: when a field flips from visible to hidden, its answer is
//! deleted, so a question the respondent never saw cannot leak into the
//! submission. A field that later becomes visible again starts unanswered.
//!
//! # How It Works
//!
//! The store registers a listener on its controller. The listener diffs each
//! new visibility map against the last one it saw and deletes answers of
//! fields that became hidden. Deleted answers are then cleared from the
//! controller's snapshot too, which may hide further fields; the store
//! repeats until nothing else is cleared. Answers only ever shrink during
//! this loop, so it terminates.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::field::{FieldDescriptor, FieldId, FieldValues};

use super::controller::VisibilityController;
use super::state::VisibilityMap;
use super::subscriber::SubscriberId;

#[derive(Debug, Default)]
struct AnswerLedger {
    answers: FieldValues,
    last_seen: VisibilityMap,
    /// Answers deleted by the listener that the controller still holds.
    pending: Vec<FieldId>,
    clear_hidden: bool,
}

impl AnswerLedger {
    fn observe(&mut self, map: &VisibilityMap) {
        for (id, visible) in map {
            let was_visible = self.last_seen.get(id).copied().unwrap_or(true);
            if !was_visible || *visible || !self.clear_hidden {
                continue;
            }
            if self.answers.shift_remove(id).is_some() {
                debug!(field = %id, "cleared answer of hidden field");
            }
            // The controller may hold a value the ledger never saw.
            self.pending.push(id.clone());
        }

        // Fields gone from the catalog take their answers with them.
        let removed: Vec<FieldId> = self
            .last_seen
            .keys()
            .filter(|id| !map.contains_key(*id))
            .cloned()
            .collect();
        for id in removed {
            self.answers.shift_remove(&id);
        }

        self.last_seen = map.clone();
    }
}

/// Submission values kept in step with a [`VisibilityController`].
#[derive(Debug)]
pub struct AnswerStore {
    controller: VisibilityController,
    ledger: Arc<Mutex<AnswerLedger>>,
    subscription: SubscriberId,
}

impl AnswerStore {
    pub fn new<I>(fields: I, initial_values: FieldValues) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        Self::with_config(fields, initial_values, EngineConfig::default())
    }

    pub fn with_config<I>(fields: I, initial_values: FieldValues, config: EngineConfig) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let ledger = Arc::new(Mutex::new(AnswerLedger {
            answers: initial_values
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
            last_seen: VisibilityMap::new(),
            pending: Vec::new(),
            clear_hidden: config.clear_hidden_values,
        }));

        let mut controller = VisibilityController::with_config(fields, initial_values, config);

        let listener_ledger = Arc::clone(&ledger);
        let subscription = controller.on_visibility_change(move |map| {
            listener_ledger.lock().observe(map);
        });

        // Initial values for fields that start hidden are dropped as well.
        ledger.lock().observe(controller.visibility_map());

        let mut store = Self {
            controller,
            ledger,
            subscription,
        };
        store.settle();
        store
    }

    /// Record an answer and re-evaluate. `Value::Null` clears it.
    pub fn set_answer(&mut self, id: impl Into<FieldId>, value: Value) {
        let id = id.into();
        {
            let mut ledger = self.ledger.lock();
            if value.is_null() {
                ledger.answers.shift_remove(&id);
            } else {
                ledger.answers.insert(id.clone(), value.clone());
            }
        }
        self.controller.set_field_value(id, value);
        self.settle();
    }

    /// Apply a catalog edit (or any other controller operation), then
    /// clear answers of fields it hid.
    pub fn edit<F, R>(&mut self, edit: F) -> R
    where
        F: FnOnce(&mut VisibilityController) -> R,
    {
        let result = edit(&mut self.controller);
        self.settle();
        result
    }

    /// Push deleted answers into the controller until nothing else hides.
    fn settle(&mut self) {
        loop {
            let pending = std::mem::take(&mut self.ledger.lock().pending);
            if pending.is_empty() {
                break;
            }
            self.controller.clear_field_values(&pending);
        }
    }

    pub fn answer(&self, id: &str) -> Option<Value> {
        self.ledger.lock().answers.get(id).cloned()
    }

    /// Every stored answer.
    pub fn answers(&self) -> FieldValues {
        self.ledger.lock().answers.clone()
    }

    /// Answers of currently visible fields; what gets submitted.
    pub fn visible_answers(&self) -> FieldValues {
        self.ledger
            .lock()
            .answers
            .iter()
            .filter(|(id, _)| self.controller.visibility(id.as_str()))
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect()
    }

    pub fn controller(&self) -> &VisibilityController {
        &self.controller
    }

    /// The controller subscription that feeds this store.
    pub fn subscription(&self) -> SubscriberId {
        self.subscription
    }
}
