//! Visibility Controller
//!
//! The controller is the reactive layer of a form session. It owns the
//! current value snapshot and one dependency graph, and recomputes visibility
//! for the whole form whenever a value or the catalog changes.
//!
//! # How It Works
//!
//! 1. A value changes through `set_field_value`.
//!
//! 2. The controller walks the graph's full evaluation order and runs the
//!    rule evaluator for each field against the current snapshot. Only
//!    referenced *values* feed a field's decision; whether a dependency is
//!    itself visible does not gate it.
//!
//! 3. The new map replaces the old state and every subscriber is called with
//!    it, synchronously, before `set_field_value` returns.
//!
//! The controller never deletes values on its own. Clearing the answer of a
//! field that became hidden is the job of the layer that owns submission
//! values (see [`AnswerStore`](super::AnswerStore)).

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::{CyclicFieldPolicy, EngineConfig};
use crate::error::GraphError;
use crate::field::{FieldDescriptor, FieldId, FieldValues};
use crate::graph::{DependencyGraph, GraphChange, ValidationReport};
use crate::rules::{evaluate, EvaluationResult};

use super::state::{VisibilityMap, VisibilityState};
use super::subscriber::{Subscriber, SubscriberId, Subscribers};

/// A stateful visibility session over one form.
#[derive(Debug)]
pub struct VisibilityController {
    graph: DependencyGraph,
    values: FieldValues,
    state: VisibilityState,
    results: IndexMap<FieldId, EvaluationResult>,
    subscribers: Subscribers,
    config: EngineConfig,
    passes: u64,
}

impl VisibilityController {
    /// Start a session with the default configuration.
    pub fn new<I>(fields: I, initial_values: FieldValues) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        Self::with_config(fields, initial_values, EngineConfig::default())
    }

    /// Start a session and run the first evaluation pass.
    pub fn with_config<I>(fields: I, initial_values: FieldValues, config: EngineConfig) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let mut controller = Self {
            graph: DependencyGraph::build(fields),
            values: initial_values,
            state: VisibilityState::new(),
            results: IndexMap::new(),
            subscribers: Subscribers::default(),
            config,
            passes: 0,
        };
        controller.values.retain(|_, value| !value.is_null());
        controller.recompute();
        controller
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The value snapshot used for evaluation.
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Update one value and re-evaluate. `Value::Null` clears the field.
    pub fn set_field_value(&mut self, id: impl Into<FieldId>, value: Value) {
        let id = id.into();
        trace!(field = %id, "field value changed");
        self.store_value(id, value);
        self.recompute();
    }

    /// Update several values, then re-evaluate once.
    pub fn set_field_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (FieldId, Value)>,
    {
        for (id, value) in values {
            self.store_value(id, value);
        }
        self.recompute();
    }

    /// Drop the given fields' values, then re-evaluate once.
    pub fn clear_field_values(&mut self, ids: &[FieldId]) {
        for id in ids {
            self.values.shift_remove(id);
        }
        self.recompute();
    }

    fn store_value(&mut self, id: FieldId, value: Value) {
        if value.is_null() {
            self.values.shift_remove(&id);
        } else {
            self.values.insert(id, value);
        }
    }

    /// Visibility of a field. Unknown fields are visible.
    pub fn visibility(&self, id: &str) -> bool {
        self.state.is_visible(id)
    }

    pub fn visibility_map(&self) -> &VisibilityMap {
        self.state.map()
    }

    pub fn state(&self) -> &VisibilityState {
        &self.state
    }

    /// The last evaluation result for a field, with reasons when hidden.
    pub fn evaluation_result(&self, id: &str) -> Option<&EvaluationResult> {
        self.results.get(id)
    }

    /// Visible fields in display order.
    pub fn visible_fields(&self) -> Vec<&FieldDescriptor> {
        self.graph
            .fields_in_display_order()
            .into_iter()
            .filter(|field| self.visibility(field.id.as_str()))
            .collect()
    }

    /// Hidden fields in display order.
    pub fn hidden_fields(&self) -> Vec<&FieldDescriptor> {
        self.graph
            .fields_in_display_order()
            .into_iter()
            .filter(|field| !self.visibility(field.id.as_str()))
            .collect()
    }

    /// Show every field and forget recorded reasons. Values are kept.
    pub fn reset(&mut self) {
        self.state.show_all();
        self.results.clear();
        debug!("visibility session reset");
        self.subscribers.notify_all(self.state.map());
    }

    /// Register a callback fired with the full map after every pass.
    pub fn on_visibility_change<F>(&mut self, callback: F) -> SubscriberId
    where
        F: Fn(&VisibilityMap) + Send + Sync + 'static,
    {
        self.subscribers.add(Subscriber::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(id)
    }

    /// Add a field to the catalog and re-evaluate.
    pub fn add_field(&mut self, field: FieldDescriptor) -> Result<GraphChange, GraphError> {
        let change = self.graph.add_field(field)?;
        self.recompute();
        Ok(change)
    }

    /// Replace a field's descriptor and re-evaluate.
    pub fn update_field(&mut self, field: FieldDescriptor) -> Result<GraphChange, GraphError> {
        let change = self.graph.update_field(field)?;
        self.recompute();
        Ok(change)
    }

    /// Remove a field, drop its value, and re-evaluate.
    pub fn remove_field(&mut self, id: &str) -> Result<GraphChange, GraphError> {
        let change = self.graph.remove_field(id)?;
        self.values.shift_remove(id);
        self.results.shift_remove(id);
        self.recompute();
        Ok(change)
    }

    /// Rebuild the graph from a fresh catalog and re-evaluate.
    ///
    /// Values of fields missing from the new catalog are dropped, as with
    /// `remove_field`.
    pub fn replace_fields<I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        self.graph = DependencyGraph::build(fields);
        let catalog = self.graph.fields();
        self.values.retain(|id, _| catalog.contains_key(id));
        self.results.retain(|id, _| catalog.contains_key(id));
        self.recompute();
    }

    pub fn validate(&self) -> ValidationReport {
        self.graph.validate()
    }

    /// Number of evaluation passes run so far.
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    /// Run a full evaluation pass and notify subscribers.
    pub fn recompute(&mut self) {
        let cyclic = match self.config.cyclic_field_policy {
            CyclicFieldPolicy::AlwaysVisible => self.graph.cyclic_fields(),
            CyclicFieldPolicy::Evaluate => Default::default(),
        };

        let order = self.graph.evaluation_order();
        let mut map = VisibilityMap::with_capacity(order.len());
        let mut results = IndexMap::with_capacity(order.len());

        for id in order {
            let result = if cyclic.contains(&id) {
                EvaluationResult::visible()
            } else {
                let spec = self
                    .graph
                    .fields()
                    .get(id)
                    .and_then(|field| field.conditional.as_ref());
                evaluate(spec, &self.values, self.graph.fields())
            };

            map.insert(id.clone(), result.visible);
            results.insert(id.clone(), result);
        }

        let hidden = map.values().filter(|visible| !**visible).count();
        let changed = self.state.replace(map);
        self.results = results;
        self.passes += 1;

        debug!(
            pass = self.passes,
            fields = self.results.len(),
            hidden,
            changed,
            "visibility pass complete"
        );

        if changed || self.config.notify_unchanged {
            self.subscribers.notify_all(self.state.map());
        }
    }
}
