//! Reactive Visibility
//!
//! This module implements the live side of a form session: a controller that
//! recomputes visibility on every change, and a store that keeps submission
//! values consistent with it.
//!
//! # Concepts
//!
//! ## Controller
//!
//! A [`VisibilityController`] owns the value snapshot and the dependency
//! graph. Every value change or catalog edit triggers a synchronous pass over
//! the full evaluation order, after which listeners receive the new map.
//!
//! ## Listeners
//!
//! Listeners are plain callbacks registered with `on_visibility_change`.
//! They are called in registration order, once per pass.
//!
//! ## Answer store
//!
//! An [`AnswerStore`] is the value-owning layer: it listens to its controller
//! and deletes answers of fields that became hidden.
//!
//! # Implementation Notes
//!
//! Everything runs on the caller's thread and completes before the triggering
//! call returns. There is no scheduling, batching across calls, or
//! background work.

mod answers;
mod controller;
mod state;
mod subscriber;

pub use answers::AnswerStore;
pub use controller::VisibilityController;
pub use state::{VisibilityMap, VisibilityState};
pub use subscriber::{Subscriber, SubscriberId, Subscribers};
