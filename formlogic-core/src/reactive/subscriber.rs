//! Subscriber types for visibility notifications.
//!
//! A Subscriber is any callback registered through
//! [`on_visibility_change`](super::VisibilityController::on_visibility_change).
//! It receives the full visibility map after every evaluation pass.

use std::sync::atomic::{AtomicU64, Ordering};

use super::state::VisibilityMap;

/// Unique identifier for a subscriber.
///
/// Returned on registration and used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across sessions.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered visibility listener.
pub struct Subscriber {
    id: SubscriberId,
    /// Invoked with the updated visibility map.
    notify: Box<dyn Fn(&VisibilityMap) + Send + Sync>,
}

impl Subscriber {
    /// Create a new subscriber with the given notification callback.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn(&VisibilityMap) + Send + Sync + 'static,
    {
        Self {
            id: SubscriberId::new(),
            notify: Box::new(notify),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Deliver an updated visibility map.
    pub fn notify(&self, map: &VisibilityMap) {
        (self.notify)(map);
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}

/// Subscribers in registration order.
#[derive(Debug, Default)]
pub struct Subscribers {
    entries: Vec<Subscriber>,
}

impl Subscribers {
    pub fn add(&mut self, subscriber: Subscriber) -> SubscriberId {
        let id = subscriber.id();
        self.entries.push(subscriber);
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id() != id);
        self.entries.len() != before
    }

    pub fn notify_all(&self, map: &VisibilityMap) {
        for subscriber in &self.entries {
            subscriber.notify(map);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
