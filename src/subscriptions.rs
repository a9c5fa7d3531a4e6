//! Subscriptions for settings changes
//!
//! Each managed property has at most one subscriber. A second registration
//! fails instead of replacing or queueing the first.

use crate::descriptor::PropertyId;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Type alias for a subscriber callback, receiving the new value
pub type SubscriberCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Single-subscriber-per-property callback registry
#[derive(Default)]
pub struct Subscriptions {
    callbacks: RwLock<HashMap<PropertyId, SubscriberCallback>>,
}

impl Subscriptions {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the subscriber of a property
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSubscription` if the property already has one; the
    /// existing subscriber stays registered.
    pub fn subscribe(&self, id: &PropertyId, callback: SubscriberCallback) -> Result<()> {
        let mut callbacks = self.callbacks.write();
        if callbacks.contains_key(id) {
            return Err(Error::DuplicateSubscription(id.to_string()));
        }
        callbacks.insert(id.clone(), callback);
        Ok(())
    }

    /// The subscriber of a property, if any
    pub fn get(&self, id: &PropertyId) -> Option<SubscriberCallback> {
        self.callbacks.read().get(id).cloned()
    }

    /// Invoke the subscriber of a property with `value`
    ///
    /// The lock is released before the callback runs, so the callback may
    /// use the store again. Returns whether a subscriber was called.
    pub fn notify(&self, id: &PropertyId, value: &Value) -> bool {
        match self.get(id) {
            Some(callback) => {
                callback(value);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &PropertyId) -> bool {
        self.callbacks.read().contains_key(id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.callbacks.read().len()
    }
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<String> = self.callbacks.read().keys().map(ToString::to_string).collect();
        ids.sort();
        f.debug_struct("Subscriptions").field("bound", &ids).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
