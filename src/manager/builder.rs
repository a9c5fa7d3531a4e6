//! Builder for SettingsManager
//!
//! This module contains [`SettingsManagerBuilder`] which provides a fluent API
//! for creating a [`SettingsManager`](super::SettingsManager).

use crate::coercion::CoercionRegistry;
use crate::descriptor::ValueType;
use crate::error::Result;
use crate::provider::StoreProvider;
use crate::subscriptions::Subscriptions;
use serde_json::Value;

use super::SettingsManager;

/// Builder for creating a [`SettingsManager`] with a fluent API.
///
/// Starts from the built-in converters of
/// [`CoercionRegistry::with_defaults`].
///
/// # Example
///
/// ```rust
/// use managed_settings::{MemoryProvider, SettingsManager, ValueType};
/// use serde_json::Value;
///
/// let manager = SettingsManager::builder(MemoryProvider::new())
///     .with_coercion(ValueType::Bool, ValueType::Integer, |v| {
///         Ok(Value::Bool(v.as_i64() != Some(0)))
///     })
///     .build();
///
/// assert!(manager.coercions().can_convert(ValueType::Bool, ValueType::Integer));
/// ```
pub struct SettingsManagerBuilder<P: StoreProvider> {
    provider: P,
    coercions: CoercionRegistry,
}

impl<P: StoreProvider> SettingsManagerBuilder<P> {
    /// Create a new builder over `provider`
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            coercions: CoercionRegistry::with_defaults(),
        }
    }

    /// Replace the coercion registry
    #[must_use]
    pub fn coercions(mut self, registry: CoercionRegistry) -> Self {
        self.coercions = registry;
        self
    }

    /// Start from an empty registry: mismatched persisted values always fail
    #[must_use]
    pub fn without_default_coercions(mut self) -> Self {
        self.coercions = CoercionRegistry::new();
        self
    }

    /// Register one more converter (replacing the same source/target pair)
    #[must_use]
    pub fn with_coercion<F>(mut self, target: ValueType, source: ValueType, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.coercions.register(target, source, convert);
        self
    }

    /// Build the manager
    pub fn build(self) -> SettingsManager<P> {
        log::debug!(
            "Creating settings manager over {} provider",
            self.provider.provider_name()
        );
        SettingsManager {
            provider: self.provider,
            coercions: self.coercions,
            subscriptions: Subscriptions::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let manager = SettingsManagerBuilder::new(MemoryProvider::new()).build();
        assert!(manager.coercions().can_convert(ValueType::Integer, ValueType::String));
    }

    #[test]
    fn test_builder_without_default_coercions() {
        let manager = SettingsManager::builder(MemoryProvider::new())
            .without_default_coercions()
            .with_coercion(ValueType::String, ValueType::Integer, |v| {
                Ok(json!(v.to_string()))
            })
            .build();

        assert!(!manager.coercions().can_convert(ValueType::Integer, ValueType::String));
        assert!(manager.coercions().can_convert(ValueType::String, ValueType::Integer));
    }
}
