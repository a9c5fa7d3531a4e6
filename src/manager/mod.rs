//! Settings store
//!
//! This module contains the [`SettingsStore`] trait (the seam interceptors
//! depend on) and [`SettingsManager`], its provider-backed implementation
//! which owns the read/save/bind algorithm.

mod builder;
mod expression;

pub use builder::SettingsManagerBuilder;
pub use expression::PropertyExpression;

use crate::coercion::CoercionRegistry;
use crate::descriptor::{PropertyDescriptor, ValueType};
use crate::error::{Error, Result};
use crate::provider::StoreProvider;
use crate::subscriptions::Subscriptions;
use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

/// Read/save operations of a settings store
pub trait SettingsStore: Send + Sync {
    /// Effective value of a managed property
    ///
    /// # Errors
    ///
    /// Returns `NotManaged`, `TypeMismatch`, a conversion error, or the
    /// provider's error.
    fn read(&self, descriptor: &PropertyDescriptor) -> Result<Value>;

    /// Notify the subscriber of a managed property, then persist `value`
    ///
    /// # Errors
    ///
    /// Returns `NotManaged` or the provider's error.
    fn save(&self, descriptor: &PropertyDescriptor, value: Value) -> Result<()>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn read(&self, descriptor: &PropertyDescriptor) -> Result<Value> {
        (**self).read(descriptor)
    }

    fn save(&self, descriptor: &PropertyDescriptor, value: Value) -> Result<()> {
        (**self).save(descriptor, value)
    }
}

/// Provider-backed settings store
///
/// The single source of truth for the effective value of managed
/// properties: it combines persisted data, declared defaults, coercion and
/// change notification.
///
/// # Example
///
/// ```rust
/// use managed_settings::{MemoryProvider, PropertyDescriptor, SettingsManager, ValueType};
/// use serde_json::json;
/// use std::sync::{Arc, Mutex};
///
/// let manager = SettingsManager::new(MemoryProvider::new());
/// let setting = PropertyDescriptor::new("app::Model", "setting", ValueType::String)
///     .managed()
///     .default_value("default");
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let log = seen.clone();
/// manager.bind(&setting, move |value| log.lock().unwrap().push(value.clone()))?;
///
/// manager.save(&setting, json!("new value"))?;
/// assert_eq!(manager.read(&setting)?, json!("new value"));
/// assert_eq!(*seen.lock().unwrap(), vec![json!("default"), json!("new value")]);
/// # Ok::<(), managed_settings::Error>(())
/// ```
pub struct SettingsManager<P: StoreProvider> {
    provider: P,
    coercions: CoercionRegistry,
    subscriptions: Subscriptions,
}

impl<P: StoreProvider> SettingsManager<P> {
    /// Create a manager with the default coercion registry
    pub fn new(provider: P) -> Self {
        Self::builder(provider).build()
    }

    /// Create a builder for a manager over `provider`
    pub fn builder(provider: P) -> SettingsManagerBuilder<P> {
        SettingsManagerBuilder::new(provider)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }

    /// Effective value of a managed property
    ///
    /// Persisted data wins over the declared default, even when it is null.
    /// A persisted value whose type differs from the declared type goes
    /// through the coercion registry; a default is only checked, never
    /// converted. Without either, non-nullable value kinds read as their
    /// zero value and everything else as null.
    ///
    /// # Errors
    ///
    /// - `NotManaged` if the descriptor is not managed
    /// - `TypeMismatch` if no converter exists for a persisted value, or the
    ///   default does not match the declared type
    /// - the converter's or provider's error otherwise
    pub fn read(&self, descriptor: &PropertyDescriptor) -> Result<Value> {
        ensure_managed(descriptor)?;

        let key = self.provider.setting_key(descriptor);
        let declared = descriptor.value_type();

        if self.provider.contains(&key) {
            let raw = self.provider.read(&key)?;
            if declared.accepts(&raw) {
                debug!("Read '{key}' from {}", self.provider.provider_name());
                return Ok(raw);
            }
            let converted = self
                .coercions
                .convert(declared, &raw)?
                .ok_or_else(|| type_mismatch(&key, declared, &raw))?;
            if !declared.accepts(&converted) {
                return Err(type_mismatch(&key, declared, &converted));
            }
            debug!(
                "Read '{key}' from {} ({} -> {declared})",
                self.provider.provider_name(),
                ValueType::name_of(&raw)
            );
            return Ok(converted);
        }

        if let Some(default) = descriptor.default() {
            if !declared.accepts(default) {
                return Err(type_mismatch(&key, declared, default));
            }
            return Ok(default.clone());
        }

        if descriptor.is_nullable() {
            return Ok(Value::Null);
        }
        Ok(declared.zero_value())
    }

    /// Notify the subscriber (if any) with `value`, then persist it
    ///
    /// The subscriber runs before the provider is called, so it observes the
    /// previous persisted state.
    ///
    /// # Errors
    ///
    /// Returns `NotManaged` if the descriptor is not managed; provider
    /// failures propagate unchanged.
    pub fn save(&self, descriptor: &PropertyDescriptor, value: Value) -> Result<()> {
        ensure_managed(descriptor)?;

        self.subscriptions.notify(descriptor.id(), &value);

        let key = self.provider.setting_key(descriptor);
        self.provider.save(&key, value)?;
        debug!("Saved '{key}' to {}", self.provider.provider_name());
        Ok(())
    }

    /// Subscribe to a managed property
    ///
    /// `callback` runs once immediately with the current value, then on
    /// every save. Only one subscriber per property is allowed.
    ///
    /// # Errors
    ///
    /// Returns any error of [`read`](Self::read), or `DuplicateSubscription`
    /// if the property is already bound (the first subscriber stays active).
    pub fn bind<F>(&self, descriptor: &PropertyDescriptor, callback: F) -> Result<()>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let current = self.read(descriptor)?;
        callback(&current);
        self.subscriptions
            .subscribe(descriptor.id(), Arc::new(callback))?;
        debug!("Bound subscriber to '{}'", descriptor.qualified_name());
        Ok(())
    }

    /// Whether a property has a subscriber
    pub fn is_bound(&self, descriptor: &PropertyDescriptor) -> bool {
        self.subscriptions.contains(descriptor.id())
    }

    /// [`read`](Self::read) deserialized into `T`
    ///
    /// # Errors
    ///
    /// Returns any error of `read`, or `Serialize` if the value does not fit `T`.
    pub fn read_as<T: DeserializeOwned>(&self, descriptor: &PropertyDescriptor) -> Result<T> {
        serde_json::from_value(self.read(descriptor)?).map_err(Error::from)
    }

    /// [`save`](Self::save) a serializable value
    ///
    /// # Errors
    ///
    /// Returns any error of `save`, or `Serialize` if `value` cannot be serialized.
    pub fn save_as<T: Serialize>(&self, descriptor: &PropertyDescriptor, value: &T) -> Result<()> {
        self.save(descriptor, serde_json::to_value(value)?)
    }
}

impl<P: StoreProvider> SettingsStore for SettingsManager<P> {
    fn read(&self, descriptor: &PropertyDescriptor) -> Result<Value> {
        SettingsManager::read(self, descriptor)
    }

    fn save(&self, descriptor: &PropertyDescriptor, value: Value) -> Result<()> {
        SettingsManager::save(self, descriptor, value)
    }
}

impl<P: StoreProvider> std::fmt::Debug for SettingsManager<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("provider", &self.provider.provider_name())
            .field("coercions", &self.coercions)
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

fn ensure_managed(descriptor: &PropertyDescriptor) -> Result<()> {
    if descriptor.is_managed() {
        Ok(())
    } else {
        Err(Error::NotManaged(descriptor.qualified_name()))
    }
}

fn type_mismatch(key: &str, expected: ValueType, actual: &Value) -> Error {
    Error::TypeMismatch {
        key: key.to_string(),
        expected: expected.name().to_string(),
        actual: ValueType::name_of(actual).to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
