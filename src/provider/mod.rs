//! Store providers
//!
//! A provider is the raw key-value backend behind a settings store:
//! - **Memory**: in-process map, for tests and ephemeral settings
//! - **File**: one named section of a settings file, flushed on every save

mod file;
mod memory;

pub use file::{FileProvider, FileProviderBuilder};
pub use memory::MemoryProvider;

use crate::descriptor::PropertyDescriptor;
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Canonical setting key of a property: `"<owner>.<name>"`
pub fn default_setting_key(descriptor: &PropertyDescriptor) -> String {
    descriptor.qualified_name()
}

/// Trait for raw key-value persistence backends
///
/// Every call is synchronous: `save` must be durable before it returns.
pub trait StoreProvider: Send + Sync {
    /// Derive the storage key of a property
    ///
    /// Must be deterministic: equal owner and name give equal keys.
    fn setting_key(&self, descriptor: &PropertyDescriptor) -> String {
        default_setting_key(descriptor)
    }

    /// Check whether an entry exists for `key`
    fn contains(&self, key: &str) -> bool;

    /// Read the raw value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `SettingNotFound` if there is no entry for `key`.
    fn read(&self, key: &str) -> Result<Value>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the value cannot be persisted.
    fn save(&self, key: &str, value: Value) -> Result<()>;

    /// Provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}

impl<P: StoreProvider + ?Sized> StoreProvider for Arc<P> {
    fn setting_key(&self, descriptor: &PropertyDescriptor) -> String {
        (**self).setting_key(descriptor)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn read(&self, key: &str) -> Result<Value> {
        (**self).read(key)
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        (**self).save(key, value)
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}
