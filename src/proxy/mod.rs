//! Settings proxies
//!
//! A [`SettingsProxy`] wraps a [`Managed`] value and routes every property
//! access through a [`SettingsInterceptor`]. Proxies are only handed out by
//! [`SettingsFactory`], after the wrapped type passed validation.

mod factory;

pub use factory::{SettingsFactory, validate, validate_table};

use crate::descriptor::Managed;
use crate::error::Result;
use crate::interceptor::SettingsInterceptor;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A managed value whose property accesses go through the settings store
///
/// Managed properties read from and save to the store; other properties
/// are forwarded to the wrapped value.
///
/// With the `derive` feature the generated `<Type>Properties` trait is also
/// implemented for `SettingsProxy<Type>`, so the proxy offers the same typed
/// getters and setters as the plain type.
pub struct SettingsProxy<T: Managed> {
    inner: T,
    interceptor: SettingsInterceptor,
}

impl<T: Managed> SettingsProxy<T> {
    pub(crate) fn new(inner: T, interceptor: SettingsInterceptor) -> Self {
        Self { inner, interceptor }
    }

    /// Read a property by name
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` for a name `T` does not declare, otherwise
    /// the store's or accessor's error.
    pub fn get(&self, property: &str) -> Result<Value> {
        self.interceptor.read(&self.inner, property)
    }

    /// Write a property by name
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` for a name `T` does not declare, otherwise
    /// the store's or accessor's error.
    pub fn set(&mut self, property: &str, value: Value) -> Result<()> {
        self.interceptor.write(&mut self.inner, property, value)
    }

    /// [`get`](Self::get) deserialized into `V`
    ///
    /// # Errors
    ///
    /// Returns any error of `get`, or `Serialize` if the value does not fit `V`.
    pub fn get_as<V: DeserializeOwned>(&self, property: &str) -> Result<V> {
        Ok(serde_json::from_value(self.get(property)?)?)
    }

    /// [`set`](Self::set) a serializable value
    ///
    /// # Errors
    ///
    /// Returns any error of `set`, or `Serialize` if `value` cannot be serialized.
    pub fn set_as<V: Serialize>(&mut self, property: &str, value: &V) -> Result<()> {
        self.set(property, serde_json::to_value(value)?)
    }

    /// The wrapped value (managed fields hold their construction-time state)
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn interceptor(&self) -> &SettingsInterceptor {
        &self.interceptor
    }
}

impl<T: Managed + std::fmt::Debug> std::fmt::Debug for SettingsProxy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsProxy")
            .field("type", &T::type_name())
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
