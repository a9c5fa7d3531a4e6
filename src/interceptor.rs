//! Access interceptor
//!
//! Decides, per property access, whether the call goes to the settings store
//! (managed properties) or to the original accessor (everything else).

use crate::descriptor::{Managed, PropertyDescriptor, PropertyEntry};
use crate::error::{Error, Result};
use crate::manager::SettingsStore;
use serde_json::Value;
use std::sync::Arc;

/// Direction of a property access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

/// One intercepted property access
///
/// Implemented by [`ReadInvocation`] and [`WriteInvocation`]; custom
/// proxies can provide their own.
pub trait Invocation {
    /// Fully qualified name of the declaring type
    fn owner(&self) -> &str;

    /// Name of the accessed property
    fn property(&self) -> &str;

    fn kind(&self) -> AccessKind;

    /// Call arguments: empty for reads, the new value for writes
    fn arguments(&self) -> &[Value];

    /// Descriptor of the accessed property, `None` if it cannot be resolved
    fn descriptor(&self) -> Option<Arc<PropertyDescriptor>>;

    /// Result handed back to the caller of a read
    fn set_return_value(&mut self, value: Value);

    /// Run the original accessor
    ///
    /// # Errors
    ///
    /// Returns the accessor's error, or `MalformedInvocation` if the
    /// accessor is missing or the arguments do not fit.
    fn proceed(&mut self) -> Result<()>;
}

/// Interceptor routing managed property accesses to a settings store
///
/// Holds no state beyond the store reference.
#[derive(Clone)]
pub struct SettingsInterceptor {
    store: Arc<dyn SettingsStore>,
}

impl SettingsInterceptor {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Handle one property access
    ///
    /// - unmanaged property: proceed to the original accessor
    /// - managed read: the store's value becomes the return value
    /// - managed write: the single argument is saved to the store
    ///
    /// Managed accesses never proceed.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProperty` if the property cannot be resolved,
    /// `MalformedInvocation` for a write without exactly one argument, and
    /// store or accessor errors unchanged.
    pub fn intercept(&self, invocation: &mut dyn Invocation) -> Result<()> {
        let descriptor = invocation
            .descriptor()
            .ok_or_else(|| Error::UnknownProperty {
                owner: invocation.owner().to_string(),
                property: invocation.property().to_string(),
            })?;

        if !descriptor.is_managed() {
            return invocation.proceed();
        }

        match invocation.kind() {
            AccessKind::Read => {
                let value = self.store.read(&descriptor)?;
                invocation.set_return_value(value);
            }
            AccessKind::Write => {
                let value = single_argument(&descriptor, invocation.arguments())?.clone();
                self.store.save(&descriptor, value)?;
            }
        }
        Ok(())
    }

    /// Intercepted read of `property` on `target`
    ///
    /// # Errors
    ///
    /// See [`intercept`](Self::intercept).
    pub fn read<T: Managed>(&self, target: &T, property: &str) -> Result<Value> {
        let mut invocation = ReadInvocation::new(target, property);
        self.intercept(&mut invocation)?;
        invocation.into_return_value()
    }

    /// Intercepted write of `value` to `property` on `target`
    ///
    /// # Errors
    ///
    /// See [`intercept`](Self::intercept).
    pub fn write<T: Managed>(&self, target: &mut T, property: &str, value: Value) -> Result<()> {
        let mut invocation = WriteInvocation::new(target, property, value);
        self.intercept(&mut invocation)
    }
}

impl std::fmt::Debug for SettingsInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsInterceptor").finish_non_exhaustive()
    }
}

fn single_argument<'a>(descriptor: &PropertyDescriptor, arguments: &'a [Value]) -> Result<&'a Value> {
    match arguments {
        [value] => Ok(value),
        _ => Err(Error::MalformedInvocation {
            property: descriptor.qualified_name(),
            reason: format!("expected exactly one argument, got {}", arguments.len()),
        }),
    }
}

// =============================================================================
// Invocations over Managed types
// =============================================================================

/// Getter call on a [`Managed`] value
pub struct ReadInvocation<'a, T: Managed> {
    target: &'a T,
    property: &'a str,
    return_value: Option<Value>,
}

impl<'a, T: Managed> ReadInvocation<'a, T> {
    pub fn new(target: &'a T, property: &'a str) -> Self {
        Self {
            target,
            property,
            return_value: None,
        }
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// The value produced by the store or the original getter
    ///
    /// # Errors
    ///
    /// Returns `MalformedInvocation` if nothing produced a value.
    pub fn into_return_value(self) -> Result<Value> {
        self.return_value.ok_or_else(|| Error::MalformedInvocation {
            property: format!("{}.{}", T::type_name(), self.property),
            reason: "read completed without a value".into(),
        })
    }

    fn entry(&self) -> Result<&'static PropertyEntry<T>> {
        T::properties().entry(self.property)
    }
}

impl<T: Managed> Invocation for ReadInvocation<'_, T> {
    fn owner(&self) -> &str {
        T::type_name()
    }

    fn property(&self) -> &str {
        self.property
    }

    fn kind(&self) -> AccessKind {
        AccessKind::Read
    }

    fn arguments(&self) -> &[Value] {
        &[]
    }

    fn descriptor(&self) -> Option<Arc<PropertyDescriptor>> {
        T::properties().descriptor(self.property).cloned()
    }

    fn set_return_value(&mut self, value: Value) {
        self.return_value = Some(value);
    }

    fn proceed(&mut self) -> Result<()> {
        let value = self.entry()?.read_from(self.target)?;
        self.return_value = Some(value);
        Ok(())
    }
}

/// Setter call on a [`Managed`] value
pub struct WriteInvocation<'a, T: Managed> {
    target: &'a mut T,
    property: &'a str,
    arguments: Vec<Value>,
}

impl<'a, T: Managed> WriteInvocation<'a, T> {
    pub fn new(target: &'a mut T, property: &'a str, value: Value) -> Self {
        Self::with_arguments(target, property, vec![value])
    }

    /// Invocation with an arbitrary argument list
    pub fn with_arguments(target: &'a mut T, property: &'a str, arguments: Vec<Value>) -> Self {
        Self {
            target,
            property,
            arguments,
        }
    }
}

impl<T: Managed> Invocation for WriteInvocation<'_, T> {
    fn owner(&self) -> &str {
        T::type_name()
    }

    fn property(&self) -> &str {
        self.property
    }

    fn kind(&self) -> AccessKind {
        AccessKind::Write
    }

    fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    fn descriptor(&self) -> Option<Arc<PropertyDescriptor>> {
        T::properties().descriptor(self.property).cloned()
    }

    fn set_return_value(&mut self, _value: Value) {}

    fn proceed(&mut self) -> Result<()> {
        let entry = T::properties().entry(self.property)?;
        let value = single_argument(entry.descriptor(), &self.arguments)?.clone();
        entry.write_to(self.target, value)
    }
}
