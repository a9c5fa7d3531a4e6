//! Proxy construction and structural validation

use super::SettingsProxy;
use crate::descriptor::{Accessor, Managed, PropertyDescriptor, PropertyTable, Visibility};
use crate::error::{Error, Result};
use crate::interceptor::SettingsInterceptor;
use crate::manager::SettingsStore;
use log::debug;
use std::sync::Arc;

/// Creates validated [`SettingsProxy`] values backed by one settings store
///
/// # Example
///
/// ```rust
/// use managed_settings::{Managed, MemoryProvider, PropertyTable, SettingsFactory, SettingsManager, ValueType};
/// use serde_json::json;
/// use std::sync::{Arc, OnceLock};
///
/// #[derive(Default)]
/// struct Window;
///
/// impl Managed for Window {
///     fn properties() -> &'static PropertyTable<Self> {
///         static TABLE: OnceLock<PropertyTable<Window>> = OnceLock::new();
///         TABLE.get_or_init(|| {
///             PropertyTable::<Window>::builder("app::Window")
///                 .property("width", ValueType::Integer)
///                 .managed()
///                 .default_value(800)
///                 .read(|_| Ok(json!(0)))
///                 .write(|_, _| Ok(()))
///                 .finish()
///                 .build()
///         })
///     }
/// }
///
/// let manager = Arc::new(SettingsManager::new(MemoryProvider::new()));
/// let factory = SettingsFactory::new(manager.clone());
///
/// let mut window = factory.create::<Window>()?;
/// assert_eq!(window.get("width")?, json!(800));
///
/// window.set("width", json!(1024))?;
/// assert_eq!(manager.provider().get("app::Window.width"), Some(json!(1024)));
/// # Ok::<(), managed_settings::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SettingsFactory {
    interceptor: SettingsInterceptor,
}

impl SettingsFactory {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            interceptor: SettingsInterceptor::new(store),
        }
    }

    /// Proxy a default-constructed `T`
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` if `T` cannot be proxied.
    pub fn create<T: Managed + Default>(&self) -> Result<SettingsProxy<T>> {
        self.create_with(T::default)
    }

    /// Proxy a `T` built by `construct`
    ///
    /// `construct` only runs once validation passed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` if `T` cannot be proxied.
    pub fn create_with<T, F>(&self, construct: F) -> Result<SettingsProxy<T>>
    where
        T: Managed,
        F: FnOnce() -> T,
    {
        validate::<T>()?;
        Ok(SettingsProxy::new(construct(), self.interceptor.clone()))
    }

    /// Proxy an existing value
    ///
    /// # Errors
    ///
    /// Returns `ArgumentNull` if `target` is `None` (checked first), then
    /// `ValidationFailure` if `T` cannot be proxied.
    pub fn decorate<T: Managed>(&self, target: Option<T>) -> Result<SettingsProxy<T>> {
        let target = target.ok_or(Error::ArgumentNull("target"))?;
        validate::<T>()?;
        Ok(SettingsProxy::new(target, self.interceptor.clone()))
    }

    pub fn interceptor(&self) -> &SettingsInterceptor {
        &self.interceptor
    }
}

/// Check that every managed property of `T` can be proxied
///
/// # Errors
///
/// Returns `ValidationFailure` naming the first offending property.
pub fn validate<T: Managed>() -> Result<()> {
    validate_table(T::properties())
}

/// Check that every managed property of a table can be proxied
///
/// Both accessors must exist, be public and be overridable.
///
/// # Errors
///
/// Returns `ValidationFailure` naming the first offending property.
pub fn validate_table<T>(table: &PropertyTable<T>) -> Result<()> {
    for descriptor in table.managed() {
        check_accessor(table, descriptor, "getter", descriptor.read())?;
        check_accessor(table, descriptor, "setter", descriptor.write())?;
    }
    debug!("Validated settings type '{}'", table.type_name());
    Ok(())
}

fn check_accessor<T>(
    table: &PropertyTable<T>,
    descriptor: &PropertyDescriptor,
    role: &str,
    accessor: Option<Accessor>,
) -> Result<()> {
    let reason = match accessor {
        None => format!("has no {role}"),
        Some(a) if a.visibility != Visibility::Public => format!("{role} is not public"),
        Some(a) if !a.overridable => format!("{role} is not overridable"),
        Some(_) => return Ok(()),
    };
    Err(Error::ValidationFailure {
        type_name: table.type_name().to_string(),
        property: descriptor.name().to_string(),
        reason,
    })
}
