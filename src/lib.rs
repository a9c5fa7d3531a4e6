//! # managed-settings
//!
//! Store-backed object properties: a property marked as *managed* is never
//! held by the object itself. Reads come from a settings store (persisted
//! value, declared default, or zero value, with type coercion) and writes are
//! saved back to it, notifying a bound subscriber first.
//!
//! ## Features
//!
//! - **Settings Store**: Read, save and bind managed properties over a pluggable provider
//! - **Providers**: In-memory, or one section of a JSON/TOML/YAML settings file
//! - **Coercion**: Injected registry converting persisted values to the declared type
//! - **Proxies**: Validated wrappers routing property access through an interceptor
//! - **Derive**: `#[derive(Settings)]` builds the property table (requires `derive` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use managed_settings::{MemoryProvider, PropertyDescriptor, SettingsManager, ValueType};
//! use serde_json::json;
//!
//! let manager = SettingsManager::new(MemoryProvider::new());
//! let font_size = PropertyDescriptor::new("app::Editor", "font_size", ValueType::Integer)
//!     .managed()
//!     .default_value(14);
//!
//! assert_eq!(manager.read(&font_size)?, json!(14));
//!
//! manager.save(&font_size, json!(16))?;
//! assert_eq!(manager.read(&font_size)?, json!(16));
//! # Ok::<(), managed_settings::Error>(())
//! ```
//!
//! ## Proxies
//!
//! ```rust,no_run
//! # #[cfg(feature = "derive")]
//! # fn example() -> managed_settings::Result<()> {
//! use managed_settings::{FileProvider, Settings, SettingsFactory, SettingsManager};
//! use std::sync::Arc;
//!
//! #[derive(Settings, Default)]
//! pub struct Editor {
//!     #[setting(default = 14)]
//!     pub font_size: i64,
//!
//!     #[setting(default = "dark")]
//!     pub theme: String,
//! }
//!
//! let provider = FileProvider::in_config_dir("my-app").section("editor").open()?;
//! let manager = Arc::new(SettingsManager::new(provider));
//! let factory = SettingsFactory::new(manager.clone());
//!
//! let mut editor = factory.create::<Editor>()?;
//! editor.set_theme("light".into())?;           // saved to the settings file
//! assert_eq!(editor.theme()?, "light");
//! # Ok(())
//! # }
//! ```
//!
//! ## Default Value Behavior
//!
//! A persisted entry always wins over the declared default, even when it is
//! `null`. Defaults are never coerced: a default that does not match the
//! declared type makes reads fail with `TypeMismatch`. Without both, `bool`,
//! integer and float properties read as `false` / `0` / `0.0`, everything
//! else as `null`.

// Core modules
pub mod coercion;
pub mod descriptor;
mod error;
pub mod interceptor;
mod manager;
pub mod provider;
pub mod proxy;
pub(crate) mod security;
pub mod storage;
mod subscriptions;

// Re-exports from core
pub use coercion::{CoercionRegistry, ConvertFn};
pub use descriptor::{
    Accessor, Managed, PropertyDescriptor, PropertyId, PropertyTable, ValueType, Visibility,
};
pub use error::{Error, Result};
pub use interceptor::{AccessKind, Invocation, SettingsInterceptor};
pub use manager::{PropertyExpression, SettingsManager, SettingsManagerBuilder, SettingsStore};
pub use provider::{FileProvider, FileProviderBuilder, MemoryProvider, StoreProvider};
pub use proxy::{SettingsFactory, SettingsProxy};
pub use storage::{JsonStorage, StorageBackend};
pub use subscriptions::SubscriberCallback;

#[cfg(feature = "toml")]
pub use storage::TomlStorage;

#[cfg(feature = "yaml")]
pub use storage::YamlStorage;

// Derive macro re-export (requires `derive` feature)
/// Derive macro for auto-generating `Managed` implementations.
///
/// See the `managed-settings-derive` crate for the supported attributes.
///
/// # Example
///
/// ```rust,ignore
/// use managed_settings::Settings;
///
/// #[derive(Default, Settings)]
/// #[settings(name = "app.Window")]
/// pub struct Window {
///     #[setting(default = 800)]
///     pub width: i64,
/// }
/// ```
#[cfg(feature = "derive")]
pub use managed_settings_derive::Settings;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
