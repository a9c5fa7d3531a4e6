//! Common test utilities for managed-settings integration tests
//!
//! Provides hand-written managed types, recording test doubles for the
//! provider and store seams, and a file-backed fixture.

#![allow(dead_code)]

use managed_settings::{
    Error, FileProvider, Managed, PropertyDescriptor, PropertyTable, Result, SettingsManager,
    SettingsStore, StoreProvider, ValueType, Visibility,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tempfile::TempDir;

/// Enable `RUST_LOG`-driven log output for a test run
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Managed Test Types
// =============================================================================

/// Properties covering every read path of the settings store
#[derive(Debug, Default)]
pub struct StoreModel {
    pub plain: Value,
    pub int_setting: i64,
    pub object_setting: Value,
    pub any_setting: Value,
    pub int_with_default: i64,
    pub any_with_int_default: Value,
    pub string_with_int_default: Option<String>,
}

macro_rules! field_accessors {
    ($builder:expr, $field:ident) => {
        $builder
            .read(|m| Ok(serde_json::to_value(&m.$field)?))
            .write(|m, v| {
                m.$field = serde_json::from_value(v)?;
                Ok(())
            })
    };
}

impl Managed for StoreModel {
    fn properties() -> &'static PropertyTable<Self> {
        static TABLE: OnceLock<PropertyTable<StoreModel>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = PropertyTable::<StoreModel>::builder("tests::StoreModel");
            let table = field_accessors!(table.property("plain", ValueType::Any), plain).finish();
            let table = field_accessors!(
                table.property("int_setting", ValueType::Integer).managed(),
                int_setting
            )
            .finish();
            let table = field_accessors!(
                table.property("object_setting", ValueType::Object).managed(),
                object_setting
            )
            .finish();
            let table = field_accessors!(
                table.property("any_setting", ValueType::Any).managed(),
                any_setting
            )
            .finish();
            let table = field_accessors!(
                table
                    .property("int_with_default", ValueType::Integer)
                    .managed()
                    .default_value(5),
                int_with_default
            )
            .finish();
            let table = field_accessors!(
                table
                    .property("any_with_int_default", ValueType::Any)
                    .managed()
                    .default_value(5),
                any_with_int_default
            )
            .finish();
            let table = field_accessors!(
                table
                    .property("string_with_int_default", ValueType::String)
                    .managed()
                    .default_value(5),
                string_with_int_default
            )
            .finish();
            table.build()
        })
    }
}

/// A model with one plain and one store-backed property
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Model {
    pub prop: i64,
    pub inject_prop: i64,
}

impl Model {
    pub fn with_prop(prop: i64) -> Self {
        Self {
            prop,
            ..Self::default()
        }
    }
}

impl Managed for Model {
    fn properties() -> &'static PropertyTable<Self> {
        static TABLE: OnceLock<PropertyTable<Model>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = PropertyTable::<Model>::builder("tests::Model");
            let table = field_accessors!(table.property("prop", ValueType::Integer), prop).finish();
            let table = field_accessors!(
                table.property("inject_prop", ValueType::Integer).managed(),
                inject_prop
            )
            .finish();
            table.build()
        })
    }
}

/// Managed property whose accessors cannot be substituted
#[derive(Debug, Default)]
pub struct SealedPropModel {
    pub prop: i64,
}

impl Managed for SealedPropModel {
    fn properties() -> &'static PropertyTable<Self> {
        static TABLE: OnceLock<PropertyTable<SealedPropModel>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = PropertyTable::<SealedPropModel>::builder("tests::SealedPropModel");
            field_accessors!(table.property("prop", ValueType::Integer).managed().sealed(), prop)
                .finish()
                .build()
        })
    }
}

/// Managed property with a crate-visible getter
#[derive(Debug, Default)]
pub struct NonPublicGetterModel {
    pub prop: i64,
}

impl Managed for NonPublicGetterModel {
    fn properties() -> &'static PropertyTable<Self> {
        static TABLE: OnceLock<PropertyTable<NonPublicGetterModel>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = PropertyTable::<NonPublicGetterModel>::builder("tests::NonPublicGetterModel");
            field_accessors!(
                table
                    .property("prop", ValueType::Integer)
                    .managed()
                    .read_visibility(Visibility::Crate),
                prop
            )
            .finish()
            .build()
        })
    }
}

/// Managed property with a crate-visible setter
#[derive(Debug, Default)]
pub struct NonPublicSetterModel {
    pub prop: i64,
}

impl Managed for NonPublicSetterModel {
    fn properties() -> &'static PropertyTable<Self> {
        static TABLE: OnceLock<PropertyTable<NonPublicSetterModel>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = PropertyTable::<NonPublicSetterModel>::builder("tests::NonPublicSetterModel");
            field_accessors!(
                table
                    .property("prop", ValueType::Integer)
                    .managed()
                    .write_visibility(Visibility::Crate),
                prop
            )
            .finish()
            .build()
        })
    }
}

/// Descriptor of a property of `T`, panicking if it does not exist
pub fn descriptor<T: Managed>(name: &str) -> Arc<PropertyDescriptor> {
    T::properties()
        .descriptor(name)
        .unwrap_or_else(|| panic!("{} has no property '{name}'", T::type_name()))
        .clone()
}

// =============================================================================
// Recording Provider
// =============================================================================

/// One call received by a [`RecordingProvider`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Contains(String),
    Read(String),
    Save(String, Value),
}

/// Provider mapping every property to one fixed key, recording each call
pub struct RecordingProvider {
    key: String,
    stored: Mutex<Option<Value>>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl RecordingProvider {
    pub const KEY: &'static str = "setting";

    /// Provider where the fixed key holds `value`
    pub fn holding(value: Value) -> Self {
        Self {
            key: Self::KEY.to_string(),
            stored: Mutex::new(Some(value)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Provider without any entry
    pub fn empty() -> Self {
        Self {
            key: Self::KEY.to_string(),
            stored: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Read(_)))
            .count()
    }

    pub fn saves(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProviderCall::Save(k, v) => Some((k, v)),
                _ => None,
            })
            .collect()
    }
}

impl StoreProvider for RecordingProvider {
    fn setting_key(&self, _descriptor: &PropertyDescriptor) -> String {
        self.key.clone()
    }

    fn contains(&self, key: &str) -> bool {
        self.calls.lock().unwrap().push(ProviderCall::Contains(key.to_string()));
        key == self.key && self.stored.lock().unwrap().is_some()
    }

    fn read(&self, key: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(ProviderCall::Read(key.to_string()));
        if key != self.key {
            return Err(Error::SettingNotFound(key.to_string()));
        }
        self.stored
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::SettingNotFound(key.to_string()))
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::Save(key.to_string(), value.clone()));
        *self.stored.lock().unwrap() = Some(value);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

// =============================================================================
// Recording Store
// =============================================================================

/// Settings store double recording reads and saves
///
/// Reads return `json!("from store")`; saves fail when `fail_saves` is set.
#[derive(Default)]
pub struct RecordingStore {
    reads: Mutex<Vec<String>>,
    saves: Mutex<Vec<(String, Value)>>,
    fail_saves: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `save` always fails
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn saves(&self) -> Vec<(String, Value)> {
        self.saves.lock().unwrap().clone()
    }
}

impl SettingsStore for RecordingStore {
    fn read(&self, descriptor: &PropertyDescriptor) -> Result<Value> {
        self.reads.lock().unwrap().push(descriptor.name().to_string());
        Ok(json!("from store"))
    }

    fn save(&self, descriptor: &PropertyDescriptor, value: Value) -> Result<()> {
        self.saves
            .lock()
            .unwrap()
            .push((descriptor.name().to_string(), value));
        if self.fail_saves {
            return Err(Error::Config("save rejected".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture with a temporary directory and a file-backed manager
pub struct FileFixture {
    pub temp_dir: TempDir,
    pub manager: Arc<SettingsManager<FileProvider>>,
}

impl FileFixture {
    /// Create a fixture using the default section
    pub fn new() -> Self {
        Self::with_section("settings")
    }

    pub fn with_section(section: &str) -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let provider = FileProvider::builder(temp_dir.path().join("settings.json"))
            .section(section)
            .open()
            .expect("Failed to open settings file");
        let manager = Arc::new(SettingsManager::new(provider));

        Self { temp_dir, manager }
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.temp_dir.path().join("settings.json")
    }

    /// Reopen the same file in a new manager (a new "session")
    pub fn reopen(&self, section: &str) -> SettingsManager<FileProvider> {
        let provider = FileProvider::builder(self.settings_path())
            .section(section)
            .open()
            .expect("Failed to reopen settings file");
        SettingsManager::new(provider)
    }
}

/// Read and parse the settings file at `path`
pub fn read_settings_file(path: &std::path::Path) -> HashMap<String, Value> {
    let content = std::fs::read_to_string(path).expect("Failed to read settings file");
    serde_json::from_str(&content).expect("Failed to parse settings file")
}
