//! File-backed store provider
//!
//! Keeps one named section of a settings document in memory and rewrites the
//! whole file on every save. The document layout is:
//!
//! ```json
//! {
//!   "<section>": {
//!     "<owner>.<property>": <value>
//!   }
//! }
//! ```
//!
//! Other sections in the same file are preserved untouched.

use super::StoreProvider;
use crate::error::{Error, Result};
use crate::storage::{JsonStorage, StorageBackend};
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Section name used when none is configured
pub const DEFAULT_SECTION: &str = "settings";

/// Store provider persisting into a section of a settings file
///
/// # Example
///
/// ```rust,no_run
/// use managed_settings::{FileProvider, SettingsManager};
///
/// let provider = FileProvider::builder("~/.config/my-app/settings.json")
///     .section("window")
///     .open()?;
/// let manager = SettingsManager::new(provider);
/// # Ok::<(), managed_settings::Error>(())
/// ```
pub struct FileProvider<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    section: String,
    storage: S,
    stringify: bool,
    /// The whole document; the configured section always exists
    document: RwLock<Map<String, Value>>,
}

impl FileProvider<JsonStorage> {
    /// Create a builder for a provider writing to `path`
    ///
    /// Supports `~` expansion for the home directory.
    pub fn builder(path: impl Into<PathBuf>) -> FileProviderBuilder<JsonStorage> {
        FileProviderBuilder::new(path)
    }

    /// Create a builder for `<config dir>/<app_name>/settings.json`
    ///
    /// Uses the platform config directory, or the current directory when
    /// none is available.
    pub fn in_config_dir(app_name: &str) -> FileProviderBuilder<JsonStorage> {
        let dir = dirs::config_dir()
            .map(|d| d.join(app_name))
            .unwrap_or_else(|| PathBuf::from("."));
        FileProviderBuilder::new(dir.join("settings.json"))
    }
}

impl<S: StorageBackend> FileProvider<S> {
    fn open(builder: FileProviderBuilder<S>) -> Result<Self> {
        let FileProviderBuilder {
            path,
            section,
            storage,
            stringify,
        } = builder;

        let mut document = if path.exists() {
            match storage.read::<Value>(&path)? {
                Value::Object(map) => map,
                other => {
                    return Err(Error::Parse(format!(
                        "'{}' must hold a map of sections, found {}",
                        path.display(),
                        crate::ValueType::name_of(&other)
                    )));
                }
            }
        } else {
            Map::new()
        };

        match document.get(&section) {
            Some(Value::Object(_)) => {}
            Some(other) => {
                return Err(Error::Parse(format!(
                    "Section '{section}' in '{}' must be a map, found {}",
                    path.display(),
                    crate::ValueType::name_of(other)
                )));
            }
            None => {
                document.insert(section.clone(), Value::Object(Map::new()));
                storage.write(&path, &document)?;
                info!("Created settings section '{section}' in {}", path.display());
            }
        }

        debug!(
            "Opened settings section '{section}' from {} ({})",
            path.display(),
            storage.extension()
        );

        Ok(Self {
            path,
            section,
            storage,
            stringify,
            document: RwLock::new(document),
        })
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the section this provider owns
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Whether values are persisted as strings
    pub fn stringifies_values(&self) -> bool {
        self.stringify
    }

    /// Keys stored in the section, sorted
    pub fn keys(&self) -> Vec<String> {
        let document = self.document.read();
        let mut keys: Vec<String> = section_of(&document, &self.section)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn encode(&self, value: Value) -> Result<Value> {
        if !self.stringify {
            return Ok(value);
        }
        Ok(match value {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(s),
            Value::Bool(b) => Value::String(b.to_string()),
            Value::Number(n) => Value::String(n.to_string()),
            other => Value::String(serde_json::to_string(&other)?),
        })
    }
}

impl<S: StorageBackend> StoreProvider for FileProvider<S> {
    fn contains(&self, key: &str) -> bool {
        section_of(&self.document.read(), &self.section).is_some_and(|s| s.contains_key(key))
    }

    fn read(&self, key: &str) -> Result<Value> {
        section_of(&self.document.read(), &self.section)
            .and_then(|s| s.get(key).cloned())
            .ok_or_else(|| Error::SettingNotFound(key.to_string()))
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        let value = self.encode(value)?;
        let mut document = self.document.write();

        // Commit in memory only after the file write succeeded
        let mut updated = document.clone();
        if let Some(Value::Object(section)) = updated.get_mut(&self.section) {
            section.insert(key.to_string(), value);
        }
        self.storage.write(&self.path, &updated)?;
        *document = updated;

        debug!("Saved '{key}' to {}", self.path.display());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "file"
    }
}

impl<S: StorageBackend> std::fmt::Debug for FileProvider<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileProvider")
            .field("path", &self.path)
            .field("section", &self.section)
            .field("extension", &self.storage.extension())
            .field("stringify", &self.stringify)
            .finish_non_exhaustive()
    }
}

fn section_of<'a>(document: &'a Map<String, Value>, section: &str) -> Option<&'a Map<String, Value>> {
    document.get(section).and_then(Value::as_object)
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`FileProvider`]
#[derive(Debug, Clone)]
pub struct FileProviderBuilder<S: StorageBackend = JsonStorage> {
    path: PathBuf,
    section: String,
    storage: S,
    stringify: bool,
}

impl FileProviderBuilder<JsonStorage> {
    /// Create a builder writing JSON to `path`
    ///
    /// Supports `~` expansion for the home directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let expanded = if path.starts_with("~") {
            if let Some(home) = dirs::home_dir() {
                home.join(path.strip_prefix("~").unwrap_or(&path))
            } else {
                path
            }
        } else {
            path
        };

        Self {
            path: expanded,
            section: DEFAULT_SECTION.to_string(),
            storage: JsonStorage::new(),
            stringify: false,
        }
    }

    /// Use compact JSON (no pretty printing)
    #[must_use]
    pub fn compact_json(mut self) -> Self {
        self.storage = JsonStorage::compact();
        self
    }
}

impl<S: StorageBackend> FileProviderBuilder<S> {
    /// Set the section name (default: "settings")
    #[must_use]
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.section = name.into();
        self
    }

    /// Use a different file format
    pub fn storage<T: StorageBackend>(self, storage: T) -> FileProviderBuilder<T> {
        FileProviderBuilder {
            path: self.path,
            section: self.section,
            storage,
            stringify: self.stringify,
        }
    }

    /// Persist every non-null value as a string
    ///
    /// Reads then rely on coercion to recover typed values.
    #[must_use]
    pub fn stringify_values(mut self) -> Self {
        self.stringify = true;
        self
    }

    /// Open (or create) the file and its section
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if the section
    /// exists but is not a map, or if a newly created section cannot be saved.
    pub fn open(self) -> Result<FileProvider<S>> {
        if self.section.trim().is_empty() {
            return Err(Error::Config("Section name must not be empty".into()));
        }
        FileProvider::open(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
