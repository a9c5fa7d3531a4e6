//! In-memory store provider

use super::StoreProvider;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// In-memory key-value provider (not persisted)
#[derive(Debug, Default)]
pub struct MemoryProvider {
    store: RwLock<HashMap<String, Value>>,
}

impl MemoryProvider {
    /// Create an empty memory provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider pre-populated with raw entries
    pub fn with_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            store: RwLock::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Raw value under `key`, if any
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.read().get(key).cloned()
    }

    /// Insert a raw entry without going through a settings store
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.store.write().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.store.write().remove(key)
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn clear(&self) {
        self.store.write().clear();
    }
}

impl StoreProvider for MemoryProvider {
    fn contains(&self, key: &str) -> bool {
        self.store.read().contains_key(key)
    }

    fn read(&self, key: &str) -> Result<Value> {
        self.get(key)
            .ok_or_else(|| Error::SettingNotFound(key.to_string()))
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        self.store.write().insert(key.to_string(), value);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_save_and_read() {
        let provider = MemoryProvider::new();

        provider.save("app.theme", json!("dark")).unwrap();
        provider.save("app.size", json!(12)).unwrap();

        assert!(provider.contains("app.theme"));
        assert_eq!(provider.read("app.theme").unwrap(), json!("dark"));
        assert_eq!(provider.read("app.size").unwrap(), json!(12));
        assert!(!provider.contains("app.other"));
    }

    #[test]
    fn test_memory_read_missing_key() {
        let provider = MemoryProvider::new();
        let err = provider.read("missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_overwrite_and_null() {
        let provider = MemoryProvider::with_entries([("k", json!(1))]);

        provider.save("k", json!(2)).unwrap();
        assert_eq!(provider.read("k").unwrap(), json!(2));

        provider.save("k", Value::Null).unwrap();
        assert!(provider.contains("k"));
        assert_eq!(provider.read("k").unwrap(), Value::Null);
    }

    #[test]
    fn test_memory_keys_and_clear() {
        let provider = MemoryProvider::new();
        provider.insert("b", json!(2));
        provider.insert("a", json!(1));

        assert_eq!(provider.keys(), vec!["a", "b"]);
        assert_eq!(provider.len(), 2);

        provider.clear();
        assert!(provider.is_empty());
    }
}
