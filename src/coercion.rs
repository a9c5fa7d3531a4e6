//! Coercion registry
//!
//! Maps a target [`ValueType`] to the converters able to produce it, keyed by
//! source type. The settings store queries it when a persisted value does not
//! match the declared type of its property.

use crate::descriptor::ValueType;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type alias for a conversion function
pub type ConvertFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
struct Converter {
    source: ValueType,
    convert: ConvertFn,
}

/// Injected registry of value converters
///
/// # Example
///
/// ```rust
/// use managed_settings::{CoercionRegistry, ValueType};
/// use serde_json::json;
///
/// let registry = CoercionRegistry::with_defaults();
/// assert!(registry.can_convert(ValueType::Integer, ValueType::String));
/// assert_eq!(
///     registry.convert(ValueType::Integer, &json!("42")).unwrap(),
///     Some(json!(42))
/// );
/// ```
#[derive(Clone, Default)]
pub struct CoercionRegistry {
    converters: HashMap<ValueType, Vec<Converter>>,
}

impl CoercionRegistry {
    /// Create an empty registry (no value is ever converted)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in converters
    ///
    /// - string -> bool (`true` / `false`, case-insensitive)
    /// - string -> integer, string -> float
    /// - integer -> float
    /// - string -> list, string -> object (JSON text)
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with(ValueType::Bool, ValueType::String, |value| {
                let text = expect_str(value, ValueType::Bool)?;
                match text.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(conversion_error(value, ValueType::Bool, "not a boolean")),
                }
            })
            .with(ValueType::Integer, ValueType::String, |value| {
                let text = expect_str(value, ValueType::Integer)?.trim();
                if let Ok(n) = text.parse::<i64>() {
                    return Ok(Value::from(n));
                }
                text.parse::<u64>()
                    .map(Value::from)
                    .map_err(|e| conversion_error(value, ValueType::Integer, &e.to_string()))
            })
            .with(ValueType::Float, ValueType::String, |value| {
                let text = expect_str(value, ValueType::Float)?.trim();
                let n = text
                    .parse::<f64>()
                    .map_err(|e| conversion_error(value, ValueType::Float, &e.to_string()))?;
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| conversion_error(value, ValueType::Float, "not a finite number"))
            })
            .with(ValueType::Float, ValueType::Integer, |value| {
                value
                    .as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| conversion_error(value, ValueType::Float, "out of range"))
            })
            .with(ValueType::List, ValueType::String, |value| {
                parse_json_text(value, ValueType::List)
            })
            .with(ValueType::Object, ValueType::String, |value| {
                parse_json_text(value, ValueType::Object)
            })
    }

    /// Register a converter producing `target` from values of type `source`
    ///
    /// Replaces any converter already registered for the same pair.
    pub fn register<F>(&mut self, target: ValueType, source: ValueType, convert: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        let converters = self.converters.entry(target).or_default();
        let converter = Converter {
            source,
            convert: Arc::new(convert),
        };
        match converters.iter_mut().find(|c| c.source == source) {
            Some(existing) => *existing = converter,
            None => converters.push(converter),
        }
        self
    }

    /// Builder-style variant of [`register`](Self::register)
    #[must_use]
    pub fn with<F>(mut self, target: ValueType, source: ValueType, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(target, source, convert);
        self
    }

    /// Find the converter for `source -> target`
    pub fn converter(&self, target: ValueType, source: ValueType) -> Option<&ConvertFn> {
        self.converters
            .get(&target)?
            .iter()
            .find(|c| c.source == source)
            .map(|c| &c.convert)
    }

    pub fn can_convert(&self, target: ValueType, source: ValueType) -> bool {
        self.converter(target, source).is_some()
    }

    /// Convert `value` to `target`
    ///
    /// Returns `Ok(None)` when no converter accepts the value's type.
    ///
    /// # Errors
    ///
    /// Propagates the converter's error when conversion is attempted and fails.
    pub fn convert(&self, target: ValueType, value: &Value) -> Result<Option<Value>> {
        let Some(source) = ValueType::of(value) else {
            return Ok(None);
        };
        match self.converter(target, source) {
            Some(convert) => convert(value).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<(ValueType, ValueType)> = self
            .converters
            .iter()
            .flat_map(|(target, list)| list.iter().map(move |c| (c.source, *target)))
            .collect();
        pairs.sort_by_key(|(source, target)| (target.name(), source.name()));

        let mut list = f.debug_list();
        for (source, target) in pairs {
            list.entry(&format_args!("{source} -> {target}"));
        }
        list.finish()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn conversion_error(value: &Value, target: ValueType, reason: &str) -> Error {
    Error::Conversion {
        from: ValueType::name_of(value).to_string(),
        to: target.name().to_string(),
        reason: reason.to_string(),
    }
}

fn expect_str(value: &Value, target: ValueType) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| conversion_error(value, target, "expected a string"))
}

fn parse_json_text(value: &Value, target: ValueType) -> Result<Value> {
    let text = expect_str(value, target)?;
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| conversion_error(value, target, &e.to_string()))?;
    if ValueType::of(&parsed) == Some(target) {
        Ok(parsed)
    } else {
        Err(conversion_error(
            value,
            target,
            &format!("text holds {}", ValueType::name_of(&parsed)),
        ))
    }
}
