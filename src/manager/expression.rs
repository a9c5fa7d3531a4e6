//! Property-access expressions
//!
//! Lets callers name a property with a closure-like accessor string instead
//! of passing its descriptor:
//!
//! - `"theme"` / `"self.theme"`
//! - `"|w| w.width"` / `"|w: Window| w.width"`
//! - `"|| window.width"` (an external instance as free variable)
//!
//! Anything other than a single field access (method calls, arithmetic,
//! nested paths) is rejected with `InvalidExpression`.

use super::SettingsManager;
use crate::descriptor::{Managed, PropertyDescriptor};
use crate::error::{Error, Result};
use crate::provider::StoreProvider;
use log::debug;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*",
        r"(?:(?P<closure>\|)\s*(?P<param>[A-Za-z_][A-Za-z0-9_]*)?\s*",
        r"(?::\s*(?P<ty>[A-Za-z_][A-Za-z0-9_]*(?:\s*::\s*[A-Za-z_][A-Za-z0-9_]*)*)\s*)?\|)?",
        r"\s*(?:(?P<receiver>[A-Za-z_][A-Za-z0-9_]*)\s*\.\s*)?",
        r"(?P<property>[A-Za-z_][A-Za-z0-9_]*)\s*$",
    ))
    .expect("expression pattern is valid")
});

/// A parsed single-property access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyExpression {
    parameter: Option<String>,
    type_hint: Option<String>,
    receiver: Option<String>,
    property: String,
}

impl PropertyExpression {
    /// Parse an accessor expression
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` unless `text` is a single property access
    /// on the closure parameter (or, without a parameter, on `self` or a
    /// captured instance).
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidExpression(format!("'{text}': {reason}"));

        let caps = EXPRESSION
            .captures(text)
            .ok_or_else(|| invalid("expected a single property access"))?;

        let parameter = caps.name("param").map(|m| m.as_str().to_string());
        let receiver = caps.name("receiver").map(|m| m.as_str().to_string());
        let type_hint = caps
            .name("ty")
            .map(|m| m.as_str().split_whitespace().collect::<String>());

        match (&parameter, &receiver) {
            (Some(param), Some(recv)) if param != recv => {
                return Err(invalid(&format!(
                    "receiver '{recv}' is not the parameter '{param}'"
                )));
            }
            (Some(_), None) => {
                return Err(invalid("property must be accessed on the parameter"));
            }
            _ => {}
        }
        if caps.name("closure").is_some() && parameter.is_none() && type_hint.is_some() {
            return Err(invalid("type annotation without a parameter"));
        }

        Ok(Self {
            parameter,
            type_hint,
            receiver,
            property: caps["property"].to_string(),
        })
    }

    /// Name of the accessed property
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Resolve against the descriptor table of `T`
    ///
    /// A type annotation on the parameter must name `T` (its last path
    /// segment is compared).
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` for a mismatched annotation, or
    /// `UnknownProperty` if `T` has no such property.
    pub fn resolve<T: Managed>(&self) -> Result<&'static Arc<PropertyDescriptor>> {
        let type_name = T::type_name();
        if let Some(hint) = &self.type_hint {
            if last_segment(hint) != last_segment(type_name) {
                return Err(Error::InvalidExpression(format!(
                    "parameter typed '{hint}' but the owner is '{type_name}'"
                )));
            }
        }
        T::properties()
            .entry(&self.property)
            .map(|entry| entry.descriptor())
    }
}

impl FromStr for PropertyExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn resolve<T: Managed>(expression: &str) -> Result<&'static Arc<PropertyDescriptor>> {
    let descriptor = PropertyExpression::parse(expression)?.resolve::<T>()?;
    debug!("Resolved '{expression}' to '{}'", descriptor.qualified_name());
    Ok(descriptor)
}

// =============================================================================
// Expression overloads
// =============================================================================

impl<P: StoreProvider> SettingsManager<P> {
    /// [`read`](Self::read) a property of `T` named by an expression
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` or `UnknownProperty` for a bad expression,
    /// otherwise any error of `read`.
    pub fn read_property<T: Managed>(&self, expression: &str) -> Result<Value> {
        self.read(resolve::<T>(expression)?)
    }

    /// [`read_as`](Self::read_as) a property of `T` named by an expression
    ///
    /// # Errors
    ///
    /// See [`read_property`](Self::read_property) and `read_as`.
    pub fn read_property_as<T: Managed, V: DeserializeOwned>(&self, expression: &str) -> Result<V> {
        self.read_as(resolve::<T>(expression)?)
    }

    /// [`save`](Self::save) a property of `T` named by an expression
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` or `UnknownProperty` for a bad expression,
    /// otherwise any error of `save`.
    pub fn save_property<T: Managed>(&self, expression: &str, value: Value) -> Result<()> {
        self.save(resolve::<T>(expression)?, value)
    }

    /// [`bind`](Self::bind) a property of `T` named by an expression
    ///
    /// # Errors
    ///
    /// Returns `InvalidExpression` or `UnknownProperty` for a bad expression,
    /// otherwise any error of `bind`.
    pub fn bind_property<T, F>(&self, expression: &str, callback: F) -> Result<()>
    where
        T: Managed,
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.bind(resolve::<T>(expression)?, callback)
    }
}
