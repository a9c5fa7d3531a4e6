//! Declared value types and accessor metadata

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

// =============================================================================
// Value Types
// =============================================================================

/// Declared type of a property
///
/// Values travel as [`serde_json::Value`]; the declared type decides which
/// runtime shapes a property accepts without coercion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Accepts any value
    #[default]
    Any,
    /// `true` / `false`
    Bool,
    /// Integral numbers
    Integer,
    /// Floating point numbers
    Float,
    /// Text
    String,
    /// Arrays
    List,
    /// Maps / structs
    Object,
}

impl ValueType {
    /// Runtime type of a value, `None` for `null`
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Bool),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Integer),
            Value::Number(_) => Some(Self::Float),
            Value::String(_) => Some(Self::String),
            Value::Array(_) => Some(Self::List),
            Value::Object(_) => Some(Self::Object),
        }
    }

    /// Whether `value` can be assigned to this type as-is
    ///
    /// `null` is assignable everywhere.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match Self::of(value) {
            None => true,
            Some(actual) => *self == Self::Any || *self == actual,
        }
    }

    /// Non-nullable scalar types that have a zero value
    #[must_use]
    pub fn is_value_kind(&self) -> bool {
        matches!(self, Self::Bool | Self::Integer | Self::Float)
    }

    /// Value returned when nothing is stored and no default is declared
    #[must_use]
    pub fn zero_value(&self) -> Value {
        if !self.is_value_kind() {
            return Value::Null;
        }
        match self {
            Self::Bool => json!(false),
            Self::Float => json!(0.0),
            _ => json!(0),
        }
    }

    /// Lowercase name used in error messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }

    /// Name of a value's runtime type, `"null"` for null
    #[must_use]
    pub fn name_of(value: &Value) -> &'static str {
        Self::of(value).map_or("null", |t| t.name())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Accessors
// =============================================================================

/// Visibility of a property accessor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Reachable from any caller
    #[default]
    Public,
    /// Restricted to the defining crate or a parent module
    Crate,
    /// Private to the defining module
    Private,
}

/// Metadata of one accessor (getter or setter) of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accessor {
    pub visibility: Visibility,
    /// Calls are dispatched through the property table and can be substituted
    pub overridable: bool,
}

impl Accessor {
    pub const fn new(visibility: Visibility, overridable: bool) -> Self {
        Self {
            visibility,
            overridable,
        }
    }

    /// Public, overridable accessor
    pub const fn public() -> Self {
        Self::new(Visibility::Public, true)
    }

    /// Whether a proxy is allowed to substitute this accessor
    #[must_use]
    pub fn is_interceptable(&self) -> bool {
        self.visibility == Visibility::Public && self.overridable
    }
}

impl Default for Accessor {
    fn default() -> Self {
        Self::public()
    }
}
