//! Error types for managed-settings

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for managed-settings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for managed-settings
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Property '{0}' is not a managed setting")]
    NotManaged(String),

    #[error("Type mismatch for {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Setting '{0}' is already bound to a subscriber")]
    DuplicateSubscription(String),

    #[error("Expression must be a single property access: {0}")]
    InvalidExpression(String),

    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    #[error("Cannot convert {from} to {to}: {reason}")]
    Conversion {
        from: String,
        to: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Proxy Errors
    // -------------------------------------------------------------------------
    #[error("Invalid settings type '{type_name}': property '{property}' {reason}")]
    ValidationFailure {
        type_name: String,
        property: String,
        reason: String,
    },

    #[error("Argument '{0}' must not be null")]
    ArgumentNull(&'static str),

    #[error("Type '{owner}' has no property '{property}'")]
    UnknownProperty { owner: String, property: String },

    #[error("Malformed invocation of '{property}': {reason}")]
    MalformedInvocation { property: String, reason: String },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SettingNotFound(_) | Error::UnknownProperty { .. }
        )
    }

    /// Check if this error comes from reconciling a value with its declared type
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. } | Error::Conversion { .. })
    }

    /// Check if this error was raised by a storage backend
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. } | Error::FileWrite { .. } | Error::DirectoryCreate { .. }
        )
    }
}
