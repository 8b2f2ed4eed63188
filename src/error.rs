//! Error types for the configuration persistence engine.

use thiserror::Error;

/// Schema definition errors. These indicate a mistake in schema-building
/// code, not in user input, and are never recovered from.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Empty segment in declared path '{0}'")]
    EmptyPathSegment(String),

    #[error("Conflicting declarations at path '{0}'")]
    ConflictingPath(String),

    #[error("Default value at '{path}' does not match the declared kind ({expected})")]
    DefaultKindMismatch { path: String, expected: &'static str },

    #[error("Enum default '{value}' at '{path}' is not one of {allowed:?}")]
    UnknownEnumDefault {
        path: String,
        value: String,
        allowed: Vec<&'static str>,
    },
}

/// Instantiation errors: the merged tree holds a value the schema cannot
/// accept. Recoverable via the backup-then-reset path in the loader.
#[derive(Debug, Error)]
pub enum InstantiateError {
    #[error("Expected {expected} at '{path}', found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Integer {value} at '{path}' is out of range for a 32-bit integer")]
    IntOutOfRange { path: String, value: i64 },

    #[error("Value '{value}' at '{path}' is not one of {allowed:?}")]
    UnknownEnumValue {
        path: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Failed to construct typed value: {0}")]
    Construct(#[from] toml::de::Error),
}

/// Errors surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Configuration could not be instantiated even from pure defaults: {0}")]
    Unrecoverable(InstantiateError),
}
