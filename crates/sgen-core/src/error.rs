//! Error types for schema loading and code generation

use thiserror::Error;

/// Result type alias for generator operations
pub type SgenResult<T> = Result<T, SgenError>;

/// Error type for generator operations
///
/// Every variant is an input-boundary failure: the run aborts and nothing is
/// written. Recoverable conditions (missing name hints, unions without a
/// common base) never surface here.
#[derive(Error, Debug)]
pub enum SgenError {
    /// The schema document could not be read or parsed
    #[error("schema load failed: {0}")]
    SchemaLoad(String),

    /// A `$ref` points at a location that does not exist
    #[error("unresolved reference: {reference}")]
    UnresolvedReference { reference: String },

    /// A `$ref` chain loops back on itself without reaching a schema
    #[error("circular reference: {0}")]
    CircularReference(String),

    /// A keyword holds a value of the wrong shape
    #[error("invalid schema at {pointer}: {message}")]
    InvalidSchema { pointer: String, message: String },

    /// No root type name override and no usable schema title
    #[error("no root name is specified and schema has no title that can be used as type name")]
    MissingRootTypeName,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SgenError {
    /// Returns the process exit code for this error category
    pub fn exit_code(&self) -> i32 {
        match self {
            SgenError::SchemaLoad(_) => 2,
            SgenError::UnresolvedReference { .. } => 3,
            SgenError::CircularReference(_) => 4,
            SgenError::InvalidSchema { .. } => 5,
            SgenError::MissingRootTypeName => 6,
            SgenError::Config(_) => 7,
            SgenError::Io(_) => 8,
        }
    }

    /// Shorthand for an [`SgenError::InvalidSchema`] at a JSON pointer
    pub fn invalid(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        SgenError::InvalidSchema {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SgenError {
    fn from(err: serde_json::Error) -> Self {
        SgenError::SchemaLoad(err.to_string())
    }
}

impl From<serde_yaml::Error> for SgenError {
    fn from(err: serde_yaml::Error) -> Self {
        SgenError::SchemaLoad(err.to_string())
    }
}

impl From<toml::de::Error> for SgenError {
    fn from(err: toml::de::Error) -> Self {
        SgenError::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
