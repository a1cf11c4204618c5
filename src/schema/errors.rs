//! Schema error types
//!
//! Schema problems are configuration errors: they surface at startup when
//! schemas are built or loaded, never while compiling a filter.

use std::io;

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema construction and loading errors
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Entity or field name is not a plain identifier
    #[error("Invalid identifier '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    /// Schema has no fields
    #[error("Schema '{0}' defines no fields")]
    EmptySchema(String),

    /// Default sort column is not one of the schema's fields
    #[error("Default sort column '{column}' is not a field of '{entity}'")]
    UnknownSortColumn { entity: String, column: String },

    /// Entity already registered
    #[error("Schema '{0}' is already registered")]
    Duplicate(String),

    /// Schema file could not be parsed
    #[error("Malformed schema file {path}: {reason}")]
    Malformed { path: String, reason: String },

    /// Filesystem error while loading schemas
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl SchemaError {
    /// Stable error code for responses
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::InvalidIdentifier(_) => "RSQLC_SCHEMA_INVALID_IDENTIFIER",
            SchemaError::EmptySchema(_) => "RSQLC_SCHEMA_EMPTY",
            SchemaError::UnknownSortColumn { .. } => "RSQLC_SCHEMA_UNKNOWN_SORT_COLUMN",
            SchemaError::Duplicate(_) => "RSQLC_SCHEMA_DUPLICATE",
            SchemaError::Malformed { .. } => "RSQLC_SCHEMA_MALFORMED",
            SchemaError::Io { .. } => "RSQLC_SCHEMA_IO",
        }
    }
}
