//! CLI-specific error types
//!
//! Setup errors (config, schemas, I/O) end the process. Per-request errors
//! (unknown entity, rejected filter) become error responses in batch mode.

use std::fmt;
use std::io;

use crate::rsql::CompileError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Schema loading failed
    SchemaError,
    /// Request names an entity with no schema
    UnknownEntity,
    /// Request line is not a valid request
    BadRequest,
    /// Filter rejected by the compiler
    Rejected(String),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &str {
        match self {
            Self::ConfigError => "RSQLC_CLI_CONFIG_ERROR",
            Self::IoError => "RSQLC_CLI_IO_ERROR",
            Self::SchemaError => "RSQLC_CLI_SCHEMA_ERROR",
            Self::UnknownEntity => "RSQLC_CLI_UNKNOWN_ENTITY",
            Self::BadRequest => "RSQLC_CLI_BAD_REQUEST",
            Self::Rejected(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Bad request line
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BadRequest, msg)
    }

    /// Unknown entity
    pub fn unknown_entity(entity: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownEntity,
            format!("No schema registered for entity '{}'", entity),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for errors that only affect one request
    pub fn is_request_error(&self) -> bool {
        matches!(
            self.code,
            CliErrorCode::UnknownEntity | CliErrorCode::BadRequest | CliErrorCode::Rejected(_)
        )
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(
            CliErrorCode::SchemaError,
            format!("{}: {}", e.code(), e),
        )
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        Self::new(
            CliErrorCode::Rejected(e.code().code().to_string()),
            e.to_string(),
        )
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
