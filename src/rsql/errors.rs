//! Compile error types
//!
//! Error codes:
//! - RSQL_SYNTAX_ERROR (REJECT)
//! - RSQL_UNKNOWN_FIELD (REJECT)
//! - RSQL_ARITY_ERROR (REJECT)
//! - RSQL_NESTING_TOO_DEEP (REJECT)
//!
//! Every fatal compile failure is a single `CompileError` carrying the
//! offending fragment. Nothing here is retryable.

use std::fmt;

use super::operators::OperatorKind;

/// Severity levels for compile errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Compile error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Text does not parse under the grammar
    Syntax,
    /// Selector is not in the field allowlist
    UnknownField,
    /// Operator received the wrong number of arguments
    Arity,
    /// Parenthesized groups nested beyond the configured limit
    NestingTooDeep,
}

impl CompileErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::Syntax => "RSQL_SYNTAX_ERROR",
            CompileErrorCode::UnknownField => "RSQL_UNKNOWN_FIELD",
            CompileErrorCode::Arity => "RSQL_ARITY_ERROR",
            CompileErrorCode::NestingTooDeep => "RSQL_NESTING_TOO_DEEP",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compile error with the offending fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    fragment: String,
    offset: Option<usize>,
}

impl CompileError {
    /// Create a syntax error
    pub fn syntax(
        message: impl Into<String>,
        fragment: impl Into<String>,
        offset: Option<usize>,
    ) -> Self {
        Self {
            code: CompileErrorCode::Syntax,
            message: message.into(),
            fragment: fragment.into(),
            offset,
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::UnknownField,
            message: format!("Unknown field '{}'", f),
            fragment: f,
            offset: None,
        }
    }

    /// Create an arity error for a comparison operator
    pub fn arity(operator: OperatorKind, received: usize) -> Self {
        Self {
            code: CompileErrorCode::Arity,
            message: format!(
                "Operator '{}' expects {}, got {}",
                operator.symbol(),
                operator.arity().describe(),
                received
            ),
            fragment: operator.symbol().to_string(),
            offset: None,
        }
    }

    /// Create an arity error for a logical combinator
    pub fn logical_arity(symbol: &str, received: usize) -> Self {
        Self {
            code: CompileErrorCode::Arity,
            message: format!(
                "Combinator '{}' expects at least 2 operands, got {}",
                symbol, received
            ),
            fragment: symbol.to_string(),
            offset: None,
        }
    }

    /// Create a nesting depth error
    pub fn nesting_too_deep(max_depth: usize, offset: Option<usize>) -> Self {
        Self {
            code: CompileErrorCode::NestingTooDeep,
            message: format!("Expression nests deeper than {} levels", max_depth),
            fragment: "(".to_string(),
            offset,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending substring
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns the byte offset in the filter text, if known
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(offset) = self.offset {
            write!(f, " (at offset {})", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Result type for parse and compile operations
pub type CompileResult<T> = Result<T, CompileError>;
