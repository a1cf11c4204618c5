//! Comparison operator table
//!
//! The operator set is closed. `OperatorTable::standard()` is built once at
//! startup and handed to every parser; there is no way to register new
//! tokens at runtime.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Eq,      // ==
    NotEq,   // !=
    Gt,      // =gt=
    Ge,      // =ge=
    Lt,      // =lt=
    Le,      // =le=
    In,      // =in=
    NotIn,   // =out=
    Like,    // =like=
    NotLike, // =notlike=
    IsNull,  // =isnull=
}

/// Number of arguments an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one argument
    Single,
    /// One or more arguments
    Multi,
}

impl Arity {
    /// Returns true if `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Single => count == 1,
            Arity::Multi => count >= 1,
        }
    }

    /// Human-readable description for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Arity::Single => "exactly one argument",
            Arity::Multi => "one or more arguments",
        }
    }
}

impl OperatorKind {
    /// Canonical RSQL token
    pub fn symbol(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "==",
            OperatorKind::NotEq => "!=",
            OperatorKind::Gt => "=gt=",
            OperatorKind::Ge => "=ge=",
            OperatorKind::Lt => "=lt=",
            OperatorKind::Le => "=le=",
            OperatorKind::In => "=in=",
            OperatorKind::NotIn => "=out=",
            OperatorKind::Like => "=like=",
            OperatorKind::NotLike => "=notlike=",
            OperatorKind::IsNull => "=isnull=",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            OperatorKind::In | OperatorKind::NotIn => Arity::Multi,
            _ => Arity::Single,
        }
    }

    pub fn is_multi_value(&self) -> bool {
        self.arity() == Arity::Multi
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Eq,
            Self::NotEq,
            Self::Gt,
            Self::Ge,
            Self::Lt,
            Self::Le,
            Self::In,
            Self::NotIn,
            Self::Like,
            Self::NotLike,
            Self::IsNull,
        ]
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Mapping from operator token to `OperatorKind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    tokens: BTreeMap<&'static str, OperatorKind>,
}

impl OperatorTable {
    /// The standard RSQL operator set, including the symbolic
    /// comparison aliases (`<`, `<=`, `>`, `>=`).
    pub fn standard() -> Self {
        let mut tokens = BTreeMap::new();
        for op in OperatorKind::all() {
            tokens.insert(op.symbol(), *op);
        }
        tokens.insert(">", OperatorKind::Gt);
        tokens.insert(">=", OperatorKind::Ge);
        tokens.insert("<", OperatorKind::Lt);
        tokens.insert("<=", OperatorKind::Le);
        Self { tokens }
    }

    /// Looks up an operator by its token
    pub fn lookup(&self, token: &str) -> Option<OperatorKind> {
        self.tokens.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::standard()
    }
}
