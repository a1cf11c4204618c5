//! Compilation results
//!
//! A `CompiledPredicate` is safe to splice after `WHERE`: the fragment only
//! contains vetted, quoted identifiers, fixed keywords and `?` placeholders.
//! Values travel separately in `parameters`, in placeholder order.

use std::fmt;

use serde::Serialize;

/// Fragment for an absent or empty filter
pub const MATCH_ALL: &str = "1=1";

/// A bound parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SqlParam {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlParam::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for SqlParam {
    fn from(n: i64) -> Self {
        SqlParam::Integer(n)
    }
}

impl From<f64> for SqlParam {
    fn from(x: f64) -> Self {
        SqlParam::Float(x)
    }
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        SqlParam::Text(s)
    }
}

/// A numeric field argument that was bound as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionWarning {
    pub field: String,
    pub value: String,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value '{}' for numeric field '{}' bound as text",
            self.value, self.field
        )
    }
}

/// WHERE fragment plus its positional parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledPredicate {
    #[serde(rename = "where")]
    where_fragment: String,
    parameters: Vec<SqlParam>,
    warnings: Vec<CoercionWarning>,
}

impl CompiledPredicate {
    pub(crate) fn new(
        where_fragment: String,
        parameters: Vec<SqlParam>,
        warnings: Vec<CoercionWarning>,
    ) -> Self {
        Self {
            where_fragment,
            parameters,
            warnings,
        }
    }

    /// The always-true predicate
    pub fn match_all() -> Self {
        Self::new(MATCH_ALL.to_string(), Vec::new(), Vec::new())
    }

    pub fn where_fragment(&self) -> &str {
        &self.where_fragment
    }

    pub fn parameters(&self) -> &[SqlParam] {
        &self.parameters
    }

    pub fn warnings(&self) -> &[CoercionWarning] {
        &self.warnings
    }

    pub fn is_match_all(&self) -> bool {
        self.where_fragment == MATCH_ALL && self.parameters.is_empty()
    }
}
