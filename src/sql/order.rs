//! ORDER BY clause builder
//!
//! Sort requests come straight from query parameters. A column outside the
//! schema never reaches SQL; the request silently falls back to the default
//! column instead of failing the listing.

use std::fmt;

use crate::schema::FieldSchema;

use super::dialect::Dialect;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` in any case is descending; anything else, including
    /// nothing, is ascending.
    pub fn parse_lenient(direction: Option<&str>) -> Self {
        match direction {
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A requested sort, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    column: Option<String>,
    direction: SortDirection,
}

impl SortSpec {
    /// Builds a request from raw `sortBy` / `sortDir` parameters
    pub fn from_params(column: Option<&str>, direction: Option<&str>) -> Self {
        Self {
            column: column
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            direction: SortDirection::parse_lenient(direction),
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// True if a column was requested and the schema allows it
    pub fn is_valid_for(&self, schema: &FieldSchema) -> bool {
        self.column().map_or(false, |c| schema.contains(c))
    }

    /// Renders the clause, with a leading space.
    ///
    /// `default_column` is trusted and emitted as given.
    pub fn to_order_by(&self, schema: &FieldSchema, default_column: &str, dialect: Dialect) -> String {
        match self.column() {
            Some(column) if schema.contains(column) => format!(
                " ORDER BY {} {}",
                dialect.quote_ident(column),
                self.direction.as_sql()
            ),
            _ => format!(" ORDER BY {}", default_column),
        }
    }
}

/// Builds `" ORDER BY ..."` for a MySQL-style query
pub fn build_order_by(
    column: Option<&str>,
    direction: Option<&str>,
    schema: &FieldSchema,
    default_column: &str,
) -> String {
    SortSpec::from_params(column, direction).to_order_by(schema, default_column, Dialect::Mysql)
}
