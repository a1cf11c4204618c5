//! Field schema definitions
//!
//! A `FieldSchema` is the per-entity allowlist: the only field names a
//! filter or sort request may reference, each tagged with the kind used to
//! coerce literal arguments.
//!
//! Schema file format:
//!
//! ```json
//! {
//!   "entity": "article",
//!   "default_sort": "id",
//!   "fields": { "id": "numeric", "title": "text" }
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"))
}

/// Returns true if `name` is a plain SQL identifier
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

fn default_sort_column() -> String {
    "id".to_string()
}

/// Value kind used for literal coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Arguments are parsed as integer, then float
    Numeric,
    /// Arguments are passed through unchanged
    Text,
}

/// On-disk representation, validated into `FieldSchema`
#[derive(Debug, Deserialize)]
struct SchemaFile {
    entity: String,
    #[serde(default = "default_sort_column")]
    default_sort: String,
    fields: BTreeMap<String, FieldKind>,
}

impl TryFrom<SchemaFile> for FieldSchema {
    type Error = SchemaError;

    fn try_from(file: SchemaFile) -> SchemaResult<Self> {
        FieldSchema::new(file.entity, file.fields, file.default_sort)
    }
}

/// Immutable per-entity field allowlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaFile")]
pub struct FieldSchema {
    entity: String,
    default_sort: String,
    fields: BTreeMap<String, FieldKind>,
}

impl FieldSchema {
    /// Creates a validated schema
    pub fn new(
        entity: impl Into<String>,
        fields: BTreeMap<String, FieldKind>,
        default_sort: impl Into<String>,
    ) -> SchemaResult<Self> {
        let schema = Self {
            entity: entity.into(),
            default_sort: default_sort.into(),
            fields,
        };
        schema.validate_structure()?;
        Ok(schema)
    }

    /// Starts a builder for `entity`
    pub fn builder(entity: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            entity: entity.into(),
            default_sort: default_sort_column(),
            fields: BTreeMap::new(),
        }
    }

    /// Validates the schema structure itself
    fn validate_structure(&self) -> SchemaResult<()> {
        if !is_identifier(&self.entity) {
            return Err(SchemaError::InvalidIdentifier(self.entity.clone()));
        }

        if self.fields.is_empty() {
            return Err(SchemaError::EmptySchema(self.entity.clone()));
        }

        if let Some(bad) = self.fields.keys().find(|name| !is_identifier(name)) {
            return Err(SchemaError::InvalidIdentifier(bad.clone()));
        }

        // Emitted verbatim in ORDER BY, so it must be one of the vetted names
        if !self.fields.contains_key(&self.default_sort) {
            return Err(SchemaError::UnknownSortColumn {
                entity: self.entity.clone(),
                column: self.default_sort.clone(),
            });
        }

        Ok(())
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Tiebreaker column used when a sort request is absent or invalid
    pub fn default_sort(&self) -> &str {
        &self.default_sort
    }

    /// Looks up the kind of an allowed field
    pub fn kind(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Allowed fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for `FieldSchema`
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    entity: String,
    default_sort: String,
    fields: BTreeMap<String, FieldKind>,
}

impl SchemaBuilder {
    /// Adds a numeric field
    pub fn numeric(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Numeric)
    }

    /// Adds a text field
    pub fn text(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Text)
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// Sets the tiebreaker sort column (defaults to `id`)
    pub fn default_sort(mut self, column: impl Into<String>) -> Self {
        self.default_sort = column.into();
        self
    }

    pub fn build(self) -> SchemaResult<FieldSchema> {
        FieldSchema::new(self.entity, self.fields, self.default_sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> FieldSchema {
        FieldSchema::builder("users")
            .numeric("id")
            .text("name")
            .numeric("age")
            .build()
            .unwrap()
    }

    #[test]
    fn test_schema_structure_valid() {
        let schema = sample_schema();
        assert_eq!(schema.entity(), "users");
        assert_eq!(schema.default_sort(), "id");
        assert_eq!(schema.kind("age"), Some(FieldKind::Numeric));
        assert_eq!(schema.kind("name"), Some(FieldKind::Text));
        assert_eq!(schema.kind("password"), None);
    }

    #[test]
    fn test_empty_schema_rejected() {
        let result = FieldSchema::builder("users").build();
        assert!(matches!(result, Err(SchemaError::EmptySchema(_))));
    }

    #[test]
    fn test_invalid_field_name_rejected() {
        let result = FieldSchema::builder("users")
            .numeric("id")
            .text("name; DROP TABLE users")
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidIdentifier(_))));

        let result = FieldSchema::builder("users").numeric("id").text("`name`").build();
        assert!(matches!(result, Err(SchemaError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_default_sort_must_be_field() {
        let result = FieldSchema::builder("rank").text("rankDate").build();
        assert!(matches!(result, Err(SchemaError::UnknownSortColumn { .. })));

        let schema = FieldSchema::builder("rank")
            .text("rankDate")
            .default_sort("rankDate")
            .build()
            .unwrap();
        assert_eq!(schema.default_sort(), "rankDate");
    }

    #[test]
    fn test_fields_sorted_by_name() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["age", "id", "name"]);
    }

    #[test]
    fn test_deserialize_validates() {
        let schema: FieldSchema = serde_json::from_str(
            r#"{"entity":"read","fields":{"id":"numeric","region":"text"}}"#,
        )
        .unwrap();
        assert_eq!(schema.default_sort(), "id");
        assert_eq!(schema.len(), 2);

        let bad = serde_json::from_str::<FieldSchema>(
            r#"{"entity":"read","fields":{"id":"numeric","a b":"text"}}"#,
        );
        assert!(bad.is_err());

        let bad_kind = serde_json::from_str::<FieldSchema>(
            r#"{"entity":"read","fields":{"id":"integer"}}"#,
        );
        assert!(bad_kind.is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let schema = sample_schema();
        let json = serde_json::to_string(&schema).unwrap();
        let back: FieldSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("obtainedCredits"));
        assert!(is_identifier("_id"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
