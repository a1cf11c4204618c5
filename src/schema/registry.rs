//! Schema registry
//!
//! Holds one `FieldSchema` per entity. Schemas come from the built-in set
//! and/or from `*.json` files in a schema directory, one file per entity.
//! Registration is write-once: an entity cannot be redefined.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::builtin;
use super::errors::{SchemaError, SchemaResult};
use super::types::FieldSchema;

/// In-memory registry of entity schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<FieldSchema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in entity schemas
    pub fn with_builtin() -> SchemaResult<Self> {
        let mut registry = Self::new();
        for schema in builtin::all()? {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Registers a schema. Fails if the entity is already present.
    pub fn register(&mut self, schema: FieldSchema) -> SchemaResult<()> {
        if self.schemas.contains_key(schema.entity()) {
            return Err(SchemaError::Duplicate(schema.entity().to_string()));
        }
        self.schemas
            .insert(schema.entity().to_string(), Arc::new(schema));
        Ok(())
    }

    /// Loads every `*.json` file in `dir`, in file name order.
    ///
    /// Returns the number of schemas loaded. A missing directory is an error.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| SchemaError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SchemaError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }
        Ok(paths.len())
    }

    /// Loads a single schema file
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let schema: FieldSchema =
            serde_json::from_str(&content).map_err(|e| SchemaError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.register(schema)
    }

    /// Gets a schema by entity name
    pub fn get(&self, entity: &str) -> Option<Arc<FieldSchema>> {
        self.schemas.get(entity).cloned()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.schemas.contains_key(entity)
    }

    /// Registered entity names in order
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// All schemas in entity order
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<FieldSchema>> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
