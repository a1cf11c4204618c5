//! Configuration file
//!
//! ```json
//! {
//!   "schema_dir": "./schemas",
//!   "builtin_schemas": true,
//!   "dialect": "mysql",
//!   "max_depth": 64,
//!   "log_level": "info"
//! }
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::rsql::{DEFAULT_MAX_DEPTH, MAX_NESTING_DEPTH};
use crate::sql::{CompilerOptions, Dialect};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of `*.json` schema files (optional)
    #[serde(default)]
    pub schema_dir: Option<String>,

    /// Register the built-in entities (default: true)
    #[serde(default = "default_builtin_schemas")]
    pub builtin_schemas: bool,

    /// Identifier quoting: "mysql" or "ansi" (default: "mysql")
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Nested group limit (default: 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_builtin_schemas() -> bool {
    true
}
fn default_dialect() -> String {
    "mysql".to_string()
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: None,
            builtin_schemas: default_builtin_schemas(),
            dialect: default_dialect(),
            max_depth: default_max_depth(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse(&content)?;

        // Relative schema_dir is resolved against the config file
        if let Some(dir) = config.schema_dir.as_deref() {
            let dir = Path::new(dir);
            if dir.is_relative() {
                if let Some(parent) = path.parent() {
                    config.schema_dir = Some(parent.join(dir).display().to_string());
                }
            }
        }

        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if Dialect::from_name(&self.dialect).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid dialect: '{}'. Expected 'mysql' or 'ansi'.",
                self.dialect
            )));
        }

        if self.max_depth == 0 || self.max_depth >= MAX_NESTING_DEPTH {
            return Err(CliError::config_error(format!(
                "max_depth must be between 1 and {}",
                MAX_NESTING_DEPTH - 1
            )));
        }

        if Severity::from_name(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            )));
        }

        if !self.builtin_schemas && self.schema_dir.is_none() {
            return Err(CliError::config_error(
                "No schemas configured: set schema_dir or enable builtin_schemas",
            ));
        }

        Ok(())
    }

    pub fn schema_path(&self) -> Option<PathBuf> {
        self.schema_dir.as_ref().map(PathBuf::from)
    }

    pub fn dialect(&self) -> Dialect {
        Dialect::from_name(&self.dialect).unwrap_or_default()
    }

    pub fn log_level(&self) -> Severity {
        Severity::from_name(&self.log_level).unwrap_or(Severity::Info)
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            dialect: self.dialect(),
            max_depth: self.max_depth,
        }
    }
}
