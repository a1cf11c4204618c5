//! SQL generation for rsqlc
//!
//! Turns parsed filters into parameterized WHERE fragments and sort
//! requests into ORDER BY fragments, both checked against a `FieldSchema`.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use rsqlc::rsql::OperatorTable;
//! use rsqlc::schema::FieldSchema;
//! use rsqlc::sql::FilterCompiler;
//!
//! let schema = FieldSchema::builder("users").numeric("id").text("name").build().unwrap();
//! let compiler = FilterCompiler::new(Arc::new(schema), Arc::new(OperatorTable::standard()));
//!
//! let predicate = compiler.compile_filter(Some("name==John;id=gt=10")).unwrap();
//! assert_eq!(predicate.where_fragment(), "(`name` = ? AND `id` > ?)");
//! assert_eq!(compiler.order_by(Some("name"), Some("desc")), " ORDER BY `name` DESC");
//! ```

mod compiler;
mod dialect;
mod order;
mod predicate;

pub use compiler::{compile, compile_with_dialect};
pub use dialect::Dialect;
pub use order::{build_order_by, SortDirection, SortSpec};
pub use predicate::{CoercionWarning, CompiledPredicate, SqlParam, MATCH_ALL};

use std::sync::Arc;

use crate::observability::{Event, Logger};
use crate::rsql::{CompileResult, Node, OperatorTable, Parser, DEFAULT_MAX_DEPTH};
use crate::schema::FieldSchema;

/// Per-compiler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    pub dialect: Dialect,
    /// Nested group limit handed to the parser
    pub max_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Filter and sort compiler bound to one entity schema
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    schema: Arc<FieldSchema>,
    operators: Arc<OperatorTable>,
    options: CompilerOptions,
    logger: Logger,
}

impl FilterCompiler {
    /// Creates a compiler with default options and a discarding logger
    pub fn new(schema: Arc<FieldSchema>, operators: Arc<OperatorTable>) -> Self {
        Self {
            schema,
            operators,
            options: CompilerOptions::default(),
            logger: Logger::discard(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Parses filter text with this compiler's operator table and depth limit
    pub fn parse(&self, filter: &str) -> CompileResult<Option<Node>> {
        Parser::new(filter, &self.operators)
            .with_max_depth(self.options.max_depth)
            .parse()
    }

    /// Parses and compiles a filter. Absent or blank text matches everything.
    pub fn compile_filter(&self, filter: Option<&str>) -> CompileResult<CompiledPredicate> {
        let text = filter.unwrap_or("");
        let entity = self.schema.entity();

        let result = self
            .parse(text)
            .and_then(|ast| compile_with_dialect(ast.as_ref(), &self.schema, self.options.dialect));

        match &result {
            Ok(predicate) => {
                for warning in predicate.warnings() {
                    self.logger.event(
                        Event::CoercionFallback,
                        &[
                            ("entity", entity),
                            ("field", warning.field.as_str()),
                            ("value", warning.value.as_str()),
                        ],
                    );
                }
                let params = predicate.parameters().len().to_string();
                self.logger.event(
                    Event::FilterCompiled,
                    &[
                        ("entity", entity),
                        ("parameters", params.as_str()),
                        ("where", predicate.where_fragment()),
                    ],
                );
            }
            Err(err) => {
                let offset = err.offset().map(|o| o.to_string()).unwrap_or_default();
                self.logger.event(
                    Event::FilterRejected,
                    &[
                        ("code", err.code().code()),
                        ("entity", entity),
                        ("fragment", err.fragment()),
                        ("message", err.message()),
                        ("offset", offset.as_str()),
                    ],
                );
            }
        }

        result
    }

    /// ORDER BY fragment, falling back to the schema's default sort column
    pub fn order_by(&self, column: Option<&str>, direction: Option<&str>) -> String {
        let spec = SortSpec::from_params(column, direction);
        if !spec.is_valid_for(&self.schema) {
            self.logger.event(
                Event::SortDefaulted,
                &[
                    ("entity", self.schema.entity()),
                    ("requested", spec.column().unwrap_or("")),
                ],
            );
        }
        spec.to_order_by(
            &self.schema,
            self.schema.default_sort(),
            self.options.dialect,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Severity;
    use crate::rsql::CompileErrorCode;

    fn compiler() -> FilterCompiler {
        let schema = FieldSchema::builder("article")
            .numeric("id")
            .text("title")
            .text("category")
            .build()
            .unwrap();
        FilterCompiler::new(Arc::new(schema), Arc::new(OperatorTable::standard()))
    }

    #[test]
    fn test_absent_filter_matches_all() {
        let compiler = compiler();
        assert!(compiler.compile_filter(None).unwrap().is_match_all());
        assert!(compiler.compile_filter(Some("")).unwrap().is_match_all());
    }

    #[test]
    fn test_compile_filter_logs_outcome() {
        let (logger, buffer) = Logger::memory(Severity::Trace);
        let compiler = compiler().with_logger(logger);

        compiler.compile_filter(Some("category==tech")).unwrap();
        let err = compiler.compile_filter(Some("secret==1")).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::UnknownField);

        let records = buffer.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"], "FILTER_COMPILED");
        assert_eq!(records[0]["entity"], "article");
        assert_eq!(records[1]["event"], "FILTER_REJECTED");
        assert_eq!(records[1]["code"], "RSQL_UNKNOWN_FIELD");
        assert_eq!(records[1]["fragment"], "secret");
    }

    #[test]
    fn test_coercion_fallback_logged_at_warn() {
        let (logger, buffer) = Logger::memory(Severity::Warn);
        let compiler = compiler().with_logger(logger);

        let predicate = compiler.compile_filter(Some("id==abc")).unwrap();
        assert_eq!(predicate.warnings().len(), 1);

        let records = buffer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["event"], "COERCION_FALLBACK");
        assert_eq!(records[0]["value"], "abc");
    }

    #[test]
    fn test_max_depth_option() {
        let compiler = compiler().with_options(CompilerOptions {
            dialect: Dialect::Mysql,
            max_depth: 2,
        });
        assert!(compiler.compile_filter(Some("((id==1))")).is_ok());
        let err = compiler.compile_filter(Some("(((id==1)))")).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::NestingTooDeep);
    }

    #[test]
    fn test_order_by_uses_default_sort() {
        let (logger, buffer) = Logger::memory(Severity::Trace);
        let compiler = compiler().with_logger(logger);

        assert_eq!(compiler.order_by(Some("title"), None), " ORDER BY `title` ASC");
        assert!(buffer.records().is_empty());

        assert_eq!(compiler.order_by(Some("bogus"), Some("desc")), " ORDER BY id");
        assert_eq!(buffer.records()[0]["event"], "SORT_DEFAULTED");
    }

    #[test]
    fn test_ansi_options() {
        let compiler = compiler().with_options(CompilerOptions {
            dialect: Dialect::Ansi,
            ..CompilerOptions::default()
        });
        let predicate = compiler.compile_filter(Some("title=like=*rust*")).unwrap();
        assert_eq!(predicate.where_fragment(), "\"title\" LIKE ?");
        assert_eq!(compiler.order_by(Some("id"), Some("DESC")), " ORDER BY \"id\" DESC");
    }
}
