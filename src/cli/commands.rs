//! CLI command implementations
//!
//! Each command loads configuration, builds a `Session` (schemas plus one
//! `FilterCompiler` per entity) and writes JSON responses to stdout. Logs go
//! to stderr so stdout stays machine-readable.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::observability::{Event, LogSink, Logger};
use crate::rsql::OperatorTable;
use crate::schema::SchemaRegistry;
use crate::sql::{CompilerOptions, FilterCompiler};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response, CompileRequest};

/// Loaded schemas and their compilers
#[derive(Debug)]
pub struct Session {
    registry: SchemaRegistry,
    compilers: BTreeMap<String, FilterCompiler>,
}

impl Session {
    /// Builds a session from configuration
    pub fn open(config: &Config, logger: &Logger) -> CliResult<Self> {
        let mut registry = if config.builtin_schemas {
            SchemaRegistry::with_builtin()?
        } else {
            SchemaRegistry::new()
        };

        if let Some(dir) = config.schema_path() {
            let loaded = registry.load_dir(&dir)?.to_string();
            let dir = dir.display().to_string();
            logger.event(
                Event::SchemasLoaded,
                &[("count", loaded.as_str()), ("schema_dir", dir.as_str())],
            );
        }

        if registry.is_empty() {
            return Err(CliError::config_error("No schemas loaded"));
        }

        let count = registry.len().to_string();
        let entities = registry.entities().collect::<Vec<_>>().join(",");
        logger.event(
            Event::SchemasLoaded,
            &[("count", count.as_str()), ("entities", entities.as_str())],
        );

        Ok(Self::from_registry(
            registry,
            config.compiler_options(),
            logger.clone(),
        ))
    }

    /// Builds one compiler per registered entity
    pub fn from_registry(registry: SchemaRegistry, options: CompilerOptions, logger: Logger) -> Self {
        let operators = Arc::new(OperatorTable::standard());
        let compilers = registry
            .schemas()
            .map(|schema| {
                let compiler = FilterCompiler::new(Arc::clone(schema), Arc::clone(&operators))
                    .with_options(options)
                    .with_logger(logger.clone());
                (schema.entity().to_string(), compiler)
            })
            .collect();

        Self {
            registry,
            compilers,
        }
    }

    pub fn compiler(&self, entity: &str) -> CliResult<&FilterCompiler> {
        self.compilers
            .get(entity)
            .ok_or_else(|| CliError::unknown_entity(entity))
    }

    /// Compiles one request into response data
    pub fn compile(&self, request: &CompileRequest) -> CliResult<Value> {
        let compiler = self.compiler(&request.entity)?;

        let predicate = compiler.compile_filter(request.filter.as_deref())?;
        let order_by = compiler.order_by(request.sort_by.as_deref(), request.sort_dir.as_deref());

        let mut data = serde_json::to_value(&predicate)?;
        if let Some(obj) = data.as_object_mut() {
            obj.insert("order_by".to_string(), Value::String(order_by));
        }
        Ok(data)
    }

    /// Describes every loaded schema
    pub fn describe_schemas(&self) -> CliResult<Value> {
        let schemas = self
            .registry
            .schemas()
            .map(|schema| serde_json::to_value(schema.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json!({ "schemas": schemas }))
    }
}

/// Counts from one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub requests: usize,
    pub failed: usize,
}

/// Compiles every request line from `reader`, one response line each.
///
/// Bad requests and rejected filters produce error responses and the batch
/// continues; I/O failures stop it.
pub fn run_batch<R: BufRead, W: Write>(
    session: &Session,
    reader: R,
    writer: &mut W,
) -> CliResult<BatchSummary> {
    let mut summary = BatchSummary::default();

    for request in read_requests(reader) {
        summary.requests += 1;
        let outcome = request.and_then(|request| session.compile(&request));
        match outcome {
            Ok(data) => write_response(writer, data)?,
            Err(e) if e.is_request_error() => {
                summary.failed += 1;
                write_error(writer, e.code_str(), e.message())?;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Compile {
            config,
            entity,
            filter,
            sort_by,
            sort_dir,
        } => compile(
            config.as_deref(),
            &CompileRequest {
                entity,
                filter,
                sort_by,
                sort_dir,
            },
        ),
        Command::Batch { config } => batch(config.as_deref()),
        Command::Schemas { config } => schemas(config.as_deref()),
    }
}

/// Compile a single request and exit
pub fn compile(config_path: Option<&Path>, request: &CompileRequest) -> CliResult<()> {
    let session = boot(config_path)?;
    let mut stdout = io::stdout().lock();

    match session.compile(request) {
        Ok(data) => write_response(&mut stdout, data),
        Err(e) => {
            write_error(&mut stdout, e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Compile request lines from stdin until EOF
pub fn batch(config_path: Option<&Path>) -> CliResult<()> {
    let session = boot(config_path)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    run_batch(&session, stdin.lock(), &mut stdout)?;
    Ok(())
}

/// List loaded schemas
pub fn schemas(config_path: Option<&Path>) -> CliResult<()> {
    let session = boot(config_path)?;
    let mut stdout = io::stdout().lock();
    write_response(&mut stdout, session.describe_schemas()?)
}

/// Loads configuration, sets up logging and opens a session
fn boot(config_path: Option<&Path>) -> CliResult<Session> {
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let logger = Logger::new(config.log_level(), LogSink::Stderr);
    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    logger.event(
        Event::ConfigLoaded,
        &[("dialect", config.dialect.as_str()), ("source", source.as_str())],
    );

    Session::open(&config, &logger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Severity;
    use std::io::Cursor;

    fn session() -> Session {
        Session::open(&Config::default(), &Logger::discard()).unwrap()
    }

    fn request(entity: &str, filter: Option<&str>) -> CompileRequest {
        CompileRequest {
            entity: entity.to_string(),
            filter: filter.map(str::to_string),
            sort_by: None,
            sort_dir: None,
        }
    }

    #[test]
    fn test_compile_request() {
        let data = session()
            .compile(&CompileRequest {
                entity: "beread".into(),
                filter: Some("readNum=gt=100;category==tech".into()),
                sort_by: Some("readNum".into()),
                sort_dir: Some("desc".into()),
            })
            .unwrap();

        assert_eq!(data["where"], "(`readNum` > ? AND `category` = ?)");
        assert_eq!(data["parameters"], json!([100, "tech"]));
        assert_eq!(data["order_by"], " ORDER BY `readNum` DESC");
        assert_eq!(data["warnings"], json!([]));
    }

    #[test]
    fn test_unknown_entity() {
        let err = session().compile(&request("widget", None)).unwrap_err();
        assert_eq!(err.code_str(), "RSQLC_CLI_UNKNOWN_ENTITY");
    }

    #[test]
    fn test_rejected_filter_carries_compile_code() {
        let err = session()
            .compile(&request("user", Some("password==x")))
            .unwrap_err();
        assert_eq!(err.code_str(), "RSQL_UNKNOWN_FIELD");
    }

    #[test]
    fn test_run_batch_continues_after_errors() {
        let input = Cursor::new(
            [
                r#"{"entity":"read","filter":"region=in=(Beijing,HongKong)"}"#,
                r#"{"entity":"read","filter":"region=="}"#,
                r#"{"entity":"nope"}"#,
                r#"{"entity":"article","sort_by":"title"}"#,
            ]
            .join("\n"),
        );
        let mut out = Vec::new();
        let summary = run_batch(&session(), input, &mut out).unwrap();
        assert_eq!(summary, BatchSummary { requests: 4, failed: 2 });

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["data"]["where"], "`region` IN (?, ?)");
        assert_eq!(lines[1]["code"], "RSQL_SYNTAX_ERROR");
        assert_eq!(lines[2]["code"], "RSQLC_CLI_UNKNOWN_ENTITY");
        assert_eq!(lines[3]["data"]["where"], "1=1");
        assert_eq!(lines[3]["data"]["order_by"], " ORDER BY `title` ASC");
    }

    #[test]
    fn test_describe_schemas() {
        let data = session().describe_schemas().unwrap();
        let schemas = data["schemas"].as_array().unwrap();
        assert_eq!(schemas.len(), 5);
        assert_eq!(schemas[0]["entity"], "article");
        assert_eq!(schemas[0]["fields"]["id"], "numeric");
    }

    #[test]
    fn test_open_logs_schema_load() {
        let (logger, buffer) = Logger::memory(Severity::Info);
        Session::open(&Config::default(), &logger).unwrap();

        let records = buffer.records();
        assert_eq!(records[0]["event"], "SCHEMAS_LOADED");
        assert_eq!(records[0]["count"], "5");
    }
}
