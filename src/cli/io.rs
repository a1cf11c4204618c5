//! JSON I/O handling for CLI
//!
//! - Input: one JSON request object per line
//! - Output: one JSON response object per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde::Deserialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// One batch request line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileRequest {
    pub entity: String,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_dir: Option<String>,
}

/// Parses one request line
pub fn parse_request(line: &str) -> CliResult<CompileRequest> {
    serde_json::from_str(line).map_err(|e| CliError::bad_request(format!("Invalid request: {}", e)))
}

/// Reads request lines, skipping blank ones.
///
/// Read failures are fatal; malformed lines are yielded as request errors.
pub fn read_requests<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<CompileRequest>> {
    reader.lines().filter_map(|line| match line {
        Err(e) => Some(Err(CliError::from(e))),
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(parse_request(&line)),
    })
}

/// Write a success response line
pub fn write_response<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

/// Write an error response line
pub fn write_error<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
