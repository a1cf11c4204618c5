//! CLI module for rsqlc
//!
//! Provides command-line interface for:
//! - compile: One-shot filter and sort compilation
//! - batch: JSON request lines from stdin, one response line each
//! - schemas: List loaded entity schemas

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{batch, compile, run, run_batch, run_command, schemas, BatchSummary, Session};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_requests, write_error, write_response, CompileRequest};
