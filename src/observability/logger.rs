//! Structured JSON logger for rsqlc
//!
//! - Structured logs (JSON)
//! - Deterministic key ordering
//! - Explicit severity levels
//! - One log line = one event
//! - Synchronous, no buffering
//!
//! The logger is a value handed to whoever needs it; there is no global
//! instance. Tests use a `Memory` sink and read the lines back.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Parses a level name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(Severity::Trace),
            "info" => Some(Severity::Info),
            "warn" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared line buffer filled by a `Memory` sink
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: String) {
        // A poisoned buffer only loses log lines
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }

    /// Captured lines, without trailing newlines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Captured lines parsed back as JSON
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

/// Where log lines go
#[derive(Debug, Clone)]
pub enum LogSink {
    Stdout,
    Stderr,
    Memory(LogBuffer),
    Discard,
}

/// A structured logger that outputs JSON lines
#[derive(Debug, Clone)]
pub struct Logger {
    min_severity: Severity,
    sink: LogSink,
}

impl Default for Logger {
    /// INFO and above to stderr
    fn default() -> Self {
        Self::new(Severity::Info, LogSink::Stderr)
    }
}

impl Logger {
    pub fn new(min_severity: Severity, sink: LogSink) -> Self {
        Self { min_severity, sink }
    }

    /// Logger that drops everything
    pub fn discard() -> Self {
        Self::new(Severity::Error, LogSink::Discard)
    }

    /// Logger capturing every line into the returned buffer
    pub fn memory(min_severity: Severity) -> (Self, LogBuffer) {
        let buffer = LogBuffer::new();
        (Self::new(min_severity, LogSink::Memory(buffer.clone())), buffer)
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    /// Returns true if a line at `severity` would be written
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity && !matches!(self.sink, LogSink::Discard)
    }

    /// Log an event with the given severity and fields
    ///
    /// Fields are output in deterministic order (alphabetical by key)
    pub fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !self.enabled(severity) {
            return;
        }

        let line = format_line(severity, event, fields);
        match &self.sink {
            LogSink::Stdout => write_line(&mut io::stdout(), &line),
            LogSink::Stderr => write_line(&mut io::stderr(), &line),
            LogSink::Memory(buffer) => buffer.push(line),
            LogSink::Discard => {}
        }
    }

    /// Log at TRACE level
    pub fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }
}

fn write_line<W: Write>(writer: &mut W, line: &str) {
    // Write atomically (one syscall); logging never fails the caller
    let mut output = String::with_capacity(line.len() + 1);
    output.push_str(line);
    output.push('\n');
    let _ = writer.write_all(output.as_bytes());
    let _ = writer.flush();
}

/// Renders one log line without the trailing newline
fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(256);

    output.push('{');

    // Always output event first
    output.push_str("\"event\":\"");
    escape_json_string(&mut output, event);
    output.push('"');

    // Then severity
    output.push_str(",\"severity\":\"");
    output.push_str(severity.as_str());
    output.push('"');

    // Sort fields alphabetically for deterministic output
    let mut sorted_fields: Vec<_> = fields.iter().collect();
    sorted_fields.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted_fields {
        output.push_str(",\"");
        escape_json_string(&mut output, key);
        output.push_str("\":\"");
        escape_json_string(&mut output, value);
        output.push('"');
    }

    output.push('}');
    output
}

/// Escape special characters for JSON strings
fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_severity_from_name() {
        assert_eq!(Severity::from_name("warn"), Some(Severity::Warn));
        assert_eq!(Severity::from_name("INFO"), Some(Severity::Info));
        assert_eq!(Severity::from_name("verbose"), None);
    }

    #[test]
    fn test_log_json_format() {
        let output = format_line(Severity::Info, "TEST_EVENT", &[]);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "TEST_EVENT");
        assert_eq!(parsed["severity"], "INFO");
    }

    #[test]
    fn test_log_deterministic_ordering() {
        let output1 = format_line(
            Severity::Info,
            "TEST",
            &[("zebra", "1"), ("apple", "2"), ("mango", "3")],
        );
        let output2 = format_line(
            Severity::Info,
            "TEST",
            &[("apple", "2"), ("mango", "3"), ("zebra", "1")],
        );
        assert_eq!(output1, output2);

        let apple_pos = output1.find("apple").unwrap();
        let mango_pos = output1.find("mango").unwrap();
        let zebra_pos = output1.find("zebra").unwrap();
        assert!(apple_pos < mango_pos);
        assert!(mango_pos < zebra_pos);
    }

    #[test]
    fn test_log_escapes_special_chars() {
        let output = format_line(
            Severity::Info,
            "TEST",
            &[("filter", "name==\"x\"\nline2")],
        );
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["filter"], "name==\"x\"\nline2");
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_memory_sink_respects_min_severity() {
        let (logger, buffer) = Logger::memory(Severity::Warn);
        logger.info("SKIPPED", &[]);
        logger.warn("KEPT", &[("field", "age")]);
        logger.error("ALSO_KEPT", &[]);

        let records = buffer.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"], "KEPT");
        assert_eq!(records[0]["field"], "age");
        assert_eq!(records[1]["severity"], "ERROR");
    }

    #[test]
    fn test_discard_is_never_enabled() {
        let logger = Logger::discard();
        assert!(!logger.enabled(Severity::Error));
        logger.error("NOTHING", &[]);
    }
}
