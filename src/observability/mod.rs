//! Observability for rsqlc
//!
//! - Structured logging (JSON lines)
//! - Typed events with fixed severities
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on compilation results
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```
//! use rsqlc::observability::{Event, Logger, Severity};
//!
//! let (logger, buffer) = Logger::memory(Severity::Trace);
//! logger.event(Event::SchemasLoaded, &[("count", "5")]);
//! assert_eq!(buffer.records()[0]["event"], "SCHEMAS_LOADED");
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{LogBuffer, LogSink, Logger, Severity};

impl Logger {
    /// Log a typed event at its own severity
    pub fn event(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(event.severity(), event.as_str(), fields);
    }
}
