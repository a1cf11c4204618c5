//! Observability events for rsqlc
//!
//! Events are explicit and typed. Each one carries the severity it is
//! logged at, so call sites never pick a level by hand.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schemas loaded
    SchemasLoaded,

    // Compilation
    /// Filter compiled to a predicate
    FilterCompiled,
    /// Filter rejected with a compile error
    FilterRejected,
    /// Numeric field argument bound as text
    CoercionFallback,
    /// Sort request absent or invalid, default column used
    SortDefaulted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::FilterCompiled => "FILTER_COMPILED",
            Event::FilterRejected => "FILTER_REJECTED",
            Event::CoercionFallback => "COERCION_FALLBACK",
            Event::SortDefaulted => "SORT_DEFAULTED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::FilterCompiled | Event::SortDefaulted => Severity::Trace,
            Event::ConfigLoaded | Event::SchemasLoaded => Severity::Info,
            Event::FilterRejected | Event::CoercionFallback => Severity::Warn,
        }
    }

    pub fn all() -> [Event; 6] {
        [
            Event::ConfigLoaded,
            Event::SchemasLoaded,
            Event::FilterCompiled,
            Event::FilterRejected,
            Event::CoercionFallback,
            Event::SortDefaulted,
        ]
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        for event in Event::all() {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_rejections_are_warnings() {
        assert_eq!(Event::FilterRejected.severity(), Severity::Warn);
        assert_eq!(Event::CoercionFallback.severity(), Severity::Warn);
        assert_eq!(Event::FilterCompiled.severity(), Severity::Trace);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::SchemasLoaded), "SCHEMAS_LOADED");
    }
}
