//! Field schemas for rsqlc
//!
//! A schema is the allowlist a filter is compiled against. Only names it
//! contains ever reach SQL text, and it decides how literal arguments are
//! coerced before they are bound.
//!
//! # Design Principles
//!
//! - Allowlist only, no pass-through of unknown names
//! - Field names are plain identifiers, validated at load time
//! - Registration is write-once per entity

mod builtin;
mod errors;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{is_identifier, FieldKind, FieldSchema, SchemaBuilder};
