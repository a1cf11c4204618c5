//! rsqlc - A strict, allowlist-enforcing RSQL to SQL compiler
//!
//! Filter text goes in; a WHERE fragment with `?` placeholders and an
//! ordered parameter list come out. Field names are checked against a
//! per-entity schema before they ever reach SQL.

pub mod cli;
pub mod observability;
pub mod rsql;
pub mod schema;
pub mod sql;
