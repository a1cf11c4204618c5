//! Built-in entity schemas
//!
//! The entities served by the reading-analytics backend. Every entity sorts
//! by `id` when a sort request is absent or rejected.

use super::errors::SchemaResult;
use super::types::FieldSchema;

fn article() -> SchemaResult<FieldSchema> {
    FieldSchema::builder("article")
        .numeric("id")
        .numeric("timestamp")
        .text("aid")
        .text("title")
        .text("category")
        .text("abstract")
        .text("language")
        .build()
}

fn beread() -> SchemaResult<FieldSchema> {
    FieldSchema::builder("beread")
        .numeric("id")
        .numeric("timestamp")
        .text("aid")
        .text("category")
        .numeric("readNum")
        .numeric("commentNum")
        .numeric("agreeNum")
        .numeric("shareNum")
        .build()
}

fn popular_rank() -> SchemaResult<FieldSchema> {
    FieldSchema::builder("popularrank")
        .numeric("id")
        .numeric("timestamp")
        .text("temporalGranularity")
        .text("rankDate")
        .build()
}

fn read() -> SchemaResult<FieldSchema> {
    FieldSchema::builder("read")
        .numeric("id")
        .numeric("timestamp")
        .text("uid")
        .text("aid")
        .text("region")
        .numeric("readTimeLength")
        .text("agreeOrNot")
        .text("commentOrNot")
        .text("shareOrNot")
        .build()
}

fn user() -> SchemaResult<FieldSchema> {
    FieldSchema::builder("user")
        .numeric("id")
        .numeric("timestamp")
        .text("uid")
        .text("name")
        .text("gender")
        .text("email")
        .text("phone")
        .text("dept")
        .text("grade")
        .text("language")
        .text("region")
        .text("role")
        .text("preferTags")
        .numeric("obtainedCredits")
        .build()
}

/// All built-in schemas
pub(crate) fn all() -> SchemaResult<Vec<FieldSchema>> {
    Ok(vec![article()?, beread()?, popular_rank()?, read()?, user()?])
}
