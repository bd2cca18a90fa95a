//! JSON Schema generation for CLI output types.
//!
//! Schemas are generated with schemars and exported via the `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// All JSON schemas for commands that support --json output.
/// BTreeMap keeps the output ordering stable.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    schemas.insert(
        "generate",
        schema_for!(crate::cmd::generate::GenerateJsonOutput),
    );

    schemas
}

pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
