//! Embedded JSON Schema contracts for block and category definition files.
//!
//! Every definition is checked against the contract before it is deserialized,
//! so a malformed unit is reported with every violation at once instead of
//! serde's first error.

use anyhow::{Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::{Value, json};

/// Allowed characters for block and category ids; ids end up in URLs.
pub const ID_PATTERN: &str = "^[A-Za-z0-9_.-]+$";

/// Compiled validators for the two definition file kinds.
pub struct DefinitionContract {
    block: JSONSchema,
    category: JSONSchema,
}

impl DefinitionContract {
    /// Compile the built-in contracts.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            block: compile(&block_schema(), "block definition")?,
            category: compile(&category_schema(), "category metadata")?,
        })
    }

    /// Validate a block definition; returns every violation as one message.
    pub fn check_block(&self, value: &Value) -> std::result::Result<(), String> {
        check(&self.block, value)
    }

    pub fn check_category(&self, value: &Value) -> std::result::Result<(), String> {
        check(&self.category, value)
    }
}

fn compile(schema: &Value, label: &str) -> Result<JSONSchema> {
    JSONSchema::compile(schema).map_err(|err| anyhow!("compiling {label} contract: {err}"))
}

fn check(schema: &JSONSchema, value: &Value) -> std::result::Result<(), String> {
    if let Err(errors) = schema.validate(value) {
        let details = errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    err.to_string()
                } else {
                    format!("{pointer}: {err}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        return Err(details);
    }
    Ok(())
}

fn block_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "block definition",
        "type": "object",
        "required": ["metadata", "render"],
        "additionalProperties": false,
        "properties": {
            "metadata": {
                "type": "object",
                "required": ["id", "name", "description"],
                "additionalProperties": false,
                "properties": {
                    "id": {"type": "string", "pattern": ID_PATTERN},
                    "name": {"type": "string", "minLength": 1},
                    "description": {"type": "string"},
                    "link": {"type": "string"},
                    "photo": {"type": "string"},
                    "video": {"type": "string"}
                }
            },
            "render": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "source": {"type": "string"},
                    "path": {"type": "string", "minLength": 1},
                    "language": {"type": "string", "minLength": 1}
                },
                "oneOf": [
                    {"required": ["source"]},
                    {"required": ["path"]}
                ]
            }
        }
    })
}

fn category_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "category metadata",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "id": {"type": "string", "pattern": ID_PATTERN},
            "title": {"type": "string", "minLength": 1},
            "description": {"type": "string"}
        }
    })
}
