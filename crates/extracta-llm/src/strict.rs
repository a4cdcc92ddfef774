//! Strict JSON Schema dialect
//!
//! OpenAI and Mistral accept full JSON Schema unions, so the schema passes
//! through unchanged once the two shapes no dialect can send are ruled out.

use crate::CompileError;
use extracta_domain::{AdditionalProperties, Schema};
use serde_json::Value;

/// Compile `schema` to its JSON Schema wire form
pub fn compile(schema: &Schema) -> Result<Value, CompileError> {
    check(schema)?;
    Ok(schema.to_value())
}

fn check(schema: &Schema) -> Result<(), CompileError> {
    match schema {
        Schema::Array(array) => match &array.items {
            Some(items) => check(items),
            None => Err(CompileError::MissingItems(schema.to_value().to_string())),
        },
        Schema::Object(object) => {
            for property in object.properties.iter().flat_map(|p| p.values()) {
                check(property)?;
            }
            if let Some(AdditionalProperties::Schema(extra)) = &object.additional_properties {
                check(extra)?;
            }
            Ok(())
        }
        Schema::Union(union) => {
            if union.schemas.is_empty() {
                return Err(CompileError::EmptyUnion {
                    combinator: union.combinator,
                    node: schema.to_value().to_string(),
                });
            }
            union.schemas.iter().try_for_each(check)
        }
        Schema::String(_)
        | Schema::Number(_)
        | Schema::Integer(_)
        | Schema::Boolean(_)
        | Schema::Null(_) => Ok(()),
    }
}
