//! Shared response decoder
//!
//! Turns a provider's raw reply text into data that satisfies the original
//! schema, or `None`. Decoding never fails with an error: an empty reply,
//! text that is not JSON and JSON that does not conform are all ordinary
//! "nothing extracted" outcomes.

use extracta_domain::{Schema, SchemaValidator};
use serde_json::Value;
use tracing::debug;

/// Decode `content` against `schema`
///
/// When the root schema is exactly a non-nullable string, the raw text is the
/// candidate value and no JSON parsing is attempted.
pub fn decode_response(
    schema: &Schema,
    content: Option<&str>,
    validator: &SchemaValidator,
) -> Option<Value> {
    let content = content.filter(|text| !text.is_empty())?;

    let candidate = if matches!(schema, Schema::String(s) if !s.nullable) {
        Value::String(content.to_string())
    } else {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => value,
            Err(e) => {
                debug!("Reply is not valid JSON: {}", e);
                return None;
            }
        }
    };

    match validator.validate(schema, &candidate) {
        Ok(()) => Some(candidate),
        Err(violation) => {
            debug!("Reply does not satisfy schema: {}", violation);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        Schema::from_value(&value).unwrap()
    }

    fn person() -> Schema {
        schema(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "number" }
            },
            "required": ["name"]
        }))
    }

    #[test]
    fn test_valid_json_reply() {
        let data = decode_response(&person(), Some(r#"{"name":"John"}"#), &SchemaValidator::new());
        assert_eq!(data, Some(json!({ "name": "John" })));
    }

    #[test]
    fn test_schema_mismatch_is_none() {
        let data = decode_response(&person(), Some(r#"{"name":"John","age":"18"}"#), &SchemaValidator::new());
        assert_eq!(data, None);
    }

    #[test]
    fn test_missing_or_empty_content_is_none() {
        let validator = SchemaValidator::new();
        assert_eq!(decode_response(&person(), None, &validator), None);
        assert_eq!(decode_response(&person(), Some(""), &validator), None);
    }

    #[test]
    fn test_non_json_is_none() {
        let data = decode_response(&person(), Some("Sorry, I cannot help"), &SchemaValidator::new());
        assert_eq!(data, None);
    }

    #[test]
    fn test_string_root_uses_raw_text() {
        let s = schema(json!({ "type": "string" }));
        let data = decode_response(&s, Some("Hello, world!"), &SchemaValidator::new());
        assert_eq!(data, Some(json!("Hello, world!")));
    }

    #[test]
    fn test_string_root_constraints_apply() {
        let s = schema(json!({ "type": "string", "maxLength": 3 }));
        assert_eq!(decode_response(&s, Some("Hello"), &SchemaValidator::new()), None);
    }

    #[test]
    fn test_nullable_string_root_is_parsed() {
        let s = schema(json!({ "type": ["string", "null"] }));
        let validator = SchemaValidator::new();
        assert_eq!(decode_response(&s, Some("null"), &validator), Some(Value::Null));
        assert_eq!(decode_response(&s, Some(r#""hi""#), &validator), Some(json!("hi")));
        assert_eq!(decode_response(&s, Some("hi"), &validator), None);
    }

    #[test]
    fn test_falsy_values_are_kept() {
        let validator = SchemaValidator::new();
        let b = schema(json!({ "type": "boolean" }));
        let n = schema(json!({ "type": "integer" }));
        assert_eq!(decode_response(&b, Some("false"), &validator), Some(json!(false)));
        assert_eq!(decode_response(&n, Some("0"), &validator), Some(json!(0)));
    }
}
