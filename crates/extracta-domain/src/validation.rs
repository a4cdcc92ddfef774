//! Data validation against a [`Schema`]
//!
//! The validator is the authoritative contract with the caller: whatever a
//! provider dialect accepted, extracted data is only kept when it satisfies
//! the original schema.

use crate::schema::{AdditionalProperties, Combinator, NumericSchema, Schema, StringSchema};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Tolerance when checking `multipleOf` on floating point quotients
const MULTIPLE_EPSILON: f64 = 1e-9;

/// First constraint a value failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer of the failing value (empty for the root)
    pub path: String,
    /// What was violated
    pub message: String,
}

impl Violation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for Violation {}

/// Structural validator for JSON values
///
/// Compiled `pattern` regexes are cached and shared between clones.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    assert_formats: bool,
    patterns: Arc<RwLock<HashMap<String, Regex>>>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator {
    /// Create a validator that asserts `date-time` and `date` formats
    pub fn new() -> Self {
        Self {
            assert_formats: true,
            patterns: Arc::default(),
        }
    }

    /// Treat every `format` keyword as an annotation only
    pub fn without_format_assertion() -> Self {
        Self {
            assert_formats: false,
            patterns: Arc::default(),
        }
    }

    /// Validate `value` against `schema`, returning the first violation
    pub fn validate(&self, schema: &Schema, value: &Value) -> Result<(), Violation> {
        self.check(schema, value, "")
    }

    /// Whether `value` satisfies `schema`
    pub fn is_valid(&self, schema: &Schema, value: &Value) -> bool {
        self.validate(schema, value).is_ok()
    }

    fn pattern(&self, pattern: &str) -> Result<Regex, regex::Error> {
        let cached = self
            .patterns
            .read()
            .ok()
            .and_then(|patterns| patterns.get(pattern).cloned());
        if let Some(regex) = cached {
            return Ok(regex);
        }

        let regex = Regex::new(pattern)?;
        if let Ok(mut patterns) = self.patterns.write() {
            patterns.insert(pattern.to_string(), regex.clone());
        }
        Ok(regex)
    }

    fn check(&self, schema: &Schema, value: &Value, path: &str) -> Result<(), Violation> {
        if value.is_null() && schema.is_nullable() {
            return Ok(());
        }

        match schema {
            Schema::String(s) => match value {
                Value::String(text) => self.check_string(s, text, path),
                other => Err(type_mismatch(path, "string", other)),
            },
            Schema::Number(n) => match value {
                Value::Number(number) => check_numeric(n, number.as_f64().unwrap_or(f64::NAN), path),
                other => Err(type_mismatch(path, "number", other)),
            },
            Schema::Integer(n) => match value {
                Value::Number(number) if is_integral(number) => {
                    check_numeric(n, number.as_f64().unwrap_or(f64::NAN), path)
                }
                other => Err(type_mismatch(path, "integer", other)),
            },
            Schema::Boolean(_) => match value {
                Value::Bool(_) => Ok(()),
                other => Err(type_mismatch(path, "boolean", other)),
            },
            Schema::Null(_) => match value {
                Value::Null => Ok(()),
                other => Err(type_mismatch(path, "null", other)),
            },
            Schema::Array(a) => {
                let Value::Array(items) = value else {
                    return Err(type_mismatch(path, "array", value));
                };
                if let Some(min) = a.min_items {
                    if (items.len() as u64) < min {
                        return Err(Violation::new(
                            path,
                            format!("expected at least {} items, got {}", min, items.len()),
                        ));
                    }
                }
                if let Some(max) = a.max_items {
                    if items.len() as u64 > max {
                        return Err(Violation::new(
                            path,
                            format!("expected at most {} items, got {}", max, items.len()),
                        ));
                    }
                }
                if a.unique_items == Some(true) {
                    for (i, item) in items.iter().enumerate() {
                        if items[..i].contains(item) {
                            return Err(Violation::new(
                                &pointer(path, &i.to_string()),
                                "duplicate item in array requiring unique items",
                            ));
                        }
                    }
                }
                let Some(item_schema) = a.items.as_deref() else {
                    return Err(Violation::new(path, "array schema has no items"));
                };
                items.iter().enumerate().try_for_each(|(i, item)| {
                    self.check(item_schema, item, &pointer(path, &i.to_string()))
                })
            }
            Schema::Object(o) => {
                let Value::Object(entries) = value else {
                    return Err(type_mismatch(path, "object", value));
                };
                for name in o.required.iter().flatten() {
                    if !entries.contains_key(name) {
                        return Err(Violation::new(
                            path,
                            format!("missing required property '{}'", name),
                        ));
                    }
                }
                self.check_properties(o.properties.as_ref(), o.additional_properties.as_ref(), entries, path)
            }
            Schema::Union(u) => {
                if u.schemas.is_empty() {
                    return Err(Violation::new(
                        path,
                        format!("{} has no branches", u.combinator),
                    ));
                }
                match u.combinator {
                    Combinator::AllOf => u
                        .schemas
                        .iter()
                        .try_for_each(|branch| self.check(branch, value, path)),
                    Combinator::AnyOf => {
                        if u.schemas.iter().any(|branch| self.check(branch, value, path).is_ok()) {
                            Ok(())
                        } else {
                            Err(Violation::new(path, "value matches no anyOf branch"))
                        }
                    }
                    Combinator::OneOf => {
                        let matched = u
                            .schemas
                            .iter()
                            .filter(|branch| self.check(branch, value, path).is_ok())
                            .count();
                        if matched == 1 {
                            Ok(())
                        } else {
                            Err(Violation::new(
                                path,
                                format!("value must match exactly one oneOf branch, matched {}", matched),
                            ))
                        }
                    }
                }
            }
        }
    }

    fn check_string(&self, s: &StringSchema, text: &str, path: &str) -> Result<(), Violation> {
        if let Some(values) = &s.enum_values {
            if !values.iter().any(|allowed| allowed == text) {
                return Err(Violation::new(
                    path,
                    format!("'{}' is not one of {:?}", text, values),
                ));
            }
        }

        let length = text.chars().count() as u64;
        if let Some(min) = s.min_length {
            if length < min {
                return Err(Violation::new(
                    path,
                    format!("expected at least {} characters, got {}", min, length),
                ));
            }
        }
        if let Some(max) = s.max_length {
            if length > max {
                return Err(Violation::new(
                    path,
                    format!("expected at most {} characters, got {}", max, length),
                ));
            }
        }

        if let Some(pattern) = &s.pattern {
            let regex = self
                .pattern(pattern)
                .map_err(|e| Violation::new(path, format!("invalid pattern '{}': {}", pattern, e)))?;
            if !regex.is_match(text) {
                return Err(Violation::new(
                    path,
                    format!("'{}' does not match pattern '{}'", text, pattern),
                ));
            }
        }

        if self.assert_formats {
            let valid = match s.format.as_deref() {
                Some("date-time") => DateTime::parse_from_rfc3339(text).is_ok(),
                Some("date") => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
                _ => true,
            };
            if !valid {
                return Err(Violation::new(
                    path,
                    format!("'{}' is not a valid {}", text, s.format.as_deref().unwrap_or_default()),
                ));
            }
        }

        Ok(())
    }

    fn check_properties(
        &self,
        properties: Option<&std::collections::BTreeMap<String, Schema>>,
        additional: Option<&AdditionalProperties>,
        entries: &Map<String, Value>,
        path: &str,
    ) -> Result<(), Violation> {
        for (name, value) in entries {
            let child = pointer(path, name);
            match properties.and_then(|p| p.get(name)) {
                Some(schema) => self.check(schema, value, &child)?,
                None => match additional {
                    Some(AdditionalProperties::Allowed(false)) => {
                        return Err(Violation::new(
                            path,
                            format!("additional property '{}' is not allowed", name),
                        ));
                    }
                    Some(AdditionalProperties::Schema(schema)) => self.check(schema, value, &child)?,
                    Some(AdditionalProperties::Allowed(true)) | None => {}
                },
            }
        }
        Ok(())
    }
}

fn check_numeric(n: &NumericSchema, value: f64, path: &str) -> Result<(), Violation> {
    if let Some(min) = n.minimum {
        if value < min {
            return Err(Violation::new(path, format!("{} is less than minimum {}", value, min)));
        }
    }
    if let Some(max) = n.maximum {
        if value > max {
            return Err(Violation::new(path, format!("{} is greater than maximum {}", value, max)));
        }
    }
    if let Some(min) = n.exclusive_minimum {
        if value <= min {
            return Err(Violation::new(
                path,
                format!("{} must be greater than {}", value, min),
            ));
        }
    }
    if let Some(max) = n.exclusive_maximum {
        if value >= max {
            return Err(Violation::new(path, format!("{} must be less than {}", value, max)));
        }
    }
    if let Some(step) = n.multiple_of {
        let quotient = value / step;
        if !quotient.is_finite()
            || (quotient - quotient.round()).abs() > MULTIPLE_EPSILON * quotient.abs().max(1.0)
        {
            return Err(Violation::new(
                path,
                format!("{} is not a multiple of {}", value, step),
            ));
        }
    }
    Ok(())
}

fn is_integral(number: &serde_json::Number) -> bool {
    number.is_i64() || number.is_u64() || number.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn type_mismatch(path: &str, expected: &str, actual: &Value) -> Violation {
    let actual = match actual {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    Violation::new(path, format!("expected {}, got {}", expected, actual))
}

fn pointer(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, token.replace('~', "~0").replace('/', "~1"))
}
