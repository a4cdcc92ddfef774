//! Gemini response schema dialect
//!
//! Gemini describes structured output with an enum-tagged OpenAPI subset:
//! one `type` per node, an explicit `nullable` flag and no unions. Unions are
//! therefore collapsed according to a fixed policy:
//!
//! - a two-branch union where exactly one branch is `null` becomes the other
//!   branch marked `nullable`
//! - `allOf` merges the `properties` and `required` of its object branches
//! - anything else becomes its first branch, with the alternatives noted in
//!   the description and `nullable` set explicitly
//!
//! The collapse is lossy. Replies are still validated against the original
//! schema, which stays authoritative.

use crate::CompileError;
use extracta_domain::{Combinator, Schema, UnionSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Only string format Gemini accepts besides `enum`
const DATE_TIME_FORMAT: &str = "date-time";

/// Type tag of a Gemini schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    /// `STRING`
    String,
    /// `NUMBER`
    Number,
    /// `INTEGER`
    Integer,
    /// `BOOLEAN`
    Boolean,
    /// `ARRAY`
    Array,
    /// `OBJECT`
    Object,
}

/// A Gemini `responseSchema` node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiSchema {
    /// Node type
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    /// Format hint (`enum`, `date-time`, `double`, `int32`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether `null` is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Allowed string values
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Item schema for arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<GeminiSchema>>,
    /// Minimum number of array items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum number of array items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Object properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, GeminiSchema>>,
    /// Required object properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl GeminiSchema {
    fn new(schema_type: SchemaType, description: Option<String>) -> Self {
        Self {
            schema_type,
            format: None,
            description,
            nullable: None,
            enum_values: None,
            items: None,
            min_items: None,
            max_items: None,
            properties: None,
            required: None,
        }
    }

    fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    fn nullable_if(mut self, nullable: bool) -> Self {
        if nullable {
            self.nullable = Some(true);
        }
        self
    }

    /// JSON form sent as `generationConfig.responseSchema`
    pub fn to_value(&self) -> Value {
        // Field types are all plain JSON, serialization cannot fail
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Compile `schema` to the Gemini dialect
pub fn compile(schema: &Schema) -> Result<GeminiSchema, CompileError> {
    match schema {
        Schema::String(s) => {
            let mut out = GeminiSchema::new(SchemaType::String, s.description.clone());
            if let Some(values) = &s.enum_values {
                out = out.with_format("enum");
                out.enum_values = Some(values.clone());
            } else if s.format.as_deref() == Some(DATE_TIME_FORMAT) {
                out = out.with_format(DATE_TIME_FORMAT);
            }
            Ok(out.nullable_if(s.nullable))
        }
        Schema::Number(n) => Ok(GeminiSchema::new(SchemaType::Number, n.description.clone())
            .with_format("double")
            .nullable_if(n.nullable)),
        Schema::Integer(n) => Ok(GeminiSchema::new(SchemaType::Integer, n.description.clone())
            .with_format("int32")
            .nullable_if(n.nullable)),
        Schema::Boolean(b) => {
            Ok(GeminiSchema::new(SchemaType::Boolean, b.description.clone()).nullable_if(b.nullable))
        }
        Schema::Null(n) => {
            let description = n
                .description
                .clone()
                .unwrap_or_else(|| "Must be null".to_string());
            Ok(GeminiSchema::new(SchemaType::String, Some(description)).nullable_if(true))
        }
        Schema::Array(a) => {
            let items = a
                .items
                .as_deref()
                .ok_or_else(|| CompileError::MissingItems(schema.to_value().to_string()))?;
            let mut out = GeminiSchema::new(SchemaType::Array, a.description.clone());
            out.items = Some(Box::new(compile(items)?));
            out.min_items = a.min_items;
            out.max_items = a.max_items;
            Ok(out.nullable_if(a.nullable))
        }
        Schema::Object(o) => {
            let mut properties = BTreeMap::new();
            for (name, property) in o.properties.iter().flatten() {
                properties.insert(name.clone(), compile(property)?);
            }
            let mut out = GeminiSchema::new(SchemaType::Object, o.description.clone());
            out.properties = Some(properties);
            out.required = o.required.clone();
            Ok(out.nullable_if(o.nullable))
        }
        Schema::Union(u) => compile_union(schema, u),
    }
}

fn compile_union(node: &Schema, union: &UnionSchema) -> Result<GeminiSchema, CompileError> {
    let branches = union.schemas.as_slice();
    let Some((first, rest)) = branches.split_first() else {
        return Err(CompileError::EmptyUnion {
            combinator: union.combinator,
            node: node.to_value().to_string(),
        });
    };

    if let [a, b] = branches {
        let value = match (a.is_null(), b.is_null()) {
            (false, true) => Some(a),
            (true, false) => Some(b),
            _ => None,
        };
        if let Some(value) = value {
            let mut compiled = compile(value)?.nullable_if(true);
            if compiled.description.is_none() {
                compiled.description = union.description.clone();
            }
            return Ok(compiled);
        }
    }

    if union.combinator == Combinator::AllOf {
        return merge_objects(union);
    }

    let mut primary = compile(first)?;
    if rest.is_empty() {
        if primary.description.is_none() {
            primary.description = union.description.clone();
        }
        return Ok(primary);
    }

    let alternatives = rest.iter().map(type_tag).collect::<Vec<_>>().join(", ");
    let base = primary.description.take().or_else(|| union.description.clone());
    primary.description = Some(match base {
        Some(description) => format!("{} (Alternative types: {})", description, alternatives),
        None => format!("One of multiple types: {}, {}", type_tag(first), alternatives),
    });

    let accepts_null = primary.nullable == Some(true) || rest.iter().any(Schema::is_null);
    primary.nullable = Some(accepts_null);
    Ok(primary)
}

/// `allOf` as object composition; non-object branches are ignored
fn merge_objects(union: &UnionSchema) -> Result<GeminiSchema, CompileError> {
    let mut properties = BTreeMap::new();
    let mut required = Vec::new();

    for branch in &union.schemas {
        if let Schema::Object(object) = branch {
            for (name, property) in object.properties.iter().flatten() {
                properties.insert(name.clone(), compile(property)?);
            }
            required.extend(object.required.iter().flatten().cloned());
        }
    }

    let mut out = GeminiSchema::new(SchemaType::Object, union.description.clone());
    out.properties = Some(properties);
    out.required = Some(required);
    Ok(out)
}

fn type_tag(schema: &Schema) -> &'static str {
    match schema {
        Schema::Object(_) | Schema::Union(_) => "complex schema",
        other => other.type_name().unwrap_or("complex schema"),
    }
}
