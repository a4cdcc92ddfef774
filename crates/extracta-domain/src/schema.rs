//! Schema model - the provider-agnostic description of expected output
//!
//! A [`Schema`] is a closed tagged union over the JSON Schema subset that
//! every provider compiler understands. Caller documents are parsed with
//! [`Schema::from_value`] and written back with [`Schema::to_value`].
//!
//! Two shapes are deliberately representable even though they are not
//! well-formed: an array schema without `items` and a union with an empty
//! branch list. Provider compilers report those with their own errors, and
//! [`Schema::check_well_formed`] rejects them up front.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Annotation keywords accepted anywhere and dropped during parsing
const ANNOTATIONS: &[&str] = &["$schema", "$id", "title"];

/// Errors raised while parsing or checking a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A schema node is not a JSON object
    #[error("Schema node must be a JSON object: {0}")]
    NotAnObject(String),

    /// No type, combinator or properties could be found on a node
    #[error("Cannot determine schema type: {0}")]
    UndeterminedType(String),

    /// The `type` keyword is neither a known type nor a `[T, "null"]` pair
    #[error("Invalid type declaration: {0}")]
    InvalidType(String),

    /// More than one of `oneOf`, `anyOf`, `allOf` on the same node
    #[error("Only one of oneOf, anyOf or allOf may be used per node: {0}")]
    MultipleCombinators(String),

    /// Keyword not supported for the schema kind
    #[error("Unknown keyword '{keyword}' for {kind} schema")]
    UnknownKeyword {
        /// The offending keyword
        keyword: String,
        /// Schema kind the keyword appeared on
        kind: &'static str,
    },

    /// Keyword present with a value of the wrong shape
    #[error("Invalid value for '{keyword}': {reason}")]
    InvalidKeyword {
        /// The offending keyword
        keyword: String,
        /// What was wrong with it
        reason: String,
    },

    /// Array schema without `items`
    #[error("Array schema must have items property")]
    MissingItems,

    /// Union whose branch list is empty
    #[error("Invalid schema: {0} must be a non-empty array")]
    EmptyUnion(Combinator),

    /// Constraint values contradict each other
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),
}

/// A provider-agnostic schema node
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// `type: "string"`
    String(StringSchema),
    /// `type: "number"`
    Number(NumericSchema),
    /// `type: "integer"`
    Integer(NumericSchema),
    /// `type: "boolean"`
    Boolean(BooleanSchema),
    /// `type: "null"`
    Null(NullSchema),
    /// `type: "array"`
    Array(ArraySchema),
    /// `type: "object"`
    Object(ObjectSchema),
    /// `oneOf` / `anyOf` / `allOf`
    Union(UnionSchema),
}

/// String schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    /// Declared as `["string", "null"]`
    pub nullable: bool,
    /// Allowed values
    pub enum_values: Option<Vec<String>>,
    /// Format annotation (e.g. `date-time`)
    pub format: Option<String>,
    /// Regular expression the value must match
    pub pattern: Option<String>,
    /// Minimum length in characters
    pub min_length: Option<u64>,
    /// Maximum length in characters
    pub max_length: Option<u64>,
    /// Human readable description
    pub description: Option<String>,
}

/// Number or integer schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSchema {
    /// Declared as `[T, "null"]`
    pub nullable: bool,
    /// Inclusive lower bound
    pub minimum: Option<f64>,
    /// Inclusive upper bound
    pub maximum: Option<f64>,
    /// Strict lower bound
    pub exclusive_minimum: Option<f64>,
    /// Strict upper bound
    pub exclusive_maximum: Option<f64>,
    /// Value must be an integral multiple of this
    pub multiple_of: Option<f64>,
    /// Human readable description
    pub description: Option<String>,
}

/// Boolean schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanSchema {
    /// Declared as `["boolean", "null"]`
    pub nullable: bool,
    /// Human readable description
    pub description: Option<String>,
}

/// Null schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullSchema {
    /// Human readable description
    pub description: Option<String>,
}

/// Array schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    /// Declared as `["array", "null"]`
    pub nullable: bool,
    /// Item schema; `None` is not well-formed
    pub items: Option<Box<Schema>>,
    /// Minimum number of items
    pub min_items: Option<u64>,
    /// Maximum number of items
    pub max_items: Option<u64>,
    /// Items must be pairwise distinct
    pub unique_items: Option<bool>,
    /// Human readable description
    pub description: Option<String>,
}

/// Object schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Declared as `["object", "null"]`
    pub nullable: bool,
    /// Property schemas by name
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Names of properties that must be present
    pub required: Option<Vec<String>>,
    /// Policy for keys not listed in `properties`
    pub additional_properties: Option<AdditionalProperties>,
    /// Human readable description
    pub description: Option<String>,
}

/// `additionalProperties` keyword
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `true` or `false`
    Allowed(bool),
    /// Every extra key must satisfy this schema
    Schema(Box<Schema>),
}

/// Union schema
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    /// Which combinator keyword was used
    pub combinator: Combinator,
    /// Branches in declaration order
    pub schemas: Vec<Schema>,
    /// Human readable description
    pub description: Option<String>,
}

/// Union combinator keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Exactly one branch must match
    OneOf,
    /// At least one branch must match
    AnyOf,
    /// Every branch must match
    AllOf,
}

impl Combinator {
    /// All combinators, in the precedence order used when reading a node
    pub const ALL: [Combinator; 3] = [Combinator::OneOf, Combinator::AnyOf, Combinator::AllOf];

    /// JSON Schema keyword for this combinator
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::OneOf => "oneOf",
            Combinator::AnyOf => "anyOf",
            Combinator::AllOf => "allOf",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Object,
}

impl TypeKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(TypeKind::String),
            "number" => Some(TypeKind::Number),
            "integer" => Some(TypeKind::Integer),
            "boolean" => Some(TypeKind::Boolean),
            "null" => Some(TypeKind::Null),
            "array" => Some(TypeKind::Array),
            "object" => Some(TypeKind::Object),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Integer => "integer",
            TypeKind::Boolean => "boolean",
            TypeKind::Null => "null",
            TypeKind::Array => "array",
            TypeKind::Object => "object",
        }
    }
}

impl Schema {
    /// Parse a JSON Schema document
    ///
    /// # Examples
    ///
    /// ```
    /// use extracta_domain::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::from_value(&json!({ "type": ["string", "null"] })).unwrap();
    /// assert!(schema.is_nullable());
    /// assert_eq!(schema.type_name(), Some("string"));
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let node = value
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject(value.to_string()))?;

        let combinators: Vec<Combinator> = Combinator::ALL
            .into_iter()
            .filter(|c| node.contains_key(c.keyword()))
            .collect();

        match combinators.as_slice() {
            [] => {}
            [combinator] => return parse_union(node, *combinator).map(Schema::Union),
            _ => return Err(SchemaError::MultipleCombinators(value.to_string())),
        }

        let (kind, nullable) = match node.get("type") {
            Some(declared) => parse_type(declared)?,
            // Objects are often written with properties only
            None if node.contains_key("properties") => (TypeKind::Object, false),
            None => return Err(SchemaError::UndeterminedType(value.to_string())),
        };

        let mut keywords = Keywords::new(node, kind.name());
        let description = keywords.string("description")?;

        let schema = match kind {
            TypeKind::String => Schema::String(StringSchema {
                nullable,
                enum_values: keywords.string_list("enum")?,
                format: keywords.string("format")?,
                pattern: keywords.string("pattern")?,
                min_length: keywords.unsigned("minLength")?,
                max_length: keywords.unsigned("maxLength")?,
                description,
            }),
            TypeKind::Number | TypeKind::Integer => {
                let numeric = NumericSchema {
                    nullable,
                    minimum: keywords.number("minimum")?,
                    maximum: keywords.number("maximum")?,
                    exclusive_minimum: keywords.number("exclusiveMinimum")?,
                    exclusive_maximum: keywords.number("exclusiveMaximum")?,
                    multiple_of: keywords.number("multipleOf")?,
                    description,
                };
                if kind == TypeKind::Number {
                    Schema::Number(numeric)
                } else {
                    Schema::Integer(numeric)
                }
            }
            TypeKind::Boolean => Schema::Boolean(BooleanSchema {
                nullable,
                description,
            }),
            TypeKind::Null => Schema::Null(NullSchema { description }),
            TypeKind::Array => Schema::Array(ArraySchema {
                nullable,
                items: keywords.schema("items")?.map(Box::new),
                min_items: keywords.unsigned("minItems")?,
                max_items: keywords.unsigned("maxItems")?,
                unique_items: keywords.boolean("uniqueItems")?,
                description,
            }),
            TypeKind::Object => Schema::Object(ObjectSchema {
                nullable,
                properties: keywords.properties("properties")?,
                required: keywords.string_list("required")?,
                additional_properties: keywords.additional_properties("additionalProperties")?,
                description,
            }),
        };

        keywords.finish()?;
        Ok(schema)
    }

    /// Canonical JSON form of this schema
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        match self {
            Schema::String(s) => {
                map.insert("type".into(), type_value("string", s.nullable));
                insert_opt(&mut map, "enum", s.enum_values.clone().map(Value::from));
                insert_opt(&mut map, "format", s.format.clone().map(Value::from));
                insert_opt(&mut map, "pattern", s.pattern.clone().map(Value::from));
                insert_opt(&mut map, "minLength", s.min_length.map(Value::from));
                insert_opt(&mut map, "maxLength", s.max_length.map(Value::from));
            }
            Schema::Number(n) | Schema::Integer(n) => {
                let name = if matches!(self, Schema::Number(_)) { "number" } else { "integer" };
                map.insert("type".into(), type_value(name, n.nullable));
                insert_opt(&mut map, "minimum", n.minimum.map(number_value));
                insert_opt(&mut map, "maximum", n.maximum.map(number_value));
                insert_opt(&mut map, "exclusiveMinimum", n.exclusive_minimum.map(number_value));
                insert_opt(&mut map, "exclusiveMaximum", n.exclusive_maximum.map(number_value));
                insert_opt(&mut map, "multipleOf", n.multiple_of.map(number_value));
            }
            Schema::Boolean(b) => {
                map.insert("type".into(), type_value("boolean", b.nullable));
            }
            Schema::Null(_) => {
                map.insert("type".into(), Value::from("null"));
            }
            Schema::Array(a) => {
                map.insert("type".into(), type_value("array", a.nullable));
                insert_opt(&mut map, "items", a.items.as_ref().map(|items| items.to_value()));
                insert_opt(&mut map, "minItems", a.min_items.map(Value::from));
                insert_opt(&mut map, "maxItems", a.max_items.map(Value::from));
                insert_opt(&mut map, "uniqueItems", a.unique_items.map(Value::from));
            }
            Schema::Object(o) => {
                map.insert("type".into(), type_value("object", o.nullable));
                insert_opt(
                    &mut map,
                    "properties",
                    o.properties.as_ref().map(|properties| {
                        Value::Object(
                            properties
                                .iter()
                                .map(|(name, schema)| (name.clone(), schema.to_value()))
                                .collect(),
                        )
                    }),
                );
                insert_opt(&mut map, "required", o.required.clone().map(Value::from));
                insert_opt(
                    &mut map,
                    "additionalProperties",
                    o.additional_properties.as_ref().map(|additional| match additional {
                        AdditionalProperties::Allowed(allowed) => Value::Bool(*allowed),
                        AdditionalProperties::Schema(schema) => schema.to_value(),
                    }),
                );
            }
            Schema::Union(u) => {
                map.insert(
                    u.combinator.keyword().into(),
                    Value::Array(u.schemas.iter().map(Schema::to_value).collect()),
                );
            }
        }
        insert_opt(&mut map, "description", self.description().map(Value::from));
        Value::Object(map)
    }

    /// The `type` keyword of this node, without the null pair
    ///
    /// Unions have no single type and return `None`.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Schema::String(_) => Some("string"),
            Schema::Number(_) => Some("number"),
            Schema::Integer(_) => Some("integer"),
            Schema::Boolean(_) => Some("boolean"),
            Schema::Null(_) => Some("null"),
            Schema::Array(_) => Some("array"),
            Schema::Object(_) => Some("object"),
            Schema::Union(_) => None,
        }
    }

    /// Description attached to this node
    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::String(s) => s.description.as_deref(),
            Schema::Number(n) | Schema::Integer(n) => n.description.as_deref(),
            Schema::Boolean(b) => b.description.as_deref(),
            Schema::Null(n) => n.description.as_deref(),
            Schema::Array(a) => a.description.as_deref(),
            Schema::Object(o) => o.description.as_deref(),
            Schema::Union(u) => u.description.as_deref(),
        }
    }

    /// Whether the node is declared with the `[T, "null"]` pair
    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::String(s) => s.nullable,
            Schema::Number(n) | Schema::Integer(n) => n.nullable,
            Schema::Boolean(b) => b.nullable,
            Schema::Array(a) => a.nullable,
            Schema::Object(o) => o.nullable,
            Schema::Null(_) | Schema::Union(_) => false,
        }
    }

    /// Whether this node is a standalone `type: "null"` schema
    pub fn is_null(&self) -> bool {
        matches!(self, Schema::Null(_))
    }

    /// Copy of this node with the null pair set or cleared
    ///
    /// Null and union nodes carry no nullable flag and are returned unchanged.
    pub fn with_nullable(&self, nullable: bool) -> Schema {
        let mut schema = self.clone();
        match &mut schema {
            Schema::String(s) => s.nullable = nullable,
            Schema::Number(n) | Schema::Integer(n) => n.nullable = nullable,
            Schema::Boolean(b) => b.nullable = nullable,
            Schema::Array(a) => a.nullable = nullable,
            Schema::Object(o) => o.nullable = nullable,
            Schema::Null(_) | Schema::Union(_) => {}
        }
        schema
    }

    /// Check every structural invariant recursively
    pub fn check_well_formed(&self) -> Result<(), SchemaError> {
        match self {
            Schema::String(s) => {
                if s.enum_values.as_ref().is_some_and(|values| values.is_empty()) {
                    return Err(SchemaError::InvalidConstraint("enum must not be empty".into()));
                }
                check_bounds("minLength", s.min_length, "maxLength", s.max_length)?;
                if let Some(pattern) = &s.pattern {
                    Regex::new(pattern).map_err(|e| SchemaError::InvalidKeyword {
                        keyword: "pattern".into(),
                        reason: e.to_string(),
                    })?;
                }
                Ok(())
            }
            Schema::Number(n) | Schema::Integer(n) => {
                if let (Some(min), Some(max)) = (n.minimum, n.maximum) {
                    if min > max {
                        return Err(SchemaError::InvalidConstraint(format!(
                            "minimum {} exceeds maximum {}",
                            min, max
                        )));
                    }
                }
                if let Some(step) = n.multiple_of {
                    if !(step > 0.0) {
                        return Err(SchemaError::InvalidConstraint(format!(
                            "multipleOf must be greater than 0, got {}",
                            step
                        )));
                    }
                }
                Ok(())
            }
            Schema::Boolean(_) | Schema::Null(_) => Ok(()),
            Schema::Array(a) => {
                let items = a.items.as_deref().ok_or(SchemaError::MissingItems)?;
                check_bounds("minItems", a.min_items, "maxItems", a.max_items)?;
                items.check_well_formed()
            }
            Schema::Object(o) => {
                if let Some(properties) = &o.properties {
                    for schema in properties.values() {
                        schema.check_well_formed()?;
                    }
                }
                if let Some(AdditionalProperties::Schema(schema)) = &o.additional_properties {
                    schema.check_well_formed()?;
                }
                Ok(())
            }
            Schema::Union(u) => {
                if u.schemas.is_empty() {
                    return Err(SchemaError::EmptyUnion(u.combinator));
                }
                u.schemas.iter().try_for_each(Schema::check_well_formed)
            }
        }
    }

    /// Boolean form of [`Schema::check_well_formed`]
    pub fn is_well_formed(&self) -> bool {
        self.check_well_formed().is_ok()
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Schema::from_value(&value)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Schema::from_value(&value).map_err(serde::de::Error::custom)
    }
}

fn parse_type(declared: &Value) -> Result<(TypeKind, bool), SchemaError> {
    let invalid = || SchemaError::InvalidType(declared.to_string());
    match declared {
        Value::String(name) => TypeKind::from_name(name).map(|kind| (kind, false)).ok_or_else(invalid),
        Value::Array(names) => match names.as_slice() {
            [Value::String(first), Value::String(second)] if second == "null" => {
                match TypeKind::from_name(first) {
                    Some(kind) if kind != TypeKind::Null => Ok((kind, true)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn parse_union(node: &Map<String, Value>, combinator: Combinator) -> Result<UnionSchema, SchemaError> {
    let mut keywords = Keywords::new(node, "union");
    let description = keywords.string("description")?;
    let branches = keywords
        .take(combinator.keyword())
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaError::InvalidKeyword {
            keyword: combinator.keyword().into(),
            reason: "expected an array of schemas".into(),
        })?;
    let schemas = branches
        .iter()
        .map(Schema::from_value)
        .collect::<Result<Vec<_>, _>>()?;
    keywords.finish()?;

    Ok(UnionSchema {
        combinator,
        schemas,
        description,
    })
}

/// Tracks which keywords of a node have been consumed
struct Keywords<'a> {
    node: &'a Map<String, Value>,
    kind: &'static str,
    seen: Vec<&'static str>,
}

impl<'a> Keywords<'a> {
    fn new(node: &'a Map<String, Value>, kind: &'static str) -> Self {
        Self {
            node,
            kind,
            seen: vec!["type"],
        }
    }

    fn take(&mut self, keyword: &'static str) -> Option<&'a Value> {
        self.seen.push(keyword);
        self.node.get(keyword)
    }

    fn invalid(keyword: &str, reason: &str) -> SchemaError {
        SchemaError::InvalidKeyword {
            keyword: keyword.to_string(),
            reason: reason.to_string(),
        }
    }

    fn string(&mut self, keyword: &'static str) -> Result<Option<String>, SchemaError> {
        self.take(keyword)
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| Self::invalid(keyword, "expected a string")))
            .transpose()
    }

    fn unsigned(&mut self, keyword: &'static str) -> Result<Option<u64>, SchemaError> {
        self.take(keyword)
            .map(|v| v.as_u64().ok_or_else(|| Self::invalid(keyword, "expected a non-negative integer")))
            .transpose()
    }

    fn number(&mut self, keyword: &'static str) -> Result<Option<f64>, SchemaError> {
        self.take(keyword)
            .map(|v| v.as_f64().ok_or_else(|| Self::invalid(keyword, "expected a number")))
            .transpose()
    }

    fn boolean(&mut self, keyword: &'static str) -> Result<Option<bool>, SchemaError> {
        self.take(keyword)
            .map(|v| v.as_bool().ok_or_else(|| Self::invalid(keyword, "expected a boolean")))
            .transpose()
    }

    fn string_list(&mut self, keyword: &'static str) -> Result<Option<Vec<String>>, SchemaError> {
        let Some(value) = self.take(keyword) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| Self::invalid(keyword, "expected an array of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Self::invalid(keyword, "expected an array of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn schema(&mut self, keyword: &'static str) -> Result<Option<Schema>, SchemaError> {
        match self.take(keyword) {
            None => Ok(None),
            Some(value @ Value::Object(_)) => Schema::from_value(value).map(Some),
            Some(_) => Err(Self::invalid(keyword, "expected a single schema object")),
        }
    }

    fn properties(&mut self, keyword: &'static str) -> Result<Option<BTreeMap<String, Schema>>, SchemaError> {
        let Some(value) = self.take(keyword) else {
            return Ok(None);
        };
        let entries = value
            .as_object()
            .ok_or_else(|| Self::invalid(keyword, "expected an object of schemas"))?;
        entries
            .iter()
            .map(|(name, schema)| Ok((name.clone(), Schema::from_value(schema)?)))
            .collect::<Result<BTreeMap<_, _>, SchemaError>>()
            .map(Some)
    }

    fn additional_properties(
        &mut self,
        keyword: &'static str,
    ) -> Result<Option<AdditionalProperties>, SchemaError> {
        match self.take(keyword) {
            None => Ok(None),
            Some(Value::Bool(allowed)) => Ok(Some(AdditionalProperties::Allowed(*allowed))),
            Some(value @ Value::Object(_)) => Ok(Some(AdditionalProperties::Schema(Box::new(
                Schema::from_value(value)?,
            )))),
            Some(_) => Err(Self::invalid(keyword, "expected a boolean or a schema")),
        }
    }

    fn finish(self) -> Result<(), SchemaError> {
        for key in self.node.keys() {
            let known = self.seen.contains(&key.as_str()) || ANNOTATIONS.contains(&key.as_str());
            if !known {
                return Err(SchemaError::UnknownKeyword {
                    keyword: key.clone(),
                    kind: self.kind,
                });
            }
        }
        Ok(())
    }
}

fn type_value(name: &str, nullable: bool) -> Value {
    if nullable {
        Value::Array(vec![Value::from(name), Value::from("null")])
    } else {
        Value::from(name)
    }
}

/// Integral constraints are written back as JSON integers
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn check_bounds(
    min_name: &str,
    min: Option<u64>,
    max_name: &str,
    max: Option<u64>,
) -> Result<(), SchemaError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(SchemaError::InvalidConstraint(format!(
            "{} {} exceeds {} {}",
            min_name, min, max_name, max
        ))),
        _ => Ok(()),
    }
}
