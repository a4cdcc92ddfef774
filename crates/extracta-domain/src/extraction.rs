//! Extraction module - the record produced by a successful extraction

use crate::{Schema, Usage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an extraction based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionId(Uuid);

impl ExtractionId {
    /// Generate a new UUIDv7-based ExtractionId
    ///
    /// # Examples
    ///
    /// ```
    /// use extracta_domain::ExtractionId;
    ///
    /// let id = ExtractionId::new();
    /// let parsed = ExtractionId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse an ExtractionId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid extraction id: {}", e))
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExtractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller's schema alongside what was sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSchemas {
    /// Schema supplied by the caller
    pub original: Schema,
    /// Provider dialect schema it compiled to
    pub transformed: Value,
}

/// An extraction record
///
/// Created once per successful extraction and never mutated afterwards.
/// `data`, when present, satisfies `schemas.original`. A JSON `null` is
/// stored as no data, so a nullable schema whose value is `null` reads the
/// same as a miss and survives a serde round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    id: ExtractionId,
    created_at: DateTime<Utc>,
    model: String,
    schemas: ExtractionSchemas,
    data: Option<Value>,
    usage: Usage,
}

impl Extraction {
    /// Create a record with a fresh identifier and the current time
    ///
    /// `Some(Value::Null)` is normalized to `None`.
    pub fn new(
        model: impl Into<String>,
        schemas: ExtractionSchemas,
        data: Option<Value>,
        usage: Usage,
    ) -> Self {
        Self {
            id: ExtractionId::new(),
            created_at: Utc::now(),
            model: model.into(),
            schemas,
            data: data.filter(|value| !value.is_null()),
            usage,
        }
    }

    /// Unique identifier
    pub fn id(&self) -> ExtractionId {
        self.id
    }

    /// When the record was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Model that produced the data
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Original and compiled schemas
    pub fn schemas(&self) -> &ExtractionSchemas {
        &self.schemas
    }

    /// Extracted data, `None` when nothing conforming was produced
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Token usage
    pub fn usage(&self) -> Usage {
        self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(data: Option<Value>) -> Extraction {
        let original = Schema::from_value(&json!({ "type": "string" })).unwrap();
        Extraction::new(
            "gpt-4o",
            ExtractionSchemas {
                original,
                transformed: json!({ "type": "string" }),
            },
            data,
            Usage::new(10, 5, 15),
        )
    }

    #[test]
    fn test_ids_are_unique() {
        let first = ExtractionId::new();
        let second = ExtractionId::new();
        assert_ne!(first, second);
        assert_eq!(first.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_invalid_id_string() {
        assert!(ExtractionId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let extraction = sample(Some(json!("Hello")));
        let value = serde_json::to_value(&extraction).unwrap();

        assert_eq!(value["id"], json!(extraction.id().to_string()));
        assert_eq!(value["model"], json!("gpt-4o"));
        assert_eq!(value["data"], json!("Hello"));
        assert_eq!(value["schemas"]["original"], json!({ "type": "string" }));
        assert_eq!(value["usage"]["totalTokens"], json!(15));
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_null_data_serializes_as_null() {
        let value = serde_json::to_value(sample(None)).unwrap();
        assert_eq!(value["data"], Value::Null);
    }

    #[test]
    fn test_null_value_is_no_data() {
        let extraction = sample(Some(Value::Null));
        assert_eq!(extraction.data(), None);

        let text = serde_json::to_string(&extraction).unwrap();
        let back: Extraction = serde_json::from_str(&text).unwrap();
        assert_eq!(back, extraction);
        assert_eq!(back.data(), None);
    }

    #[test]
    fn test_deserialize_round_trip() {
        let extraction = sample(Some(json!("x")));
        let text = serde_json::to_string(&extraction).unwrap();
        let back: Extraction = serde_json::from_str(&text).unwrap();
        assert_eq!(back, extraction);
    }
}
