//! Extracta Domain Layer
//!
//! This crate contains the provider-agnostic model shared by every other
//! layer: the schema a caller wants data extracted into, the conversation
//! sent to a language model, and the immutable extraction record that comes
//! back.
//!
//! ## Key Concepts
//!
//! - **Schema**: A closed tagged union describing the expected output shape
//! - **Validation**: Structural checks of both schemas and extracted data
//! - **Message**: A system, assistant or user turn, optionally carrying an image
//! - **Usage**: Token accounting as reported by the provider
//! - **Extraction**: The record produced once per successful extraction
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - No network or storage code
//! - Pure data model and validation logic
//! - Trait definitions for loaders and repositories
//!
//! ```
//! use extracta_domain::{Schema, SchemaValidator};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! })).unwrap();
//!
//! let validator = SchemaValidator::new();
//! assert!(validator.is_valid(&schema, &json!({ "name": "John" })));
//! assert!(!validator.is_valid(&schema, &json!({ "age": "18" })));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extraction;
pub mod message;
pub mod schema;
pub mod traits;
pub mod usage;
pub mod validation;

// Re-exports for convenience
pub use extraction::{Extraction, ExtractionId, ExtractionSchemas};
pub use message::{Content, Message, Role};
pub use schema::{
    AdditionalProperties, ArraySchema, BooleanSchema, Combinator, NullSchema, NumericSchema,
    ObjectSchema, Schema, SchemaError, StringSchema, UnionSchema,
};
pub use traits::{ExtractionRepository, LoadError, Loader, RepositoryError};
pub use usage::Usage;
pub use validation::{SchemaValidator, Violation};
