//! Extracta Extractor
//!
//! Orchestrates a single extraction: load the document, build the
//! conversation, dispatch to the provider for the requested model and wrap
//! the outcome as an [`Extraction`](extracta_domain::Extraction).
//!
//! # Architecture
//!
//! ```text
//! Loader → Extractor → LlmProvider (compile → call → decode) → Extraction
//! ```
//!
//! # Key Features
//!
//! - **Model Dispatch**: one provider per model identifier, fixed at construction
//! - **Early Failure**: unknown models and malformed schemas never reach a provider
//! - **Null On Mismatch**: non-conforming replies produce `data: null`, not errors
//! - **Bounded Calls**: provider calls are limited by a configurable timeout
//!
//! # Example Usage
//!
//! ```
//! use extracta_domain::Schema;
//! use extracta_extractor::{ExtractionRequest, Extractor, ExtractorConfig, TextLoader};
//! use extracta_llm::MockProvider;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::new("gpt-4o", r#"{"name":"John"}"#);
//! let extractor = Extractor::new(vec![Arc::new(provider)], ExtractorConfig::default())?;
//!
//! let schema = Schema::from_value(&json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! }))?;
//! let request = ExtractionRequest::new(TextLoader::new("John signed the lease."), schema, "gpt-4o");
//!
//! let extraction = extractor.extract(request).await?;
//! assert_eq!(extraction.data(), Some(&json!({ "name": "John" })));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod credentials;
mod error;
mod extractor;
mod loader;
mod prompt;
mod repository;
mod types;


pub use config::{ExtractorConfig, DEFAULT_SYSTEM_INSTRUCTION};
pub use credentials::ProviderCredentials;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use loader::{BytesLoader, FileLoader, TextLoader};
pub use prompt::MessageBuilder;
pub use repository::InMemoryExtractionRepository;
pub use types::ExtractionRequest;
