//! Error types for the Extractor

use extracta_domain::SchemaError;
use extracta_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Requested model matches no configured provider
    #[error("Model {0} is not supported")]
    UnsupportedModel(String),

    /// Loader failed or produced no content
    #[error("Failed to load content: {0}")]
    LoadFailed(String),

    /// Schema is not well-formed
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// Provider error (transport, compilation, unsupported message)
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Extraction timeout
    #[error("Extraction timeout")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
