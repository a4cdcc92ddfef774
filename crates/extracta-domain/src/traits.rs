//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in other crates.

use crate::{Extraction, ExtractionId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a document loader
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not valid UTF-8 text
    #[error("Document is not valid UTF-8: {0}")]
    Encoding(String),

    /// Any other loader failure
    #[error("{0}")]
    Other(String),
}

/// Produces the text content of a document
///
/// Implemented by the application layer (extracta-extractor) and by callers
/// that bring their own text extraction.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Load the document text
    async fn load(&self) -> Result<String, LoadError>;
}

/// Errors raised by an extraction repository
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// An extraction with the same id was already saved
    #[error("Extraction {0} already exists")]
    Duplicate(ExtractionId),

    /// Backend failure
    #[error("Repository error: {0}")]
    Backend(String),
}

/// Stores extraction records after a successful extraction
#[async_trait]
pub trait ExtractionRepository: Send + Sync {
    /// Persist a record
    async fn save(&self, extraction: &Extraction) -> Result<(), RepositoryError>;

    /// Look up a record by id
    async fn find(&self, id: ExtractionId) -> Result<Option<Extraction>, RepositoryError>;
}
