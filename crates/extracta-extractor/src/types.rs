//! Request types for the Extractor

use extracta_domain::{Loader, Message, Schema};

/// Request to extract structured data from a document
pub struct ExtractionRequest {
    /// Source of the document text
    pub loader: Box<dyn Loader>,

    /// Shape of the data to extract
    pub schema: Schema,

    /// Extra messages placed between the system instruction and the document
    pub messages: Vec<Message>,

    /// Model identifier, one of [`crate::Extractor::available_models`]
    pub model: String,
}

impl ExtractionRequest {
    /// Create a request without extra messages
    pub fn new(loader: impl Loader + 'static, schema: Schema, model: impl Into<String>) -> Self {
        Self {
            loader: Box::new(loader),
            schema,
            messages: Vec::new(),
            model: model.into(),
        }
    }

    /// Add caller-supplied messages
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }
}
