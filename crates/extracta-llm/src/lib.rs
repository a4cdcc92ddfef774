//! Extracta LLM Provider Layer
//!
//! Structured-output provider implementations behind a single capability
//! trait.
//!
//! # Architecture
//!
//! Every provider compiles the caller's [`Schema`] into its own dialect, sends
//! the conversation, and decodes the reply against the *original* schema.
//! Replies that cannot be decoded or do not conform become `data: None`;
//! only transport, compilation and message errors are raised.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI chat completions with strict JSON Schema
//! - `MistralProvider`: Mistral chat completions with strict JSON Schema
//! - `GeminiProvider`: Gemini `generateContent` with its enum-tag schema dialect
//!
//! # Examples
//!
//! ```
//! use extracta_domain::{Message, Schema};
//! use extracta_llm::{LlmProvider, MockProvider};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = MockProvider::new("gpt-4o", r#"{"name":"John"}"#);
//! let schema = Schema::from_value(&json!({
//!     "type": "object",
//!     "properties": { "name": { "type": "string" } },
//!     "required": ["name"]
//! })).unwrap();
//!
//! let parsed = provider.parse(&schema, &[Message::user("John is here")]).await.unwrap();
//! assert_eq!(parsed.data, Some(json!({ "name": "John" })));
//! # }
//! ```

#![warn(missing_docs)]

mod chat;
pub mod decode;
pub mod gemini;
mod http;
pub mod mistral;
pub mod openai;
pub mod strict;

use async_trait::async_trait;
use extracta_domain::{Combinator, Content, Message, Role, Schema, SchemaValidator, Usage};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use decode::decode_response;
pub use gemini::GeminiProvider;
pub use mistral::MistralProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider envelope could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Schema could not be compiled for the provider dialect
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Message the provider cannot accept
    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Errors raised by schema compilers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Array node without `items`
    #[error("Array schema must have items property: {0}")]
    MissingItems(String),

    /// Union node with no branches
    #[error("Invalid schema: {combinator} must be a non-empty array: {node}")]
    EmptyUnion {
        /// Combinator keyword
        combinator: Combinator,
        /// The offending node
        node: String,
    },
}

/// Optional capabilities of a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    /// Accepts image content in user messages
    pub vision: bool,
}

/// A model in a provider catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Model identifier exposed to callers
    pub id: &'static str,
    /// Capabilities of the model
    pub features: Features,
}

impl ModelSpec {
    /// Find a model by identifier in a catalog
    pub fn find(catalog: &'static [ModelSpec], id: &str) -> Option<&'static ModelSpec> {
        catalog.iter().find(|spec| spec.id == id)
    }
}

/// Outcome of a provider call
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// Decoded data, `None` when the reply did not conform
    pub data: Option<Value>,
    /// Token usage
    pub usage: Usage,
    /// Dialect schema sent to the provider
    pub schema: Value,
}

/// Structured-output capability shared by every provider
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier
    fn model(&self) -> &str;

    /// Capabilities of the model
    fn features(&self) -> Features;

    /// Compile `schema`, send `messages` and decode the reply
    async fn parse(&self, schema: &Schema, messages: &[Message]) -> Result<Parsed, LlmError>;
}

/// Reject image content for models without vision
pub(crate) fn check_messages(features: Features, messages: &[Message]) -> Result<(), LlmError> {
    for message in messages {
        if let Content::Vision { .. } = message.content {
            if message.role != Role::User {
                return Err(LlmError::UnsupportedMessage(format!(
                    "image content is only allowed in user messages, got {}",
                    message.role.as_str()
                )));
            }
            if !features.vision {
                return Err(LlmError::UnsupportedMessage(
                    "model does not support vision content".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum MockReply {
    Content(Option<String>),
    Error,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured raw replies without any network call, keyed by the
/// text of the last user message. Replies go through the same compile and
/// decode path as the real providers.
///
/// # Examples
///
/// ```
/// use extracta_llm::MockProvider;
///
/// let provider = MockProvider::new("gpt-4o", "default")
///     .with_response("invoice text", r#"{"total": 12}"#)
///     .with_error("broken document");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    features: Features,
    default_reply: MockReply,
    replies: HashMap<String, MockReply>,
    usage: Usage,
    call_count: Arc<AtomicUsize>,
    validator: SchemaValidator,
}

impl MockProvider {
    /// Create a MockProvider returning `response` for every document
    pub fn new(model: impl Into<String>, response: impl Into<String>) -> Self {
        Self::with_default(model, MockReply::Content(Some(response.into())))
    }

    /// Create a MockProvider whose replies carry no content
    pub fn empty(model: impl Into<String>) -> Self {
        Self::with_default(model, MockReply::Content(None))
    }

    fn with_default(model: impl Into<String>, default_reply: MockReply) -> Self {
        Self {
            model: model.into(),
            features: Features::default(),
            default_reply,
            replies: HashMap::new(),
            usage: Usage::unreported(),
            call_count: Arc::new(AtomicUsize::new(0)),
            validator: SchemaValidator::new(),
        }
    }

    /// Reply with `response` when the last user message is `document`
    pub fn with_response(mut self, document: impl Into<String>, response: impl Into<String>) -> Self {
        self.replies
            .insert(document.into(), MockReply::Content(Some(response.into())));
        self
    }

    /// Fail when the last user message is `document`
    pub fn with_error(mut self, document: impl Into<String>) -> Self {
        self.replies.insert(document.into(), MockReply::Error);
        self
    }

    /// Declare vision support
    pub fn with_vision(mut self, vision: bool) -> Self {
        self.features.vision = vision;
        self
    }

    /// Usage reported with every reply
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Get the number of times parse was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn features(&self) -> Features {
        self.features
    }

    async fn parse(&self, schema: &Schema, messages: &[Message]) -> Result<Parsed, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let compiled = strict::compile(schema)?;
        check_messages(self.features, messages)?;

        let document = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(Message::text_content);
        let reply = document
            .and_then(|text| self.replies.get(text))
            .unwrap_or(&self.default_reply);

        let content = match reply {
            MockReply::Content(content) => content.as_deref(),
            MockReply::Error => return Err(LlmError::Other("Mock error".to_string())),
        };

        Ok(Parsed {
            data: decode_response(schema, content, &self.validator),
            usage: self.usage,
            schema: compiled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Schema {
        Schema::from_value(&json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("gpt-4o", r#"{"name":"John"}"#);
        let parsed = provider.parse(&person(), &[Message::user("doc")]).await.unwrap();

        assert_eq!(parsed.data, Some(json!({ "name": "John" })));
        assert_eq!(parsed.usage, Usage::unreported());
        assert_eq!(parsed.schema, person().to_value());
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let provider = MockProvider::new("gpt-4o", r#"{"name":"Default"}"#)
            .with_response("first", r#"{"name":"Ada"}"#)
            .with_response("second", r#"{"age":"18"}"#);

        let first = provider.parse(&person(), &[Message::user("first")]).await.unwrap();
        let second = provider.parse(&person(), &[Message::user("second")]).await.unwrap();
        let other = provider.parse(&person(), &[Message::user("other")]).await.unwrap();

        assert_eq!(first.data, Some(json!({ "name": "Ada" })));
        assert_eq!(second.data, None);
        assert_eq!(other.data, Some(json!({ "name": "Default" })));
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("gpt-4o", "{}");
        assert_eq!(provider.call_count(), 0);

        provider.parse(&person(), &[Message::user("a")]).await.unwrap();
        provider.parse(&person(), &[Message::user("b")]).await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::new("gpt-4o", "{}").with_error("bad document");
        let result = provider.parse(&person(), &[Message::user("bad document")]).await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_count() {
        let provider1 = MockProvider::new("gpt-4o", "{}");
        let provider2 = provider1.clone();

        provider1.parse(&person(), &[Message::user("x")]).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_vision_rejected_without_feature() {
        let provider = MockProvider::new("mistral-large", "{}");
        let messages = [Message::vision(None, "https://example.com/scan.png")];

        let result = provider.parse(&person(), &messages).await;
        assert!(matches!(result, Err(LlmError::UnsupportedMessage(_))));

        let provider = provider.with_vision(true);
        assert!(provider.parse(&person(), &messages).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_items_raised_before_call() {
        let schema = Schema::from_value(&json!({ "type": "array" })).unwrap();
        let provider = MockProvider::empty("gpt-4o");

        let err = provider.parse(&schema, &[Message::user("x")]).await.unwrap_err();
        assert!(err.to_string().starts_with("Array schema must have items property"));
    }

    #[test]
    fn test_check_messages_rejects_system_image() {
        let message = Message {
            role: Role::System,
            content: Content::Vision {
                text: None,
                image: "https://example.com/a.png".to_string(),
            },
        };
        let result = check_messages(Features { vision: true }, &[message]);
        assert!(matches!(result, Err(LlmError::UnsupportedMessage(_))));
    }
}
