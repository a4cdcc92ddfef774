//! Mistral Provider Implementation
//!
//! Same chat completions envelope and strict JSON Schema dialect as OpenAI.
//! Models are addressed on the wire by their `-latest` alias.

use crate::chat::{to_chat_messages, ChatRequest, ChatResponse};
use crate::http::{build_client, post_json, trim_endpoint, DEFAULT_TIMEOUT_SECS};
use crate::{strict, CompileError, Features, LlmError, LlmProvider, ModelSpec, Parsed};
use async_trait::async_trait;
use extracta_domain::{Message, Schema, SchemaValidator};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Default Mistral API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai";

/// Models served by this provider
pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "mistral-large",
        features: Features { vision: false },
    },
    ModelSpec {
        id: "ministral-8b",
        features: Features { vision: false },
    },
    ModelSpec {
        id: "pixtral-large",
        features: Features { vision: true },
    },
];

/// Mistral structured-output provider
pub struct MistralProvider {
    endpoint: String,
    spec: &'static ModelSpec,
    wire_model: String,
    api_key: String,
    client: reqwest::Client,
    validator: SchemaValidator,
}

impl MistralProvider {
    /// Create a provider for one of [`MODELS`]
    pub fn new(api_key: impl Into<String>, model: &str) -> Result<Self, LlmError> {
        let spec = ModelSpec::find(MODELS, model)
            .ok_or_else(|| LlmError::ModelNotAvailable(model.to_string()))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            spec,
            wire_model: format!("{}-latest", spec.id),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            validator: SchemaValidator::new(),
        })
    }

    /// Send requests to another endpoint (proxies, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = trim_endpoint(endpoint);
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Compile a schema to the Mistral dialect
    pub fn compile_schema(schema: &Schema) -> Result<Value, CompileError> {
        strict::compile(schema)
    }
}

#[async_trait]
impl LlmProvider for MistralProvider {
    fn model(&self) -> &str {
        self.spec.id
    }

    fn features(&self) -> Features {
        self.spec.features
    }

    async fn parse(&self, schema: &Schema, messages: &[Message]) -> Result<Parsed, LlmError> {
        let compiled = Self::compile_schema(schema)?;
        let wire_messages = to_chat_messages(self.spec.features, messages)?;
        let request = ChatRequest::new(&self.wire_model, wire_messages, &compiled);

        info!("Calling Mistral model {}", self.wire_model);
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let response: ChatResponse = post_json(
            self.client.post(&url).bearer_auth(&self.api_key),
            &request,
            self.spec.id,
        )
        .await?;

        let data = crate::decode_response(schema, response.content(), &self.validator);
        debug!("Mistral reply decoded, data present: {}", data.is_some());

        Ok(Parsed {
            data,
            usage: response.usage(),
            schema: compiled,
        })
    }
}
