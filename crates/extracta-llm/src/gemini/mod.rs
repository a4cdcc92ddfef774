//! Gemini Provider Implementation
//!
//! Calls `generateContent` with a JSON response MIME type and a response
//! schema in Gemini's own dialect (see [`schema`]).
//!
//! # Examples
//!
//! ```no_run
//! use extracta_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::new("AIza...", "gemini-2.0-flash").unwrap();
//! ```

pub mod schema;

use crate::http::{build_client, post_json, trim_endpoint, DEFAULT_TIMEOUT_SECS};
use crate::{check_messages, CompileError, Features, LlmError, LlmProvider, ModelSpec, Parsed};
use async_trait::async_trait;
use extracta_domain::{Content, Message, Role, Schema, SchemaValidator, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub use schema::{GeminiSchema, SchemaType};

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Models served by this provider
pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "gemini-2.0-flash",
        features: Features { vision: true },
    },
    ModelSpec {
        id: "gemini-2.0-flash-lite",
        features: Features { vision: true },
    },
];

/// Gemini structured-output provider
pub struct GeminiProvider {
    endpoint: String,
    spec: &'static ModelSpec,
    api_key: String,
    client: reqwest::Client,
    validator: SchemaValidator,
}

/// Request body for the generateContent API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Serialize, PartialEq)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i64>,
    candidates_token_count: Option<i64>,
    total_token_count: Option<i64>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let texts: Vec<&str> = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    fn usage(&self) -> Usage {
        match &self.usage_metadata {
            Some(usage) => Usage::from_reported(
                usage.prompt_token_count,
                usage.candidates_token_count,
                usage.total_token_count,
            ),
            None => Usage::unreported(),
        }
    }
}

impl GeminiProvider {
    /// Create a provider for one of [`MODELS`]
    pub fn new(api_key: impl Into<String>, model: &str) -> Result<Self, LlmError> {
        let spec = ModelSpec::find(MODELS, model)
            .ok_or_else(|| LlmError::ModelNotAvailable(model.to_string()))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            spec,
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

    /// Compile a schema to the Gemini dialect
    pub fn compile_schema(schema: &Schema) -> Result<Value, CompileError> {
        schema::compile(schema).map(|compiled| compiled.to_value())
    }
}

/// Split messages into the system instruction and the conversation
fn to_gemini_contents(
    features: Features,
    messages: &[Message],
) -> Result<(Option<WireContent>, Vec<WireContent>), LlmError> {
    check_messages(features, messages)?;

    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in messages {
        match message.role {
            Role::System => system_parts.push(Part::text(message.text_content().unwrap_or_default())),
            Role::Assistant => contents.push(WireContent {
                role: Some("model"),
                parts: vec![Part::text(message.text_content().unwrap_or_default())],
            }),
            Role::User => contents.push(WireContent {
                role: Some("user"),
                parts: user_parts(&message.content)?,
            }),
        }
    }

    let system_instruction = if system_parts.is_empty() {
        None
    } else {
        Some(WireContent {
            role: None,
            parts: system_parts,
        })
    };

    Ok((system_instruction, contents))
}

fn user_parts(content: &Content) -> Result<Vec<Part>, LlmError> {
    match content {
        Content::Text { text } => Ok(vec![Part::text(text.clone())]),
        Content::Vision { text, image } => {
            let mut parts = Vec::with_capacity(2);
            if let Some(text) = text {
                parts.push(Part::text(text.clone()));
            }
            parts.push(image_part(image)?);
            Ok(parts)
        }
    }
}

/// `data:` URIs are sent inline, anything else by reference
fn image_part(image: &str) -> Result<Part, LlmError> {
    let Some(rest) = image.strip_prefix("data:") else {
        return Ok(Part {
            file_data: Some(FileData {
                file_uri: image.to_string(),
            }),
            ..Default::default()
        });
    };

    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| LlmError::UnsupportedMessage("malformed data URI".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .filter(|mime| !mime.is_empty())
        .ok_or_else(|| {
            LlmError::UnsupportedMessage("data URI must be base64 with a MIME type".to_string())
        })?;

    Ok(Part {
        inline_data: Some(Blob {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        }),
        ..Default::default()
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn model(&self) -> &str {
        self.spec.id
    }

    fn features(&self) -> Features {
        self.spec.features
    }

    async fn parse(&self, schema: &Schema, messages: &[Message]) -> Result<Parsed, LlmError> {
        let compiled = Self::compile_schema(schema)?;
        debug!("Compiled Gemini schema: {}", compiled);
        let (system_instruction, contents) = to_gemini_contents(self.spec.features, messages)?;

        let request = GenerateRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &compiled,
            },
        };

        info!("Calling Gemini model {}", self.spec.id);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.spec.id
        );
        let response: GenerateResponse = post_json(
            self.client.post(&url).header("x-goog-api-key", &self.api_key),
            &request,
            self.spec.id,
        )
        .await?;

        let text = response.text();
        let data = crate::decode_response(schema, text.as_deref(), &self.validator);
        debug!("Gemini reply decoded, data present: {}", data.is_some());

        Ok(Parsed {
            data,
            usage: response.usage(),
            schema: compiled,
        })
    }
}
