//! OpenAI-compatible chat completions wire format
//!
//! Shared by the OpenAI and Mistral adapters, whose request and response
//! envelopes only differ in the endpoint and model naming.

use crate::{check_messages, Features, LlmError};
use extracta_domain::{Content, Message, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Name given to the response schema
const RESPONSE_SCHEMA_NAME: &str = "response";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat<'a>,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn new(model: &'a str, messages: Vec<ChatMessage>, schema: &'a Value) -> Self {
        Self {
            model,
            messages,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: RESPONSE_SCHEMA_NAME,
                    schema,
                    strict: true,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'static str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct ChatMessage {
    role: &'static str,
    content: ChatContent,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize, PartialEq)]
struct ImageUrl {
    url: String,
}

/// Translate messages, rejecting images for models without vision
pub(crate) fn to_chat_messages(
    features: Features,
    messages: &[Message],
) -> Result<Vec<ChatMessage>, LlmError> {
    check_messages(features, messages)?;

    Ok(messages
        .iter()
        .map(|message| ChatMessage {
            role: message.role.as_str(),
            content: match &message.content {
                Content::Text { text } => ChatContent::Text(text.clone()),
                Content::Vision { text, image } => {
                    let mut parts = Vec::with_capacity(2);
                    if let Some(text) = text {
                        parts.push(ContentPart::Text { text: text.clone() });
                    }
                    parts.push(ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image.clone() },
                    });
                    ChatContent::Parts(parts)
                }
            },
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<i64>,
    completion_tokens: Option<i64>,
    total_tokens: Option<i64>,
}

impl ChatResponse {
    /// Text of the first choice
    ///
    /// Refusals and chunked (array) content count as no content.
    pub(crate) fn content(&self) -> Option<&str> {
        let message = &self.choices.first()?.message;
        if let Some(refusal) = &message.refusal {
            debug!("Model refused to answer: {}", refusal);
            return None;
        }
        match message.content.as_ref()? {
            Value::String(text) => Some(text),
            _ => {
                debug!("Ignoring non-text message content");
                None
            }
        }
    }

    pub(crate) fn usage(&self) -> Usage {
        match &self.usage {
            Some(usage) => Usage::from_reported(
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
            ),
            None => Usage::unreported(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let schema = json!({ "type": "string" });
        let messages = to_chat_messages(Features::default(), &[Message::system("Be precise")]).unwrap();
        let request = ChatRequest::new("gpt-4o", messages, &schema);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4o",
                "messages": [{ "role": "system", "content": "Be precise" }],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "response", "schema": { "type": "string" }, "strict": true }
                }
            })
        );
    }

    #[test]
    fn test_vision_parts() {
        let messages = [
            Message::vision(Some("What is this?".to_string()), "https://example.com/a.png"),
            Message::vision(None, "data:image/png;base64,AAAA"),
        ];
        let translated = to_chat_messages(Features { vision: true }, &messages).unwrap();

        assert_eq!(
            serde_json::to_value(&translated).unwrap(),
            json!([
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "What is this?" },
                        { "type": "image_url", "image_url": { "url": "https://example.com/a.png" } }
                    ]
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } }
                    ]
                }
            ])
        );
    }

    #[test]
    fn test_vision_without_feature_fails() {
        let messages = [Message::vision(None, "https://example.com/a.png")];
        let result = to_chat_messages(Features { vision: false }, &messages);
        assert!(matches!(result, Err(LlmError::UnsupportedMessage(_))));
    }

    #[test]
    fn test_response_content_and_usage() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"a\":1}" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 4 }
        }))
        .unwrap();

        assert_eq!(response.content(), Some("{\"a\":1}"));
        assert_eq!(response.usage(), Usage::new(10, 4, -1));
    }

    #[test]
    fn test_sentinel_usage_keeps_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": "{\"name\":\"John\"}" } }],
            "usage": { "prompt_tokens": -1, "completion_tokens": 4, "total_tokens": -1 }
        }))
        .unwrap();

        assert_eq!(response.content(), Some("{\"name\":\"John\"}"));
        assert_eq!(response.usage(), Usage::new(-1, 4, -1));
    }

    #[test]
    fn test_refusal_and_chunks_are_no_content() {
        let refused: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": null, "refusal": "I can't" } }]
        }))
        .unwrap();
        assert_eq!(refused.content(), None);
        assert_eq!(refused.usage(), Usage::unreported());

        let chunked: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": [{ "type": "text", "text": "hi" }] } }]
        }))
        .unwrap();
        assert_eq!(chunked.content(), None);

        let empty: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(empty.content(), None);
    }
}
