//! Conversation messages sent to a language model

use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the task
    System,
    /// Prior model turns
    Assistant,
    /// Caller input, including the document text
    User,
}

impl Role {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

/// Message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// An image with optional accompanying text
    Vision {
        /// Optional caption or question
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// Image URL or `data:` URI
        image: String,
    },
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the turn
    pub role: Role,
    /// Body of the turn
    pub content: Content,
}

impl Message {
    /// Create a text message
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Text { text: text.into() },
        }
    }

    /// System text message
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    /// User text message
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Assistant text message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// User message carrying an image
    pub fn vision(text: Option<String>, image: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::Vision {
                text,
                image: image.into(),
            },
        }
    }

    /// Text of the message, if any
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text { text } => Some(text),
            Content::Vision { text, .. } => text.as_deref(),
        }
    }

    /// Whether the message carries an image
    pub fn is_vision(&self) -> bool {
        matches!(self.content, Content::Vision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_wire_shape() {
        let message = Message::user("hello");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "role": "user", "content": { "type": "text", "text": "hello" } })
        );
    }

    #[test]
    fn test_vision_message_parse() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "content": { "type": "vision", "image": "https://example.com/a.png" }
        }))
        .unwrap();

        assert!(message.is_vision());
        assert_eq!(message.text_content(), None);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<Message, _> = serde_json::from_value(json!({
            "role": "tool",
            "content": { "type": "text", "text": "x" }
        }));
        assert!(result.is_err());
    }
}
