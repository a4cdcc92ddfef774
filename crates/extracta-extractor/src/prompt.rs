//! Conversation assembly

use extracta_domain::Message;

/// Builds the message sequence sent to a provider
///
/// The order is fixed: system instruction, caller history, then the
/// document text as the final user message.
pub struct MessageBuilder {
    system_instruction: String,
    history: Vec<Message>,
}

impl MessageBuilder {
    /// Create a new message builder
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            history: Vec::new(),
        }
    }

    /// Add caller-supplied messages
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    /// Build the complete conversation for `document`
    pub fn build(self, document: String) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(self.system_instruction));
        messages.extend(self.history);
        messages.push(Message::user(document));
        messages
    }
}
