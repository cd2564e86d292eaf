//! Chat request and response types.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::null_as_default;

/// Author of a message in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// A turn written by the operator.
    User,
    /// A turn produced by the assistant.
    Assistant,
}

/// A single message of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a new message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Question sent to the chat endpoint.
///
/// `history` and `top_k` are passed through untouched; when omitted they are
/// left out of the JSON body and the backend applies its own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The question to answer.
    pub question: String,
    /// Earlier turns of the conversation, oldest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatMessage>>,
    /// How many knowledge items the backend should retrieve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl ChatRequest {
    /// Creates a request without history or retrieval hint.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            history: None,
            top_k: None,
        }
    }

    /// Sets the conversation history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = Some(history);
        self
    }

    /// Appends one message to the history, creating it if absent.
    #[must_use]
    pub fn push_history(mut self, message: ChatMessage) -> Self {
        self.history.get_or_insert_with(Vec::new).push(message);
        self
    }

    /// Sets the number of knowledge items to retrieve.
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// A knowledge item cited by an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,
}

/// Answer returned by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer text.
    pub answer: String,
    /// Knowledge items used to ground the answer, in ranking order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<SourceReference>,
}

impl ChatResponse {
    /// Returns whether the answer cites any knowledge item.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}
