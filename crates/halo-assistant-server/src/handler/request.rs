//! Request bodies accepted by the handlers.
//!
//! Chat requests are read leniently: every field may be missing or `null`,
//! unknown roles count as `user` and a non-positive `topK` means the default.

use std::str::FromStr;

use halo_assistant::types::{ChatMessage, Role};
use serde::Deserialize;

use crate::service::DEFAULT_TOP_K;

/// Body of `POST /chat`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub question: Option<String>,
    pub history: Option<Vec<Option<HistoryMessage>>>,
    pub top_k: Option<i64>,
}

/// One entry of the conversation history as sent by the console.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatRequestBody {
    /// Returns the question, empty when absent.
    pub fn question(&self) -> &str {
        self.question.as_deref().unwrap_or_default()
    }

    /// Returns the number of sources to retrieve.
    pub fn top_k(&self) -> usize {
        self.top_k
            .filter(|top_k| *top_k > 0)
            .and_then(|top_k| usize::try_from(top_k).ok())
            .unwrap_or(DEFAULT_TOP_K)
    }

    /// Returns the usable history messages.
    ///
    /// Entries without content are dropped.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history
            .iter()
            .flatten()
            .flatten()
            .filter_map(|message| {
                let content = message.content.as_deref()?;
                let role = message
                    .role
                    .as_deref()
                    .and_then(|role| Role::from_str(role).ok())
                    .unwrap_or(Role::User);
                Some(ChatMessage::new(role, content))
            })
            .collect()
    }
}
