//! Request and response types of the assistant API.

mod chat;
mod knowledge;

use serde::{Deserialize, Deserializer};

pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role, SourceReference};
pub use knowledge::{KnowledgeItem, KnowledgePayload};

/// Reads `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
