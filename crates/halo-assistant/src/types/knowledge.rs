//! Knowledge corpus types.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A stored knowledge snippet.
///
/// Older corpora may hold items whose title or content is `null`; those
/// read back as empty strings. The id is always required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Server-assigned identifier.
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// Body of a create or update call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl KnowledgePayload {
    /// Creates a new payload.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_item_with_null_title_reads_as_empty() {
        let items: Vec<KnowledgeItem> = serde_json::from_value(json!([
            { "id": "kb-1", "title": null, "content": "Halo" },
            { "id": "kb-2", "title": "About", "content": null },
            { "id": "kb-3" }
        ]))
        .unwrap();

        assert_eq!(items[0].title, "");
        assert_eq!(items[0].content, "Halo");
        assert_eq!(items[1].content, "");
        assert_eq!((items[2].title.as_str(), items[2].content.as_str()), ("", ""));
    }

    #[test]
    fn test_item_requires_id() {
        let result = serde_json::from_value::<KnowledgeItem>(json!({ "id": null, "title": "T" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_tolerates_missing_fields() {
        let payload: KnowledgePayload = serde_json::from_value(json!({ "title": "T" })).unwrap();
        assert_eq!(payload, KnowledgePayload::new("T", ""));
    }
}
