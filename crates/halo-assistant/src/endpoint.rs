//! Endpoint paths of the assistant plugin API.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Path prefix under which the host exposes the plugin API.
pub const PLUGIN_API_PREFIX: &str =
    "/apis/api.plugin.halo.run/v1alpha1/plugins/ai-assistant/assistant";

/// Bytes left unescaped in a path segment, matching `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a value for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// An endpoint of the assistant API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// `/chat`
    Chat,
    /// `/knowledge`
    Knowledge,
    /// `/knowledge/{id}`
    KnowledgeItem(&'a str),
}

impl Endpoint<'_> {
    /// Returns the path below the plugin prefix, with ids encoded.
    pub fn path(&self) -> String {
        match self {
            Self::Chat => "/chat".to_owned(),
            Self::Knowledge => "/knowledge".to_owned(),
            Self::KnowledgeItem(id) => format!("/knowledge/{}", encode_segment(id)),
        }
    }

    /// Returns the full URL for the given origin.
    ///
    /// An empty origin yields a path-only URL.
    pub fn url(&self, origin: &str) -> String {
        format!("{origin}{PLUGIN_API_PREFIX}{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment_matches_uri_component() {
        assert_eq!(encode_segment("abc-123_x.y"), "abc-123_x.y");
        assert_eq!(encode_segment("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(encode_segment("50% off"), "50%25%20off");
        assert_eq!(encode_segment("!~*'()"), "!~*'()");
        assert_eq!(encode_segment("知识"), "%E7%9F%A5%E8%AF%86");
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(
            Endpoint::Chat.url("https://blog.example.com"),
            "https://blog.example.com/apis/api.plugin.halo.run/v1alpha1/plugins/ai-assistant/assistant/chat"
        );
        assert_eq!(
            Endpoint::Knowledge.url(""),
            "/apis/api.plugin.halo.run/v1alpha1/plugins/ai-assistant/assistant/knowledge"
        );
        assert_eq!(
            Endpoint::KnowledgeItem("a/b").path(),
            "/knowledge/a%2Fb"
        );
    }
}
