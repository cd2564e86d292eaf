//! Structured error handling for assistant API operations.

use hipstr::HipStr;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while talking to the assistant API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request could not be formed.
    InvalidInput,
    /// Transport failure (DNS, connection refused, reset).
    NetworkError,
    /// The transport gave up waiting for a response.
    Timeout,
    /// The server answered with a non-2xx status.
    HttpStatus,
    /// Encoding the request or decoding the response failed.
    Serialization,
    /// Client configuration is invalid.
    Configuration,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Check if this error kind is typically retryable.
    ///
    /// The client itself never retries; callers may use this to decide.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Structured error type with classification and response details.
#[must_use]
#[derive(Debug, Error)]
#[error(
    "[{kind}]{}{}",
    status.map(|s| format!(" status {s}")).unwrap_or_default(),
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<HipStr<'static>>,
    /// HTTP status code, when a response was received.
    pub status: Option<u16>,
    /// Response body, parsed as JSON when possible, otherwise the raw text.
    pub body: Option<Value>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status: None,
            body: None,
            source: None,
        }
    }

    /// Creates an error for a non-2xx response.
    ///
    /// The body is kept as JSON when it parses, as a JSON string otherwise,
    /// and dropped when empty.
    pub fn http_status(status: u16, body: &[u8]) -> Self {
        let body = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice::<Value>(body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
            )
        };

        Self {
            status: Some(status),
            body,
            ..Self::new(ErrorKind::HttpStatus)
        }
        .with_message(format!("server responded with HTTP {status}"))
    }

    /// Creates a transport error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates an invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Check if this error is retryable based on its kind.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message("Invalid JSON")
            .with_source(error)
    }
}

// The reqwest error is kept as the source, so messages never repeat it.
impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let classified = if error.is_timeout() {
            Self::timeout().with_message("Request timed out")
        } else if error.is_builder() {
            Self::invalid_input().with_message("Request could not be built")
        } else if error.is_connect() {
            Self::network_error().with_message("Connection failed")
        } else {
            Self::network_error().with_message("Request failed")
        };

        classified.with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_new() {
        let error = Error::new(ErrorKind::Unknown);
        assert_eq!(error.kind, ErrorKind::Unknown);
        assert!(error.message.is_none());
        assert!(error.status.is_none());
        assert!(error.body.is_none());
        assert!(error.source.is_none());
    }

    #[test]
    fn test_http_status_parses_json_body() {
        let error = Error::http_status(500, br#"{"message":"boom"}"#);
        assert_eq!(error.kind, ErrorKind::HttpStatus);
        assert_eq!(error.status, Some(500));
        assert_eq!(error.body, Some(json!({ "message": "boom" })));
    }

    #[test]
    fn test_http_status_keeps_text_body() {
        let error = Error::http_status(502, b"Bad Gateway");
        assert_eq!(error.body, Some(Value::String("Bad Gateway".into())));
    }

    #[test]
    fn test_http_status_drops_empty_body() {
        let error = Error::http_status(404, b"");
        assert_eq!(error.status, Some(404));
        assert!(error.body.is_none());
    }

    #[test]
    fn test_error_display() {
        let display_str = Error::http_status(500, b"").to_string();
        assert!(display_str.contains("http_status"));
        assert!(display_str.contains("500"));
    }

    #[test]
    fn test_from_serde() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let error = Error::from(source);
        assert_eq!(error.kind, ErrorKind::Serialization);
        assert!(error.source.is_some());
    }

    #[test]
    fn test_display_does_not_repeat_source() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let source_text = source.to_string();

        let error = Error::from(source);
        assert_eq!(error.to_string(), "[serialization]: Invalid JSON");
        assert!(!error.to_string().contains(&source_text));

        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), source_text);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::NetworkError.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::HttpStatus.is_retryable());
        assert!(!ErrorKind::Serialization.is_retryable());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            ErrorKind::from_str("http_status").unwrap(),
            ErrorKind::HttpStatus
        );
        assert_eq!(ErrorKind::from_str("timeout").unwrap(), ErrorKind::Timeout);
        assert!(ErrorKind::from_str("invalid").is_err());
    }
}
