//! HTTP transport abstraction.
//!
//! The client builds [`HttpRequest`]s and hands them to an [`HttpTransport`].
//! [`ReqwestTransport`] is the production implementation; a recording
//! [`MockTransport`] is available for tests.

#[cfg(any(test, feature = "test-utils"))]
mod mock;
mod reqwest;

use bytes::Bytes;
use strum::{AsRefStr, Display, IntoStaticStr};

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use self::mock::MockTransport;
pub use self::reqwest::ReqwestTransport;
use crate::Result;

/// Tracing target for transport operations.
pub const TRACING_TARGET: &str = "halo_assistant::transport";

/// HTTP methods used by the assistant API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// A fully formed request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, or a path-only URL when no origin is configured.
    pub url: String,
    /// JSON-encoded body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request without a body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attaches a JSON-encoded body.
    #[must_use]
    pub fn with_json_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Decodes the body as JSON.
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.body.as_deref().map(serde_json::from_slice)
    }
}

/// Status and body of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a new response.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns one response.
///
/// Implementations report transport failures as errors and return every
/// received response, whatever its status, as `Ok`.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
