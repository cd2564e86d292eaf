//! Reqwest-based transport.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};

use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TRACING_TARGET};
use crate::connect::ClientConfig;
use crate::{Error, Result};

/// Inner transport that holds the HTTP client and configuration.
struct ReqwestTransportInner {
    http: Client,
    config: ClientConfig,
}

/// Reqwest-based transport sharing one connection pool across calls.
///
/// # Examples
///
/// ```rust,ignore
/// use halo_assistant::{ClientConfig, ReqwestTransport};
///
/// let config = ClientConfig::default().with_origin("https://blog.example.com");
/// let transport = ReqwestTransport::new(config)?;
/// ```
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: Arc<ReqwestTransportInner>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates a new transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured header is malformed or the HTTP
    /// client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_secs = ?config.http_timeout,
            headers = config.headers.len(),
            "Creating reqwest transport"
        );

        let mut builder = Client::builder()
            .user_agent(config.effective_user_agent())
            .default_headers(default_headers(&config)?);

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build()?;
        let inner = ReqwestTransportInner { http, config };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.parsed_headers()? {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid header name: {name}"))
                .with_source(e)
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid value for header {name}"))
                .with_source(e)
        })?;
        headers.append(name, value);
    }
    Ok(headers)
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let started_at = Instant::now();

        let mut http_request = self
            .inner
            .http
            .request(request.method.into(), request.url.as_str());

        if let Some(body) = request.body {
            http_request = http_request
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }

        let http_response = http_request.send().await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                method = %request.method,
                url = %request.url,
                error = %e,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Request failed before a response was received"
            );
            Error::from(e)
        })?;

        let status = http_response.status().as_u16();
        let body = http_response.bytes().await?;

        tracing::trace!(
            target: TRACING_TARGET,
            method = %request.method,
            url = %request.url,
            status,
            bytes = body.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Response received"
        );

        Ok(HttpResponse::new(status, body))
    }
}
