//! Assistant API client.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::endpoint::Endpoint;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::types::{ChatRequest, ChatResponse, KnowledgeItem, KnowledgePayload};
use crate::{ClientConfig, Error, Result};

/// Tracing target for client operations.
pub const TRACING_TARGET: &str = "halo_assistant::client";

/// Inner client that holds the transport and configuration.
struct AssistantClientInner {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

/// Client for the AI assistant plugin API.
///
/// Every method performs exactly one request and keeps no state between
/// calls. Clones share the same transport.
///
/// # Examples
///
/// ```rust,ignore
/// use halo_assistant::{AssistantClient, ChatRequest, ClientConfig};
///
/// let config = ClientConfig::default().with_origin("https://blog.example.com");
/// let client = AssistantClient::new(config)?;
///
/// let response = client.chat(&ChatRequest::new("What is Halo?")).await?;
/// println!("{}", response.answer);
/// ```
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

impl std::fmt::Debug for AssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AssistantClient {
    /// Creates a client backed by a [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.clone())?;
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a client that sends requests through the given transport.
    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Self
    where
        T: HttpTransport + 'static,
    {
        tracing::debug!(
            target: TRACING_TARGET,
            origin = config.resolved_origin(),
            "Creating assistant client"
        );

        let inner = AssistantClientInner {
            transport: Arc::new(transport),
            config,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Asks the assistant a question.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = encode(request)?;
        let response = self
            .send(HttpMethod::Post, Endpoint::Chat, Some(body))
            .await?;
        decode(&response)
    }

    /// Lists every stored knowledge item.
    pub async fn list_knowledge(&self) -> Result<Vec<KnowledgeItem>> {
        let response = self
            .send(HttpMethod::Get, Endpoint::Knowledge, None)
            .await?;
        decode(&response)
    }

    /// Stores a new knowledge item and returns it with its assigned id.
    pub async fn create_knowledge(&self, payload: &KnowledgePayload) -> Result<KnowledgeItem> {
        let body = encode(payload)?;
        let response = self
            .send(HttpMethod::Post, Endpoint::Knowledge, Some(body))
            .await?;
        decode(&response)
    }

    /// Replaces the title and content of an existing knowledge item.
    pub async fn update_knowledge(
        &self,
        id: &str,
        payload: &KnowledgePayload,
    ) -> Result<KnowledgeItem> {
        let body = encode(payload)?;
        let response = self
            .send(HttpMethod::Put, Endpoint::KnowledgeItem(id), Some(body))
            .await?;
        decode(&response)
    }

    /// Deletes a knowledge item.
    pub async fn delete_knowledge(&self, id: &str) -> Result<()> {
        self.send(HttpMethod::Delete, Endpoint::KnowledgeItem(id), None)
            .await?;
        Ok(())
    }

    /// Sends one request and maps non-2xx responses to errors.
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: Endpoint<'_>,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let started_at = Instant::now();
        let url = endpoint.url(self.inner.config.resolved_origin());

        tracing::debug!(
            target: TRACING_TARGET,
            %method,
            %url,
            body_bytes = body.as_ref().map_or(0, Vec::len),
            "Sending assistant request"
        );

        let mut request = HttpRequest::new(method, url);
        request.body = body;

        let response = self.inner.transport.send(request).await?;
        let elapsed_ms = started_at.elapsed().as_millis();

        if !response.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                %method,
                status = response.status,
                elapsed_ms,
                "Assistant request rejected"
            );
            return Err(Error::http_status(response.status, &response.body));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            %method,
            status = response.status,
            elapsed_ms,
            "Assistant request completed"
        );

        Ok(response)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| {
        Error::serialization()
            .with_message("Unexpected response body")
            .with_source(e)
    })
}
