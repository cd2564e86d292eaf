//! All `axum::`[`Router`]s with related handlers.
//!
//! Every route lives under [`PLUGIN_API_PREFIX`], the path the Halo host
//! mounts the plugin backend at.

mod chat;
mod error;
mod knowledge;
mod request;

use axum::Router;
use axum::extract::FromRef;
use axum::response::{IntoResponse, Response};
use halo_assistant::endpoint::PLUGIN_API_PREFIX;
use tower_http::trace::TraceLayer;

pub use crate::handler::error::{Error, ErrorKind, ErrorResponse, Result};
pub use crate::handler::request::{ChatRequestBody, HistoryMessage};
use crate::service::AssistantService;
use crate::store::KnowledgeStore;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub store: KnowledgeStore,
    pub assistant: AssistantService,
}

impl ServiceState {
    /// Creates the state from its services.
    pub fn new(store: KnowledgeStore, assistant: AssistantService) -> Self {
        Self { store, assistant }
    }
}

impl FromRef<ServiceState> for KnowledgeStore {
    fn from_ref(state: &ServiceState) -> Self {
        state.store.clone()
    }
}

impl FromRef<ServiceState> for AssistantService {
    fn from_ref(state: &ServiceState) -> Self {
        state.assistant.clone()
    }
}

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns the complete [`Router`] of the assistant backend.
pub fn routes(state: ServiceState) -> Router {
    let api = Router::new()
        .merge(chat::routes())
        .merge(knowledge::routes());

    Router::new()
        .nest(PLUGIN_API_PREFIX, api)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod test {
    use halo_assistant::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
    use halo_assistant::types::{ChatMessage, ChatRequest, KnowledgePayload};
    use halo_assistant::{AssistantClient, ClientConfig, ErrorKind as ClientErrorKind};
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    use super::*;
    use crate::service::{BLANK_QUESTION_ANSWER, fallback_answer};

    /// Serves a fresh backend without a chat model and returns its origin.
    async fn create_test_server() -> (TempDir, KnowledgeStore, String) {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("knowledge.json")).await;
        let state = ServiceState::new(store.clone(), AssistantService::new(store.clone(), None));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = routes(state);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (dir, store, format!("http://{addr}"))
    }

    fn client(origin: &str) -> AssistantClient {
        AssistantClient::new(ClientConfig::default().with_origin(origin)).unwrap()
    }

    #[tokio::test]
    async fn test_knowledge_round_trip_through_client() {
        let (_dir, store, origin) = create_test_server().await;
        let client = client(&origin);

        assert!(client.list_knowledge().await.unwrap().is_empty());

        let created = client
            .create_knowledge(&KnowledgePayload::new("About", "Halo is a CMS"))
            .await
            .unwrap();
        assert!(created.id.starts_with("kb-"));
        assert_eq!(client.list_knowledge().await.unwrap(), [created.clone()]);

        let updated = client
            .update_knowledge(&created.id, &KnowledgePayload::new("About Halo", "Halo 2"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "About Halo");

        let persisted = KnowledgeStore::open(store.path()).await.list().await;
        assert_eq!(persisted, [updated]);

        client.delete_knowledge(&created.id).await.unwrap();
        client.delete_knowledge(&created.id).await.unwrap();
        assert!(client.list_knowledge().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (_dir, _store, origin) = create_test_server().await;

        let error = client(&origin)
            .update_knowledge("a/b?c", &KnowledgePayload::new("T", "C"))
            .await
            .unwrap_err();

        assert_eq!(error.kind, ClientErrorKind::HttpStatus);
        assert_eq!(error.status, Some(404));
        let body = error.body.unwrap();
        assert_eq!(body["name"], "not_found");
        assert_eq!(body["resource"], "a/b?c");
    }

    #[tokio::test]
    async fn test_status_codes() {
        let (_dir, _store, origin) = create_test_server().await;
        let transport = ReqwestTransport::new(ClientConfig::default()).unwrap();
        let url = |path: &str| format!("{origin}{PLUGIN_API_PREFIX}{path}");

        let created = transport
            .send(
                HttpRequest::new(HttpMethod::Post, url("/knowledge"))
                    .with_json_body(br#"{"title":"T","content":"C"}"#.to_vec()),
            )
            .await
            .unwrap();
        assert_eq!(created.status, 201);
        let id = serde_json::from_slice::<serde_json::Value>(&created.body).unwrap()["id"]
            .as_str()
            .unwrap()
            .to_owned();

        let deleted = transport
            .send(HttpRequest::new(HttpMethod::Delete, url(&format!("/knowledge/{id}"))))
            .await
            .unwrap();
        assert_eq!(deleted.status, 204);
        assert!(deleted.body.is_empty());

        let missing = transport
            .send(HttpRequest::new(HttpMethod::Get, format!("{origin}/unknown")))
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn test_create_with_null_fields_stores_empty_strings() {
        let (_dir, _store, origin) = create_test_server().await;
        let transport = ReqwestTransport::new(ClientConfig::default()).unwrap();

        let response = transport
            .send(
                HttpRequest::new(
                    HttpMethod::Post,
                    format!("{origin}{PLUGIN_API_PREFIX}/knowledge"),
                )
                .with_json_body(br#"{"title":null}"#.to_vec()),
            )
            .await
            .unwrap();
        assert_eq!(response.status, 201);

        let item: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(item["title"], "");
        assert_eq!(item["content"], "");
    }

    #[tokio::test]
    async fn test_chat_through_client() {
        let (_dir, _store, origin) = create_test_server().await;
        let client = client(&origin);
        client
            .create_knowledge(&KnowledgePayload::new("Themes", "Halo supports themes"))
            .await
            .unwrap();
        client
            .create_knowledge(&KnowledgePayload::new("Unrelated", "nothing here"))
            .await
            .unwrap();

        let request = ChatRequest::new("does halo support themes")
            .push_history(ChatMessage::user("hi"))
            .with_top_k(3);
        let response = client.chat(&request).await.unwrap();

        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].title, "Themes");
        assert_eq!(response.sources[0].snippet, "Halo supports themes");
        assert_eq!(response.answer, fallback_answer(&response.sources));

        let response = client.chat(&ChatRequest::new(" ")).await.unwrap();
        assert_eq!(response.answer, BLANK_QUESTION_ANSWER);
        assert!(!response.has_sources());
    }

    #[tokio::test]
    async fn test_chat_accepts_lenient_body() {
        let (_dir, _store, origin) = create_test_server().await;
        let transport = ReqwestTransport::new(ClientConfig::default()).unwrap();

        let body = json!({
            "question": "halo",
            "history": [{ "role": "tool", "content": "x" }, null],
            "topK": -1
        });
        let response = transport
            .send(
                HttpRequest::new(HttpMethod::Post, format!("{origin}{PLUGIN_API_PREFIX}/chat"))
                    .with_json_body(serde_json::to_vec(&body).unwrap()),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let answer: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(answer["sources"], json!([]));
    }
}
