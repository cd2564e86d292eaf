//! Chat handler.

use axum::{Json, Router};
use axum::extract::State;
use axum::routing::post;
use halo_assistant::types::ChatResponse;

use super::request::ChatRequestBody;
use super::ServiceState;
use crate::service::AssistantService;

/// Tracing target for chat handlers.
const TRACING_TARGET: &str = "halo_assistant_server::handler::chat";

async fn chat(
    State(assistant): State<AssistantService>,
    Json(request): Json<ChatRequestBody>,
) -> Json<ChatResponse> {
    let history = request.history();
    let top_k = request.top_k();

    tracing::debug!(
        target: TRACING_TARGET,
        history = history.len(),
        top_k,
        "Chat requested"
    );

    Json(assistant.chat(request.question(), &history, top_k).await)
}

/// Returns a [`Router`] with the chat route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/chat", post(chat))
}
