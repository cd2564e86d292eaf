//! Knowledge corpus handlers.

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use halo_assistant::types::{KnowledgeItem, KnowledgePayload};

use super::{Result, ServiceState};
use crate::store::KnowledgeStore;

/// Tracing target for knowledge handlers.
const TRACING_TARGET: &str = "halo_assistant_server::handler::knowledge";

async fn list_knowledge(State(store): State<KnowledgeStore>) -> Json<Vec<KnowledgeItem>> {
    Json(store.list().await)
}

async fn create_knowledge(
    State(store): State<KnowledgeStore>,
    Json(payload): Json<KnowledgePayload>,
) -> Result<(StatusCode, Json<KnowledgeItem>)> {
    let item = store.create(payload).await?;

    tracing::info!(target: TRACING_TARGET, id = %item.id, "Knowledge item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_knowledge(
    State(store): State<KnowledgeStore>,
    Path(id): Path<String>,
    Json(payload): Json<KnowledgePayload>,
) -> Result<Json<KnowledgeItem>> {
    let item = store.update(&id, payload).await?;

    tracing::info!(target: TRACING_TARGET, %id, "Knowledge item updated");
    Ok(Json(item))
}

async fn delete_knowledge(
    State(store): State<KnowledgeStore>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    store.delete(&id).await?;

    tracing::info!(target: TRACING_TARGET, %id, "Knowledge item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with the knowledge routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/knowledge", get(list_knowledge).post(create_knowledge))
        .route(
            "/knowledge/{id}",
            put(update_knowledge).delete(delete_knowledge),
        )
}
