use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn root() -> impl IntoResponse {
    "Storefront assistant relay is running."
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "completion_configured": state.openai.is_some(),
        "retrieval_configured": state.retriever.is_some(),
    }))
}
