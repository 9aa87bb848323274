use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::{friendly_message, ChatError};
use crate::prompt;
use crate::rag::DEFAULT_TOP_K;
use crate::state::AppState;

pub const MAX_MESSAGE_CHARS: usize = 2000;

pub const EMPTY_MESSAGE_REPLY: &str = "Your message looks empty. Could you type something?";
pub const TOO_LONG_REPLY: &str = "That message is a bit long. Could you make it shorter?";
pub const WRONG_METHOD_REPLY: &str =
    "I can only read chat messages sent as a POST request. Could you try again?";

/// `POST /chat`: relays the message through the RAG pipeline and the
/// completion API.
///
/// Always answers 200 with `{"reply": ..., "_ms": ...}`. Malformed JSON is
/// treated as an empty message, and pipeline failures become a friendly
/// reply with a debug suffix; the client contract never sees a 5xx for
/// model or retrieval trouble.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> impl IntoResponse {
    let started = Instant::now();

    if method != Method::POST {
        return reply_json(WRONG_METHOD_REPLY.to_string(), started);
    }

    // Raw bytes, decoded lossily: a body that is not valid UTF-8 must fall
    // into the empty-message path, never a 400 from the extractor.
    let message = parse_message(&String::from_utf8_lossy(&body));
    if let Some(rejection) = precheck(&message) {
        return reply_json(rejection.to_string(), started);
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, chars = message.chars().count(), "chat request");

    let reply = match answer(&state, &message).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(%request_id, error = %err, "chat pipeline failed");
            format!("{}\n\nDEBUG: {}", friendly_message(&err.to_string()), err)
        }
    };

    reply_json(reply, started)
}

async fn answer(state: &AppState, message: &str) -> Result<String, ChatError> {
    let openai = state
        .openai
        .as_ref()
        .ok_or_else(|| ChatError::Config("OPENAI_API_KEY is not set".to_string()))?;
    let retriever = state.retriever.as_ref().ok_or_else(|| {
        ChatError::Config("vector index or document store binding is missing".to_string())
    })?;

    let retrieved = retriever.retrieve(message, DEFAULT_TOP_K).await?;
    tracing::debug!(
        intent = retrieved.intent.map(|i| i.as_str()),
        context_chars = retrieved.context.chars().count(),
        sources = retrieved.sources.len(),
        "retrieved context"
    );

    let request = prompt::compose(message, &retrieved.context);
    openai.respond(&request).await
}

/// Lenient body parse: anything other than a JSON object with a string
/// `message` field becomes an empty message.
fn parse_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_default()
}

/// Input validation that runs before any upstream call.
fn precheck(message: &str) -> Option<&'static str> {
    if message.is_empty() {
        return Some(EMPTY_MESSAGE_REPLY);
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Some(TOO_LONG_REPLY);
    }
    None
}

fn reply_json(reply: String, started: Instant) -> axum::response::Response {
    Json(json!({
        "reply": reply,
        "_ms": started.elapsed().as_millis() as u64,
    }))
    .into_response()
}
