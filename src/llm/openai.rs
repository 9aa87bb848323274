use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::ChatError;
use super::provider::Embedder;
use super::types::CompletionRequest;

pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const COMPLETION_MODEL: &str = "gpt-4.1-nano";

/// Returned when the completion API answered successfully but produced no
/// extractable text. Not an error.
pub const FALLBACK_REPLY: &str = "Sorry—I'm having trouble generating a response right now.";

const BODY_PREFIX_CHARS: usize = 300;

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    completion_timeout: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, completion_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            completion_timeout,
        }
    }

    /// Embeds `text` with the fixed embedding model.
    ///
    /// A non-success status or a response without the vector field fails with
    /// `ChatError::Embedding`; callers must not retry automatically.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": EMBEDDING_MODEL, "input": text }))
            .send()
            .await?;

        let status = res.status();
        let payload: Value = res.json().await.unwrap_or_else(|_| json!({}));
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "embedding request rejected");
            return Err(ChatError::Embedding {
                status: status.as_u16(),
            });
        }

        let vector: Option<Vec<f32>> = payload["data"][0]["embedding"].as_array().map(|vals| {
            vals.iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect()
        });

        match vector {
            Some(vec) if !vec.is_empty() => Ok(vec),
            _ => {
                tracing::warn!("embedding response missing vector field");
                Err(ChatError::Embedding {
                    status: status.as_u16(),
                })
            }
        }
    }

    /// Sends the composed prompt to the responses API and extracts plain
    /// text from the reply.
    ///
    /// The whole exchange runs under a cancellable timeout; when it expires
    /// the in-flight request is dropped and `ChatError::Timeout` surfaces.
    pub async fn respond(&self, request: &CompletionRequest) -> Result<String, ChatError> {
        let url = format!("{}/v1/responses", self.base_url);
        let body = json!({
            "model": COMPLETION_MODEL,
            "input": request.messages(),
        });

        let exchange = async {
            let res = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;
            let status = res.status();
            let raw = res.text().await.unwrap_or_default();
            Ok::<_, reqwest::Error>((status, raw))
        };

        let (status, raw) = tokio::time::timeout(self.completion_timeout, exchange)
            .await
            .map_err(|_| ChatError::Timeout)??;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "completion request rejected");
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body_prefix: raw.chars().take(BODY_PREFIX_CHARS).collect(),
            });
        }

        let payload: Value = serde_json::from_str(&raw)
            .map_err(|_| ChatError::Parse("completion response is not JSON".to_string()))?;

        let direct = payload
            .get("output_text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        if !direct.is_empty() {
            return Ok(direct.to_string());
        }

        let extracted = extract_output_text(&payload);
        if !extracted.is_empty() {
            return Ok(extracted);
        }

        tracing::warn!(
            id = payload.get("id").and_then(|v| v.as_str()),
            model = payload.get("model").and_then(|v| v.as_str()),
            "completion response had no extractable text"
        );
        Ok(FALLBACK_REPLY.to_string())
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        OpenAiClient::embed(self, text).await
    }
}

/// Walks the structured `output` list and concatenates every string `text`
/// or `value` field in list order. Empty string when the shape is absent.
pub fn extract_output_text(payload: &Value) -> String {
    let Some(items) = payload.get("output").and_then(|v| v.as_array()) else {
        return String::new();
    };

    let mut buf = String::new();
    for item in items {
        let Some(content) = item.get("content").and_then(|v| v.as_array()) else {
            continue;
        };
        for entry in content {
            if let Some(text) = entry.get("text").and_then(|v| v.as_str()) {
                buf.push_str(text);
            }
            if let Some(value) = entry.get("value").and_then(|v| v.as_str()) {
                buf.push_str(value);
            }
        }
    }

    buf.trim().to_string()
}
