//! HTTP implementations of the retrieval seams backed by Cloudflare's
//! Vectorize and Workers KV REST APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::ChatError;
use super::store::{DocumentStore, VectorIndex, VectorMatch};

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const BODY_PREFIX_CHARS: usize = 300;

/// Shared account-scoped credentials for the Cloudflare REST API.
#[derive(Clone)]
pub struct CloudflareApi {
    client: Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

impl CloudflareApi {
    pub fn new(base_url: String, account_id: String, api_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id,
            api_token,
        }
    }

    fn account_url(&self, suffix: &str) -> String {
        format!("{}/accounts/{}/{}", self.base_url, self.account_id, suffix)
    }
}

/// Top-K similarity search against a named Vectorize index.
#[derive(Clone)]
pub struct VectorizeIndex {
    api: CloudflareApi,
    index_name: String,
}

impl VectorizeIndex {
    pub fn new(api: CloudflareApi, index_name: String) -> Self {
        Self { api, index_name }
    }
}

#[async_trait]
impl VectorIndex for VectorizeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ChatError> {
        let url = self
            .api
            .account_url(&format!("vectorize/v2/indexes/{}/query", self.index_name));
        let res = self
            .api
            .client
            .post(&url)
            .bearer_auth(&self.api.api_token)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "returnValues": false,
            }))
            .send()
            .await?;

        let status = res.status();
        let raw = res.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "vector index query rejected");
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body_prefix: raw.chars().take(BODY_PREFIX_CHARS).collect(),
            });
        }

        let payload: Value = serde_json::from_str(&raw)
            .map_err(|_| ChatError::Parse("vector index response is not JSON".to_string()))?;
        let matches = payload
            .pointer("/result/matches")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<VectorMatch>(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(matches)
    }
}

/// Document lookup against a Workers KV namespace. A 404 is a silent miss,
/// not an error.
#[derive(Clone)]
pub struct WorkersKv {
    api: CloudflareApi,
    namespace_id: String,
}

impl WorkersKv {
    pub fn new(api: CloudflareApi, namespace_id: String) -> Self {
        Self { api, namespace_id }
    }
}

#[async_trait]
impl DocumentStore for WorkersKv {
    async fn get(&self, id: &str) -> Result<Option<String>, ChatError> {
        let url = self.api.account_url(&format!(
            "storage/kv/namespaces/{}/values/{}",
            self.namespace_id,
            urlencoding::encode(id)
        ));
        let res = self
            .api
            .client
            .get(&url)
            .bearer_auth(&self.api.api_token)
            .send()
            .await?;

        let status = res.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        let raw = res.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), key = id, "kv lookup rejected");
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body_prefix: raw.chars().take(BODY_PREFIX_CHARS).collect(),
            });
        }

        Ok(Some(raw))
    }
}
