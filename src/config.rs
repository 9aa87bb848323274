use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::rag::cloudflare::DEFAULT_API_BASE;
use crate::rag::retriever::DEFAULT_CONTEXT_CHAR_CAP;

pub const DEFAULT_STOREFRONT_BASE_URL: &str = "https://shop.example.com";
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 20;

/// Environment-driven configuration.
///
/// Credentials and service bindings are optional here: their absence is
/// surfaced per request as a configuration error rather than failing at
/// startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub cloudflare_base_url: String,
    pub cf_account_id: Option<String>,
    pub cf_api_token: Option<String>,
    pub vectorize_index: Option<String>,
    pub rag_kv_namespace: Option<String>,
    pub storefront_base_url: String,
    pub port: u16,
    pub completion_timeout: Duration,
    pub context_char_cap: usize,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_nonempty("OPENAI_API_KEY"),
            openai_base_url: env_nonempty("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            cloudflare_base_url: env_nonempty("CF_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            cf_account_id: env_nonempty("CF_ACCOUNT_ID"),
            cf_api_token: env_nonempty("CF_API_TOKEN"),
            vectorize_index: env_nonempty("VECTORIZE_INDEX"),
            rag_kv_namespace: env_nonempty("RAG_KV_NAMESPACE"),
            storefront_base_url: env_nonempty("STOREFRONT_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_STOREFRONT_BASE_URL.to_string()),
            port: env_nonempty("PORT")
                .and_then(|val| val.parse().ok())
                .unwrap_or(0),
            completion_timeout: Duration::from_secs(
                env_nonempty("CHAT_TIMEOUT_SECS")
                    .and_then(|val| val.parse().ok())
                    .unwrap_or(DEFAULT_COMPLETION_TIMEOUT_SECS),
            ),
            context_char_cap: env_nonempty("CONTEXT_CHAR_CAP")
                .and_then(|val| val.parse().ok())
                .unwrap_or(DEFAULT_CONTEXT_CHAR_CAP),
            log_dir: env_nonempty("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
