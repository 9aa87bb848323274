use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::OpenAiClient;
use crate::rag::cloudflare::{CloudflareApi, VectorizeIndex, WorkersKv};
use crate::rag::ContextRetriever;
use crate::widget::Storefront;

/// Shared, read-only application state.
///
/// The OpenAI client and the retriever are `None` when their credentials or
/// bindings are missing; the chat handler reports that per request instead
/// of the process refusing to start.
pub struct AppState {
    pub config: AppConfig,
    pub openai: Option<OpenAiClient>,
    pub retriever: Option<ContextRetriever>,
    pub storefront: Storefront,
}

impl AppState {
    pub fn initialize(config: AppConfig) -> Arc<Self> {
        let openai = config.openai_api_key.as_ref().map(|key| {
            OpenAiClient::new(
                config.openai_base_url.clone(),
                key.clone(),
                config.completion_timeout,
            )
        });

        let retriever = match (
            &openai,
            &config.cf_account_id,
            &config.cf_api_token,
            &config.vectorize_index,
            &config.rag_kv_namespace,
        ) {
            (Some(openai), Some(account_id), Some(api_token), Some(index), Some(namespace)) => {
                let api = CloudflareApi::new(
                    config.cloudflare_base_url.clone(),
                    account_id.clone(),
                    api_token.clone(),
                );
                Some(ContextRetriever::new(
                    Arc::new(openai.clone()),
                    Arc::new(VectorizeIndex::new(api.clone(), index.clone())),
                    Arc::new(WorkersKv::new(api, namespace.clone())),
                    config.context_char_cap,
                ))
            }
            _ => {
                tracing::warn!("vector index or document store binding missing; retrieval disabled");
                None
            }
        };

        let storefront = Storefront::new(config.storefront_base_url.clone());

        Arc::new(AppState {
            config,
            openai,
            retriever,
            storefront,
        })
    }
}
