use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::ChatError;
use crate::intent::{Intent, IntentDetector};
use crate::llm::Embedder;
use super::store::{DocType, DocumentStore, RetrievedChunk, VectorIndex};

pub const DEFAULT_TOP_K: usize = 6;
pub const DEFAULT_CONTEXT_CHAR_CAP: usize = 9000;

const CHUNK_SEPARATOR: &str = "\n\n";
const MAX_SOURCES: usize = 6;

/// Context retrieved for one request. Owned by that request alone.
#[derive(Debug)]
pub struct RetrievedContext {
    pub context: String,
    pub sources: Vec<String>,
    pub intent: Option<Intent>,
}

pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn DocumentStore>,
    intents: IntentDetector,
    context_char_cap: usize,
}

impl ContextRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn DocumentStore>,
        context_char_cap: usize,
    ) -> Self {
        let intents = IntentDetector::new(embedder.clone());
        Self {
            embedder,
            index,
            store,
            intents,
            context_char_cap,
        }
    }

    /// Embeds the query, finds the top-K nearest documents, and formats
    /// them into a single context block.
    ///
    /// Key-value misses are skipped silently; no matches at all yields an
    /// empty context string, not an error. The index and store are never
    /// written to.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievedContext, ChatError> {
        let vector = self.embedder.embed(query).await?;

        let intent = self.intents.detect(&vector).await.map(|(intent, score)| {
            tracing::debug!(intent = intent.as_str(), score, "detected intent");
            intent
        });

        let matches = self.index.query(&vector, top_k).await?;

        let mut chunks = Vec::new();
        for m in &matches {
            if m.id.is_empty() {
                continue;
            }
            let Some(raw) = self.store.get(&m.id).await? else {
                continue;
            };
            let chunk = RetrievedChunk::from_kv(&m.id, &raw);
            if chunk.text.is_empty() {
                continue;
            }
            chunks.push(chunk);
        }

        let chunks = filter_by_intent(chunks, intent, top_k);
        let context = build_context(&chunks, self.context_char_cap);
        let sources = extract_sources(&chunks, MAX_SOURCES);

        Ok(RetrievedContext {
            context,
            sources,
            intent,
        })
    }
}

/// Narrows retrieved chunks to the types relevant for the detected intent.
///
/// Smalltalk needs no context at all. For the other intents, an empty
/// filtered list falls back to the unfiltered chunks so a misfired
/// detection never starves the prompt.
pub fn filter_by_intent(
    chunks: Vec<RetrievedChunk>,
    intent: Option<Intent>,
    top_k: usize,
) -> Vec<RetrievedChunk> {
    let Some(intent) = intent else {
        return chunks;
    };

    let keep = |doc_type: DocType| -> bool {
        match intent {
            Intent::Smalltalk => false,
            Intent::PolicyShipping | Intent::PolicyReturns => doc_type == DocType::Faq,
            Intent::ProductSearch | Intent::ProductQa => doc_type == DocType::Product,
            Intent::PromoPrice => matches!(doc_type, DocType::Product | DocType::Faq),
            Intent::Handoff => true,
        }
    };

    if intent == Intent::Smalltalk {
        return Vec::new();
    }

    let filtered: Vec<RetrievedChunk> = chunks
        .iter()
        .filter(|c| keep(c.doc_type))
        .take(top_k)
        .cloned()
        .collect();

    if filtered.is_empty() {
        let mut fallback = chunks;
        fallback.truncate(top_k);
        fallback
    } else {
        filtered
    }
}

/// Joins formatted chunks with blank lines and truncates the result to the
/// character cap.
pub fn build_context(chunks: &[RetrievedChunk], char_cap: usize) -> String {
    let joined = chunks
        .iter()
        .map(RetrievedChunk::format)
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);
    truncate_chars(joined, char_cap)
}

/// Metadata `url` values of the chunks, deduplicated in order.
pub fn extract_sources(chunks: &[RetrievedChunk], max_sources: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter_map(|c| c.meta_str("url"))
        .filter(|url| seen.insert(url.to_string()))
        .map(str::to_string)
        .take(max_sources)
        .collect()
}

fn truncate_chars(text: String, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text;
    }
    text.chars().take(cap).collect()
}
