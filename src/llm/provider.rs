use async_trait::async_trait;

use crate::errors::ChatError;

/// Turns text into an embedding vector. The retriever and the intent
/// detector only depend on this seam, so tests can swap in fakes.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatError>;
}
