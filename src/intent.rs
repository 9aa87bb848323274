//! Best-effort intent detection over fixed exemplar phrases.
//!
//! Each intent is described by a handful of exemplar phrases. The exemplars
//! are embedded once per process, and a query is assigned the intent whose
//! exemplar embedding is most cosine-similar to the query embedding. The
//! result only narrows retrieval; when detection fails the pipeline simply
//! proceeds unfiltered.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::errors::ChatError;
use crate::llm::Embedder;
use crate::vector_math::argmax_by_cosine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ProductSearch,
    ProductQa,
    PolicyShipping,
    PolicyReturns,
    PromoPrice,
    Smalltalk,
    Handoff,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::ProductSearch,
        Intent::ProductQa,
        Intent::PolicyShipping,
        Intent::PolicyReturns,
        Intent::PromoPrice,
        Intent::Smalltalk,
        Intent::Handoff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ProductSearch => "product_search",
            Intent::ProductQa => "product_qa",
            Intent::PolicyShipping => "policy_shipping",
            Intent::PolicyReturns => "policy_returns",
            Intent::PromoPrice => "promo_price",
            Intent::Smalltalk => "smalltalk",
            Intent::Handoff => "handoff",
        }
    }

    fn exemplars(&self) -> &'static [&'static str] {
        match self {
            Intent::ProductSearch => &[
                "recommend me a product",
                "I am looking for",
                "suggest alternatives",
                "best option for",
                "which one should I buy",
                "help me choose",
            ],
            Intent::ProductQa => &[
                "does this product have",
                "what are the specs",
                "is it compatible",
                "how does it work",
                "what is the capacity",
                "what comes in the box",
            ],
            Intent::PolicyShipping => &[
                "shipping time",
                "delivery details",
                "how long does shipping take",
                "shipping cost",
                "when will it arrive",
            ],
            Intent::PolicyReturns => &[
                "return policy",
                "refund",
                "can I return",
                "exchange policy",
                "how to return",
            ],
            Intent::PromoPrice => &[
                "discount",
                "coupon",
                "promotion",
                "price",
                "price drop",
                "deal",
            ],
            Intent::Smalltalk => &["hello", "hi", "how are you", "thanks", "good morning"],
            Intent::Handoff => &[
                "talk to an agent",
                "customer support",
                "representative",
                "human help",
            ],
        }
    }

    fn exemplar_text(&self) -> String {
        self.exemplars().join(" | ")
    }
}

pub struct IntentDetector {
    embedder: Arc<dyn Embedder>,
    exemplar_embeddings: OnceCell<Vec<Vec<f32>>>,
}

impl IntentDetector {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            exemplar_embeddings: OnceCell::new(),
        }
    }

    /// Picks the intent whose exemplars best match the already-embedded
    /// query. `None` when the exemplar embeddings cannot be computed or no
    /// candidate is comparable.
    pub async fn detect(&self, query_vector: &[f32]) -> Option<(Intent, f32)> {
        let embeddings = match self.exemplar_embeddings().await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                tracing::warn!("intent exemplar embedding failed: {}", err);
                return None;
            }
        };

        argmax_by_cosine(query_vector, embeddings)
            .map(|(idx, score)| (Intent::ALL[idx], score))
    }

    async fn exemplar_embeddings(&self) -> Result<&Vec<Vec<f32>>, ChatError> {
        self.exemplar_embeddings
            .get_or_try_init(|| async {
                let mut embeddings = Vec::with_capacity(Intent::ALL.len());
                for intent in Intent::ALL {
                    embeddings.push(self.embedder.embed(&intent.exemplar_text()).await?);
                }
                Ok(embeddings)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Hands out one fixed vector per call, in order.
    struct SequenceEmbedder {
        vectors: Mutex<Vec<Vec<f32>>>,
    }

    #[async_trait]
    impl Embedder for SequenceEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ChatError> {
            let mut vectors = self.vectors.lock().expect("lock");
            if vectors.is_empty() {
                return Err(ChatError::Embedding { status: 500 });
            }
            Ok(vectors.remove(0))
        }
    }

    fn unit_vector(dim: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[axis] = 1.0;
        v
    }

    #[tokio::test]
    async fn detects_intent_with_closest_exemplar_embedding() {
        let dim = Intent::ALL.len();
        let embedder = SequenceEmbedder {
            vectors: Mutex::new((0..dim).map(|axis| unit_vector(dim, axis)).collect()),
        };
        let detector = IntentDetector::new(Arc::new(embedder));

        // Query aligned with the smalltalk axis (index 5 in Intent::ALL).
        let (intent, score) = detector
            .detect(&unit_vector(dim, 5))
            .await
            .expect("detection should work");
        assert_eq!(intent, Intent::Smalltalk);
        assert!(score > 0.99);
    }

    #[tokio::test]
    async fn detection_is_none_when_exemplar_embedding_fails() {
        let embedder = SequenceEmbedder {
            vectors: Mutex::new(vec![]),
        };
        let detector = IntentDetector::new(Arc::new(embedder));
        assert!(detector.detect(&[1.0, 0.0]).await.is_none());
    }

    #[test]
    fn intent_names_are_stable() {
        assert_eq!(Intent::PolicyReturns.as_str(), "policy_returns");
        assert_eq!(Intent::ALL.len(), 7);
    }
}
