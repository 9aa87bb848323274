use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::ChatError;

/// One nearest-neighbor hit from the vector index.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
}

/// Declared document type of a retrieved chunk. Anything unrecognized is
/// treated as a plain document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    Faq,
    Product,
    Doc,
}

impl DocType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "faq" => DocType::Faq,
            "product" => DocType::Product,
            _ => DocType::Doc,
        }
    }
}

/// A document fetched from the key-value store, keyed by a vector-index
/// match id. Ephemeral: fetched fresh per request, never written back.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub id: String,
    pub text: String,
    pub doc_type: DocType,
    pub metadata: Map<String, Value>,
}

impl RetrievedChunk {
    /// Parses a raw key-value store payload. Stored values are JSON
    /// `{text, metadata}` objects; anything that fails to parse is kept
    /// verbatim as the chunk text with empty metadata.
    pub fn from_kv(id: &str, raw: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(raw).ok();
        let (text, metadata) = match parsed {
            Some(value) => {
                let text = value
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let metadata = value
                    .get("metadata")
                    .and_then(|v| v.as_object())
                    .cloned()
                    .unwrap_or_default();
                (text, metadata)
            }
            None => (raw.to_string(), Map::new()),
        };

        let doc_type = metadata
            .get("type")
            .and_then(|v| v.as_str())
            .map(DocType::parse)
            .unwrap_or(DocType::Doc);

        Self {
            id: id.to_string(),
            text: text.trim().to_string(),
            doc_type,
            metadata,
        }
    }

    /// Formats the chunk for the context block according to its type.
    pub fn format(&self) -> String {
        match self.doc_type {
            DocType::Faq => format!(
                "FAQ\nQ: {}\nA: {}",
                self.meta_str("question").unwrap_or("Question"),
                self.text
            ),
            DocType::Product => format!(
                "PRODUCT\nName: {}\nURL: {}\nDescription: {}",
                self.meta_str("title")
                    .or_else(|| self.meta_str("name"))
                    .unwrap_or("Product"),
                self.meta_str("url")
                    .or_else(|| self.meta_str("link"))
                    .unwrap_or(""),
                self.text
            ),
            DocType::Doc => format!("DOC\n{}", self.text),
        }
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Nearest-neighbor similarity search over embedding vectors.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ChatError>;
}

/// Read-only lookup of stored documents by id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<String>, ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_chunk_formats_exactly() {
        let chunk = RetrievedChunk::from_kv(
            "p1",
            r#"{"text":"Z","metadata":{"type":"product","title":"X","url":"Y"}}"#,
        );
        assert_eq!(chunk.format(), "PRODUCT\nName: X\nURL: Y\nDescription: Z");
    }

    #[test]
    fn product_chunk_falls_back_to_name_and_link_keys() {
        let chunk = RetrievedChunk::from_kv(
            "p2",
            r#"{"text":"desc","metadata":{"type":"product","name":"Belt","link":"https://s/products/b"}}"#,
        );
        assert_eq!(
            chunk.format(),
            "PRODUCT\nName: Belt\nURL: https://s/products/b\nDescription: desc"
        );
    }

    #[test]
    fn faq_chunk_formats_with_question() {
        let chunk = RetrievedChunk::from_kv(
            "f1",
            r#"{"text":"30 days","metadata":{"type":"faq","question":"Return window?"}}"#,
        );
        assert_eq!(chunk.format(), "FAQ\nQ: Return window?\nA: 30 days");
    }

    #[test]
    fn unknown_type_formats_as_doc() {
        let chunk =
            RetrievedChunk::from_kv("d1", r#"{"text":"plain","metadata":{"type":"guide"}}"#);
        assert_eq!(chunk.doc_type, DocType::Doc);
        assert_eq!(chunk.format(), "DOC\nplain");
    }

    #[test]
    fn non_json_value_becomes_raw_doc_text() {
        let chunk = RetrievedChunk::from_kv("d2", "just some stored text");
        assert_eq!(chunk.doc_type, DocType::Doc);
        assert_eq!(chunk.text, "just some stored text");
        assert!(chunk.metadata.is_empty());
    }

    #[test]
    fn text_is_trimmed_on_parse() {
        let chunk = RetrievedChunk::from_kv("d3", r#"{"text":"  padded  ","metadata":{}}"#);
        assert_eq!(chunk.text, "padded");
    }
}
