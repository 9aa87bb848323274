//! Retrieval-augmented context for chat replies.
//!
//! The retriever embeds the user query, asks an external vector index for
//! the nearest matches, fetches each match's document from a key-value
//! store, and formats the results into a single context block. Both the
//! index and the store are read-only from this side.

pub mod cloudflare;
pub mod retriever;
pub mod store;

pub use retriever::{ContextRetriever, RetrievedContext, DEFAULT_TOP_K};
pub use store::{DocType, DocumentStore, RetrievedChunk, VectorIndex, VectorMatch};
