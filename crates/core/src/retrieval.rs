//! Retriever trait — the abstraction over the external vector index.
//!
//! The index is a pre-existing, read-only collaborator. Touchline never
//! builds, migrates, or ranks it; a query goes in, an ordered list of
//! passages comes out. Result count and the diversity parameter of the
//! maximal-marginal-relevance search are fixed at construction, not per
//! call.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A text passage returned by the vector index.
///
/// Created per query and discarded once folded into a prompt; never
/// persisted by this process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// The passage text.
    pub content: String,

    /// Human-readable source label (table name, document id), if the index
    /// reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Relevance score as reported by the index, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), source: None, score: None }
    }
}

/// The retrieval collaborator contract.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// A human-readable name for this retriever (e.g., "vector-index").
    fn name(&self) -> &str;

    /// Retrieve passages relevant to `query`, in the order the index
    /// returns them.
    async fn search(&self, query: &str) -> std::result::Result<Vec<Passage>, RetrievalError>;

    /// Health check — can we reach the index service?
    async fn health_check(&self) -> std::result::Result<bool, RetrievalError> {
        Ok(true)
    }
}
