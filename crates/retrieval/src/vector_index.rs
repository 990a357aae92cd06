//! HTTP client for the external vector index service.
//!
//! Query flow:
//! 1. Embed the query text via the provider's `/embeddings` endpoint.
//! 2. POST the embedding plus the fixed search parameters (`k`, `fetch_k`,
//!    `lambda_mult`) to `/collections/{name}/query` on the index service.
//! 3. Parse the ordered passage list the service returns.
//!
//! The MMR search itself runs inside the index service. Failures propagate
//! to the caller unretried; the interaction loop aborts the turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use touchline_config::RetrievalConfig;
use touchline_core::error::RetrievalError;
use touchline_core::provider::EmbeddingRequest;
use touchline_core::retrieval::{Passage, Retriever};
use touchline_core::ChatProvider;
use tracing::{debug, info};

/// Retriever backed by an external vector index over HTTP.
pub struct VectorIndexClient {
    /// Provider used to embed queries.
    provider: Arc<dyn ChatProvider>,
    /// Index service base URL.
    base_url: String,
    /// Collection to query.
    collection: String,
    /// Embedding model for query vectors.
    embedding_model: String,
    /// Fixed search parameters, not tunable per call.
    params: SearchParams,
    client: reqwest::Client,
}

/// MMR search parameters forwarded to the index service.
#[derive(Debug, Clone, Serialize)]
pub struct SearchParams {
    /// Number of passages returned.
    pub k: usize,
    /// Candidate pool size.
    pub fetch_k: usize,
    /// Relevance/diversity balance (1.0 = pure relevance).
    pub lambda_mult: f32,
}

impl VectorIndexClient {
    /// Build a client from retrieval config, borrowing the provider for
    /// query embeddings.
    pub fn from_config(config: &RetrievalConfig, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            base_url: config.index_url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            embedding_model: config.embedding_model.clone(),
            params: SearchParams {
                k: config.k,
                fetch_k: config.fetch_k,
                lambda_mult: config.lambda_mult,
            },
            client: reqwest::Client::new(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/collections/{}/query", self.base_url, self.collection)
    }
}

#[async_trait]
impl Retriever for VectorIndexClient {
    fn name(&self) -> &str {
        "vector-index"
    }

    async fn search(&self, query: &str) -> std::result::Result<Vec<Passage>, RetrievalError> {
        debug!(collection = %self.collection, "Embedding query for retrieval");

        let embedding_response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.embedding_model.clone(),
                inputs: vec![query.to_string()],
            })
            .await?;

        let embedding = embedding_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| {
                RetrievalError::MalformedResponse("embedding response had no vectors".into())
            })?;

        let body = QueryRequest {
            embedding,
            k: self.params.k,
            fetch_k: self.params.fetch_k,
            lambda_mult: self.params.lambda_mult,
        };

        let response = self
            .client
            .post(self.query_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(RetrievalError::QueryFailed {
                collection: self.collection.clone(),
                reason: format!("{status}: {reason}"),
            });
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::MalformedResponse(e.to_string()))?;

        let passages: Vec<Passage> = parsed
            .results
            .into_iter()
            .map(|r| Passage { content: r.content, source: r.source, score: r.score })
            .collect();

        info!(
            collection = %self.collection,
            passages = passages.len(),
            "Retrieval complete"
        );

        Ok(passages)
    }

    async fn health_check(&self) -> std::result::Result<bool, RetrievalError> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Index service wire types (internal) ---

#[derive(Debug, Serialize)]
struct QueryRequest {
    embedding: Vec<f32>,
    k: usize,
    fetch_k: usize,
    lambda_mult: f32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    content: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    score: Option<f32>,
}
