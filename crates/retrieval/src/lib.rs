//! Retrieval client implementations for Touchline.
//!
//! The vector index is an external, pre-built, read-only service. The
//! client here embeds the user query via the provider's embeddings
//! endpoint and delegates the maximal-marginal-relevance search to the
//! index service — no similarity math happens in this process.

pub mod vector_index;

pub use vector_index::VectorIndexClient;
