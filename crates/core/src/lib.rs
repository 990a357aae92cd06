//! # Touchline Core
//!
//! Domain types, traits, and error definitions for the Touchline
//! tactical-analysis assistant. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Transcript, TranscriptId, Turn};
pub use provider::{ChatProvider, ProviderRequest, ProviderResponse, StreamChunk};
pub use retrieval::{Passage, Retriever};
