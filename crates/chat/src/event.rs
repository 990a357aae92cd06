//! Turn-level streaming events.
//!
//! `ChatEvent` wraps provider-level stream chunks into higher-level events
//! the hosting shell renders: retrieval progress, text fragments in arrival
//! order, and final turn metadata.

use serde::{Deserialize, Serialize};
use touchline_core::provider::Usage;

/// Events emitted by the engine while processing one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Retrieval against the vector index has started.
    RetrievalStarted,

    /// Retrieval finished; `passages` were folded into the prompt.
    RetrievalFinished { passages: usize },

    /// Partial text fragment from the completion stream.
    Fragment { content: String },

    /// The turn is complete — the full answer is on the transcript.
    Done { usage: Option<Usage> },
}

impl ChatEvent {
    /// Event name for logging and wire protocols.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RetrievalStarted => "retrieval_started",
            Self::RetrievalFinished { .. } => "retrieval_finished",
            Self::Fragment { .. } => "fragment",
            Self::Done { .. } => "done",
        }
    }
}
