//! # Touchline Chat
//!
//! The orchestration layer original to Touchline: the column lexicon, the
//! prompt assembler, turn-level streaming events, and the interaction loop
//! that ties the retrieval and completion collaborators together around a
//! session transcript.

pub mod engine;
pub mod event;
pub mod lexicon;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use engine::ChatEngine;
pub use event::ChatEvent;
pub use lexicon::{Lexicon, LexiconEntry};
pub use prompt::PromptAssembler;
