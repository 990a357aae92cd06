//! The interaction loop.
//!
//! One turn moves through: idle → submitted (user turn recorded) →
//! retrieving (vector index query) → generating (streamed completion) →
//! idle. Retrieval and generation are awaited in sequence; a failure in
//! either aborts the turn, leaving the user turn on the transcript and no
//! assistant turn. There is no retry, cancellation, or input validation.
//!
//! The engine borrows the transcript mutably for the duration of a turn,
//! so overlapping submissions into one session cannot be expressed.

use crate::event::ChatEvent;
use crate::prompt::PromptAssembler;
use std::sync::Arc;
use tokio::sync::mpsc;
use touchline_core::message::{Transcript, Turn};
use touchline_core::provider::ProviderRequest;
use touchline_core::retrieval::Retriever;
use touchline_core::{ChatProvider, Error};
use tracing::{debug, info};

/// The interaction loop: retrieval, prompt assembly, streamed generation,
/// transcript bookkeeping.
pub struct ChatEngine {
    /// Completion/embedding provider.
    provider: Arc<dyn ChatProvider>,
    /// Vector index client.
    retriever: Arc<dyn Retriever>,
    /// Prompt assembler (system message cached inside).
    assembler: PromptAssembler,
    /// Completion model identifier.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Max tokens per completion.
    max_tokens: Option<u32>,
}

impl ChatEngine {
    /// Create a new engine.
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        retriever: Arc<dyn Retriever>,
        assembler: PromptAssembler,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            retriever,
            assembler,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Set the max tokens per completion.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Process one user submission.
    ///
    /// Appends the user turn, retrieves passages, assembles the prompt,
    /// streams the completion (forwarding each fragment to `events` in
    /// arrival order), and appends the accumulated answer as one assistant
    /// turn. Returns the final answer text.
    ///
    /// On error the user turn stays recorded and prior history is
    /// untouched; no assistant turn is appended.
    pub async fn ask(
        &self,
        transcript: &mut Transcript,
        question: &str,
        events: &mpsc::Sender<ChatEvent>,
    ) -> Result<String, Error> {
        transcript.push(Turn::user(question));

        info!(model = %self.model, "Turn submitted, starting retrieval");
        let _ = events.send(ChatEvent::RetrievalStarted).await;

        let passages = self.retriever.search(question).await?;
        let _ = events
            .send(ChatEvent::RetrievalFinished { passages: passages.len() })
            .await;

        debug!(passages = passages.len(), "Assembling prompt");
        let messages = self.assembler.assemble(question, &passages);

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let mut rx = self.provider.stream(request).await?;

        let mut answer = String::new();
        let mut usage = None;

        while let Some(chunk_result) = rx.recv().await {
            let chunk = chunk_result?;

            if let Some(content) = chunk.content {
                answer.push_str(&content);
                let _ = events.send(ChatEvent::Fragment { content }).await;
            }

            if chunk.done {
                usage = chunk.usage;
                break;
            }
        }

        transcript.push(Turn::assistant(&answer));
        let _ = events.send(ChatEvent::Done { usage }).await;

        info!(
            answer_len = answer.len(),
            turns = transcript.len(),
            "Turn complete"
        );

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use touchline_core::message::Role;

    fn engine(provider: Arc<ScriptedProvider>, retriever: Arc<dyn Retriever>) -> ChatEngine {
        ChatEngine::new(
            provider,
            retriever,
            PromptAssembler::default(),
            "mock-model",
            0.0,
        )
    }

    /// Drain helper — events channel that nobody renders.
    fn sink() -> (mpsc::Sender<ChatEvent>, mpsc::Receiver<ChatEvent>) {
        mpsc::channel(64)
    }

    #[tokio::test]
    async fn transcript_alternates_user_assistant() {
        let provider = Arc::new(ScriptedProvider::replies(&["answer one", "answer two"]));
        let retriever = Arc::new(StubRetriever::with_passages(&["P1"]));
        let engine = engine(provider, retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        engine.ask(&mut transcript, "first question", &tx).await.unwrap();
        engine.ask(&mut transcript, "second question", &tx).await.unwrap();

        assert_eq!(transcript.len(), 4);
        let roles: Vec<Role> = transcript.turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(transcript.turns[0].content, "first question");
        assert_eq!(transcript.turns[1].content, "answer one");
        assert_eq!(transcript.turns[2].content, "second question");
        assert_eq!(transcript.turns[3].content, "answer two");
    }

    #[tokio::test]
    async fn system_message_identical_across_calls() {
        let provider = Arc::new(ScriptedProvider::replies(&["a1", "a2"]));
        let retriever = Arc::new(StubRetriever::with_passages(&["P"]));
        let engine = engine(provider.clone(), retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        engine.ask(&mut transcript, "q1", &tx).await.unwrap();
        engine.ask(&mut transcript, "q2", &tx).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].messages[0].content, requests[1].messages[0].content);
    }

    #[tokio::test]
    async fn user_message_follows_template() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let retriever = Arc::new(StubRetriever::with_passages(&["A", "B"]));
        let engine = engine(provider.clone(), retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        engine.ask(&mut transcript, "Q", &tx).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].messages.len(), 2);
        let user = &requests[0].messages[1].content;
        let q = user.find('Q').unwrap();
        let a = user.find('A').unwrap();
        let b = user.find('B').unwrap();
        assert!(q < a && a < b, "expected Q before A before B, got: {user}");
    }

    #[tokio::test]
    async fn fragments_concatenate_without_separator() {
        let provider = Arc::new(ScriptedProvider::fragments(vec![vec!["He", "llo"]]));
        let retriever = Arc::new(StubRetriever::with_passages(&[]));
        let engine = engine(provider, retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let answer = engine.ask(&mut transcript, "q", &tx).await.unwrap();

        assert_eq!(answer, "Hello");
        assert_eq!(transcript.last().unwrap().content, "Hello");
    }

    #[tokio::test]
    async fn fragments_forwarded_in_arrival_order() {
        let provider = Arc::new(ScriptedProvider::fragments(vec![vec!["one ", "two ", "three"]]));
        let retriever = Arc::new(StubRetriever::with_passages(&[]));
        let engine = engine(provider, retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();

        let collector = tokio::spawn(async move {
            let mut fragments = Vec::new();
            while let Some(event) = rx.recv().await {
                if let ChatEvent::Fragment { content } = event {
                    fragments.push(content);
                }
            }
            fragments
        });

        engine.ask(&mut transcript, "q", &tx).await.unwrap();
        drop(tx);

        let fragments = collector.await.unwrap();
        assert_eq!(fragments, vec!["one ", "two ", "three"]);
    }

    #[tokio::test]
    async fn empty_retrieval_still_answers() {
        let provider = Arc::new(ScriptedProvider::replies(&["no data, but here goes"]));
        let retriever = Arc::new(StubRetriever::with_passages(&[]));
        let engine = engine(provider.clone(), retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let answer = engine.ask(&mut transcript, "anything?", &tx).await.unwrap();

        assert_eq!(answer, "no data, but here goes");
        // The user message still carries the full template.
        let user = &provider.requests()[0].messages[1].content;
        assert!(user.contains("Ground your answer in the context below:"));
    }

    #[tokio::test]
    async fn retrieval_failure_leaves_history_intact() {
        let provider = Arc::new(ScriptedProvider::replies(&["a1"]));
        let engine = ChatEngine::new(
            provider,
            Arc::new(FailingRetriever),
            PromptAssembler::default(),
            "mock-model",
            0.0,
        );
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("old question"));
        transcript.push(Turn::assistant("old answer"));
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let result = engine.ask(&mut transcript, "new question", &tx).await;

        assert!(result.is_err());
        // Prior entries untouched; the failed turn's user entry remains,
        // with no assistant reply.
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns[0].content, "old question");
        assert_eq!(transcript.turns[1].content, "old answer");
        assert_eq!(transcript.turns[2].content, "new question");
        assert_eq!(transcript.turns[2].role, Role::User);
    }

    #[tokio::test]
    async fn stream_interruption_aborts_turn() {
        let provider = Arc::new(ScriptedProvider::interrupted_after(vec!["partial "]));
        let retriever = Arc::new(StubRetriever::with_passages(&["P"]));
        let engine = engine(provider, retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let result = engine.ask(&mut transcript, "q", &tx).await;

        assert!(result.is_err());
        // User turn recorded, no assistant turn for the aborted stream.
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn done_event_carries_usage() {
        let provider = Arc::new(ScriptedProvider::replies(&["fin"]));
        let retriever = Arc::new(StubRetriever::with_passages(&[]));
        let engine = engine(provider, retriever);
        let mut transcript = Transcript::new();
        let (tx, mut rx) = sink();

        let collector = tokio::spawn(async move {
            let mut done_usage = None;
            while let Some(event) = rx.recv().await {
                if let ChatEvent::Done { usage } = event {
                    done_usage = usage;
                }
            }
            done_usage
        });

        engine.ask(&mut transcript, "q", &tx).await.unwrap();
        drop(tx);

        let usage = collector.await.unwrap().expect("usage in done event");
        assert_eq!(usage.total_tokens, 15);
    }
}
