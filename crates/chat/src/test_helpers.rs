//! Deterministic stub collaborators for engine tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use touchline_core::error::{ProviderError, RetrievalError};
use touchline_core::message::Message;
use touchline_core::provider::{
    ProviderRequest, ProviderResponse, StreamChunk, Usage,
};
use touchline_core::retrieval::{Passage, Retriever};
use touchline_core::ChatProvider;

/// A provider that streams scripted fragments and records every request.
pub struct ScriptedProvider {
    /// One fragment list per expected call.
    scripts: Vec<Vec<String>>,
    /// Whether to cut the stream with an error after the fragments.
    interrupt: bool,
    calls: Mutex<usize>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl ScriptedProvider {
    /// One whole reply per call, streamed as a single fragment.
    pub fn replies(replies: &[&str]) -> Self {
        Self::fragments(replies.iter().map(|r| vec![*r]).collect())
    }

    /// Explicit fragment scripts, one `Vec` per call.
    pub fn fragments(scripts: Vec<Vec<&str>>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|s| s.into_iter().map(String::from).collect())
                .collect(),
            interrupt: false,
            calls: Mutex::new(0),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stream the given fragments, then fail with a stream interruption.
    pub fn interrupted_after(fragments: Vec<&str>) -> Self {
        let mut provider = Self::fragments(vec![fragments]);
        provider.interrupt = true;
        provider
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut calls = self.calls.lock().unwrap();
        let script = self
            .scripts
            .get(*calls)
            .cloned()
            .unwrap_or_default();
        *calls += 1;

        Ok(ProviderResponse {
            message: Message::assistant(script.concat()),
            usage: None,
            model: "scripted".into(),
        })
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let script = {
            let mut calls = self.calls.lock().unwrap();
            let script = self.scripts.get(*calls).cloned().unwrap_or_default();
            *calls += 1;
            script
        };
        let interrupt = self.interrupt;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            for fragment in script {
                let _ = tx
                    .send(Ok(StreamChunk {
                        content: Some(fragment),
                        done: false,
                        usage: None,
                    }))
                    .await;
            }

            if interrupt {
                let _ = tx
                    .send(Err(ProviderError::StreamInterrupted(
                        "connection reset".into(),
                    )))
                    .await;
                return;
            }

            let _ = tx
                .send(Ok(StreamChunk {
                    content: None,
                    done: true,
                    usage: Some(Usage {
                        prompt_tokens: 10,
                        completion_tokens: 5,
                        total_tokens: 15,
                    }),
                }))
                .await;
        });

        Ok(rx)
    }
}

/// A retriever that returns a fixed passage list.
pub struct StubRetriever {
    passages: Vec<Passage>,
}

impl StubRetriever {
    pub fn with_passages(texts: &[&str]) -> Self {
        Self {
            passages: texts.iter().map(|t| Passage::new(*t)).collect(),
        }
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    fn name(&self) -> &str {
        "stub"
    }

    async fn search(&self, _query: &str) -> Result<Vec<Passage>, RetrievalError> {
        Ok(self.passages.clone())
    }
}

/// A retriever that always fails.
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str) -> Result<Vec<Passage>, RetrievalError> {
        Err(RetrievalError::Network("index unreachable".into()))
    }
}
