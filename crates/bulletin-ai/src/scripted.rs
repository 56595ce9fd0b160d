//! Scripted stand-in for [`ChatClient`], for test suites.
//!
//! Each staged script answers one request, step by step. `Wait` steps park
//! playback on a [`Notify`] gate so a test can interleave assertions with
//! a stream in flight.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

use crate::stream::{ChatEvent, ChatStream};
use crate::{AiError, ChatAnswer, ChatClient, ChatRequest, Result};

/// One step of a scripted exchange.
#[derive(Debug)]
pub enum ScriptStep {
    /// Deliver an event to the consumer.
    Event(ChatEvent),
    /// Fail the exchange with this error.
    Fail(AiError),
    /// Park until the gate is notified.
    Wait(Arc<Notify>),
}

impl ScriptStep {
    pub fn batch(text: impl Into<String>) -> Self {
        Self::Event(ChatEvent::Batch(text.into()))
    }

    pub fn chunk(text: impl Into<String>) -> Self {
        Self::Event(ChatEvent::Chunk(text.into()))
    }

    pub fn completed() -> Self {
        Self::Event(ChatEvent::Completed)
    }

    pub fn wait(gate: Arc<Notify>) -> Self {
        Self::Wait(gate)
    }
}

/// Plays staged scripts back in order and records every request it serves.
#[derive(Debug, Default)]
pub struct ScriptedChatClient {
    scripts: Mutex<VecDeque<Vec<ScriptStep>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// One script answering with a single batch payload.
    pub fn batch(text: impl Into<String>) -> Self {
        let client = Self::new();
        client.push_script(vec![ScriptStep::batch(text), ScriptStep::completed()]);
        client
    }

    /// One script streaming the given chunks in order.
    pub fn chunks<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        let mut steps: Vec<ScriptStep> = parts.into_iter().map(ScriptStep::chunk).collect();
        steps.push(ScriptStep::completed());
        client.push_script(steps);
        client
    }

    /// Stage a script; each serves exactly one request, oldest first.
    pub fn push_script(&self, steps: Vec<ScriptStep>) {
        self.scripts.lock().push_back(steps);
    }

    /// Every request served so far, in arrival order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    fn take_script(&self, request: &ChatRequest) -> Result<Vec<ScriptStep>> {
        self.requests.lock().push(request.clone());
        self.scripts.lock().pop_front().ok_or_else(|| {
            AiError::Configuration("no script staged for this request".to_string())
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn predict(&self, request: ChatRequest) -> Result<ChatAnswer> {
        let steps = self.take_script(&request)?;
        let mut text = String::new();
        for step in steps {
            match step {
                ScriptStep::Event(ChatEvent::Batch(part) | ChatEvent::Chunk(part)) => {
                    text.push_str(&part);
                }
                ScriptStep::Event(ChatEvent::Completed) => break,
                ScriptStep::Fail(err) => return Err(err),
                ScriptStep::Wait(gate) => gate.notified().await,
            }
        }
        Ok(ChatAnswer { text })
    }

    async fn submit(&self, request: ChatRequest) -> Result<ChatStream> {
        let steps = self.take_script(&request)?;
        let (tx, rx) = mpsc::channel(steps.len().max(1));
        tokio::spawn(async move {
            for step in steps {
                match step {
                    ScriptStep::Event(event) => {
                        let terminal = event.is_terminal();
                        if tx.send(Ok(event)).await.is_err() || terminal {
                            return;
                        }
                    }
                    ScriptStep::Fail(err) => {
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                    ScriptStep::Wait(gate) => gate.notified().await,
                }
            }
        });
        Ok(ChatStream::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_predict_concatenates_scripted_text() {
        let client = ScriptedChatClient::chunks(["Bonjour ", "à tous."]);
        let answer = client.predict(ChatRequest::new("salue")).await.unwrap();
        assert_eq!(answer.text, "Bonjour à tous.");
        assert_eq!(client.requests().len(), 1);
        assert_eq!(client.requests()[0].prompt, "salue");
    }

    #[tokio::test]
    async fn test_submit_plays_steps_in_order() {
        let client = ScriptedChatClient::chunks(["a", "b"]);
        let mut stream = client.submit(ChatRequest::new("p")).await.unwrap();
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Chunk("a".into())
        );
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Chunk("b".into())
        );
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Completed
        );
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_fail_step_surfaces_the_error() {
        let client = ScriptedChatClient::new();
        client.push_script(vec![
            ScriptStep::chunk("début"),
            ScriptStep::Fail(AiError::MalformedResponse("coupé".into())),
        ]);
        let mut stream = client.submit(ChatRequest::new("p")).await.unwrap();
        assert!(stream.next_event().await.unwrap().is_ok());
        assert!(matches!(
            stream.next_event().await.unwrap(),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_wait_step_parks_until_notified() {
        let gate = Arc::new(Notify::new());
        let client = ScriptedChatClient::new();
        client.push_script(vec![
            ScriptStep::chunk("avant"),
            ScriptStep::wait(gate.clone()),
            ScriptStep::chunk("après"),
            ScriptStep::completed(),
        ]);
        let mut stream = client.submit(ChatRequest::new("p")).await.unwrap();
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Chunk("avant".into())
        );
        gate.notify_one();
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Chunk("après".into())
        );
    }

    #[tokio::test]
    async fn test_exhausted_scripts_refuse_the_request() {
        let client = ScriptedChatClient::batch("unique");
        client.predict(ChatRequest::new("a")).await.unwrap();
        assert!(matches!(
            client.predict(ChatRequest::new("b")).await,
            Err(AiError::Configuration(_))
        ));
    }
}
