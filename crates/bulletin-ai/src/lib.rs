//! Inference endpoint client for bulletin authoring.
//!
//! This crate speaks to a remote text-generation endpoint over its two-step
//! HTTP protocol: a call is opened with a POST carrying `{"data": [prompt,
//! context]}`, then its result is read from a server-sent-event feed. Both
//! exchange shapes are supported:
//!
//! - **one-shot** ([`ChatClient::predict`]): the whole answer arrives as a
//!   single batch payload;
//! - **streaming** ([`ChatClient::submit`]): the answer arrives as ordered
//!   incremental chunks, consumed as a cancellable sequence ([`ChatStream`]).
//!
//! Payloads are validated at the wire boundary into [`ChatEvent`] variants,
//! so downstream logic matches exhaustively instead of null-checking. The
//! editor layer depends only on the [`ChatClient`] trait; the concrete
//! [`GradioChatClient`] is injected at startup, and tests substitute
//! [`ScriptedChatClient`].

mod config;
mod gradio;
#[cfg(any(test, feature = "test-mock"))]
mod scripted;
mod stream;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use config::{CHAT_TIMEOUT_ENV, CHAT_URL_ENV, EndpointConfig};
pub use gradio::GradioChatClient;
#[cfg(any(test, feature = "test-mock"))]
pub use scripted::{ScriptStep, ScriptedChatClient};
pub use stream::{ChatEvent, ChatStream};

/// One exchange with the endpoint: the instruction plus the flattened text
/// of the document being worked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's instruction.
    pub prompt: String,
    /// Plain text of the current document, sent alongside the prompt.
    pub context: String,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: String::new(),
        }
    }

    /// Attach document context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// Final answer of a one-shot exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnswer {
    /// The generated text, as produced by the endpoint.
    pub text: String,
}

/// Error type for endpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// Endpoint not configured, or the configuration is unusable.
    #[error("endpoint not configured: {0}")]
    Configuration(String),

    /// Network-level failure reaching the endpoint.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a shape we do not understand.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The endpoint itself reported a failure.
    #[error("endpoint error: {0}")]
    Endpoint(String),
}

/// Result type for endpoint operations.
pub type Result<T> = std::result::Result<T, AiError>;

/// Trait for inference endpoint clients.
///
/// Implementations translate their native wire protocol into [`ChatEvent`]s
/// and [`ChatAnswer`]s. Everything above this trait is protocol-agnostic.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Short client name for log lines (e.g. "gradio").
    fn name(&self) -> &str;

    /// One-shot exchange: resolve the whole answer before returning.
    async fn predict(&self, request: ChatRequest) -> Result<ChatAnswer>;

    /// Streaming exchange: return once the call is accepted; chunks arrive
    /// on the stream. Dropping the stream abandons the exchange.
    async fn submit(&self, request: ChatRequest) -> Result<ChatStream>;
}

/// Shared handle to a client, as injected into the editor layer.
pub type SharedChatClient = Arc<dyn ChatClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new("résume la semaine").with_context("Lundi : gel.");
        assert_eq!(request.prompt, "résume la semaine");
        assert_eq!(request.context, "Lundi : gel.");
    }

    #[test]
    fn test_request_serializes_to_stable_shape() {
        let request = ChatRequest::new("p").with_context("c");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"prompt": "p", "context": "c"}));
    }

    #[test]
    fn test_errors_display_their_category() {
        assert!(
            AiError::Configuration("BULLETIN_CHAT_URL unset".into())
                .to_string()
                .starts_with("endpoint not configured")
        );
        assert!(
            AiError::MalformedResponse("no data".into())
                .to_string()
                .starts_with("malformed response")
        );
    }
}
