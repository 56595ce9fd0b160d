//! Client for Gradio-style inference endpoints.
//!
//! The wire protocol is the two-step call API: `POST {base}/call/{route}`
//! with `{"data": [prompt, context]}` answers `{"event_id"}`, then
//! `GET {base}/call/{route}/{event_id}` replays the call's progress as
//! server-sent events. Event names on the feed:
//!
//! - `generating` carries one incremental chunk in `data[0]`;
//! - `complete` ends the exchange, with the final text in `data[0]` when
//!   the route produces one;
//! - `error` reports a server-side failure and ends the exchange;
//! - `heartbeat` keeps the feed alive and is ignored.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::EndpointConfig;
use crate::stream::{ChatEvent, ChatStream};
use crate::{AiError, ChatAnswer, ChatClient, ChatRequest, Result};

/// Buffered events per exchange before the producer awaits the consumer.
const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Serialize)]
struct CallPayload<'a> {
    data: [&'a str; 2],
}

#[derive(Deserialize)]
struct CallTicket {
    event_id: String,
}

/// HTTP client for one configured endpoint.
pub struct GradioChatClient {
    config: EndpointConfig,
    http: reqwest::Client,
}

impl GradioChatClient {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| AiError::Configuration(err.to_string()))?;
        Ok(Self { config, http })
    }

    /// Build a client from `BULLETIN_CHAT_URL` and friends.
    pub fn from_env() -> Result<Self> {
        Self::new(EndpointConfig::from_env()?)
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Open a call; the returned id addresses its event feed.
    async fn open_call(&self, request: &ChatRequest) -> Result<String> {
        let url = self.config.call_url();
        let payload = CallPayload {
            data: [&request.prompt, &request.context],
        };
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| AiError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Endpoint(format!("{url} answered {status}")));
        }
        let ticket: CallTicket = response
            .json()
            .await
            .map_err(|err| AiError::MalformedResponse(format!("call ticket: {err}")))?;
        trace!(event_id = %ticket.event_id, "call accepted");
        Ok(ticket.event_id)
    }

    async fn open_events(&self, event_id: &str) -> Result<reqwest::Response> {
        let url = self.config.events_url(event_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AiError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Endpoint(format!("{url} answered {status}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatClient for GradioChatClient {
    fn name(&self) -> &str {
        "gradio"
    }

    async fn predict(&self, request: ChatRequest) -> Result<ChatAnswer> {
        let event_id = self.open_call(&request).await?;
        let response = self.open_events(&event_id).await?;
        let mut events = response.bytes_stream().eventsource();

        // Routes that stream internally still end with `complete`; assemble
        // chunks as a fallback for a payload-less final event.
        let mut assembled = String::new();
        while let Some(item) = events.next().await {
            let sse = item.map_err(|err| AiError::Transport(err.to_string()))?;
            match wire_event(&sse.event, &sse.data)? {
                Some(WireUnit::Chunk(chunk)) => assembled.push_str(&chunk),
                Some(WireUnit::Complete(Some(text))) => return Ok(ChatAnswer { text }),
                Some(WireUnit::Complete(None)) => {
                    if assembled.is_empty() {
                        return Err(AiError::MalformedResponse(
                            "complete event carried no text and no chunks preceded it".into(),
                        ));
                    }
                    return Ok(ChatAnswer { text: assembled });
                }
                None => {}
            }
        }
        Err(AiError::MalformedResponse(
            "event feed closed before complete".into(),
        ))
    }

    async fn submit(&self, request: ChatRequest) -> Result<ChatStream> {
        let event_id = self.open_call(&request).await?;
        let response = self.open_events(&event_id).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump(response, tx));
        Ok(ChatStream::new(rx))
    }
}

/// Drive one event feed into the consumer channel. Ends after a terminal
/// event, a wire error, or when the consumer drops its stream.
async fn pump(response: reqwest::Response, tx: mpsc::Sender<Result<ChatEvent>>) {
    let mut events = response.bytes_stream().eventsource();
    let mut saw_chunk = false;
    while let Some(item) = events.next().await {
        let sse = match item {
            Ok(sse) => sse,
            Err(err) => {
                let _ = tx.send(Err(AiError::Transport(err.to_string()))).await;
                return;
            }
        };
        match wire_event(&sse.event, &sse.data) {
            Ok(Some(WireUnit::Chunk(chunk))) => {
                saw_chunk = true;
                if tx.send(Ok(ChatEvent::Chunk(chunk))).await.is_err() {
                    debug!("consumer dropped the stream, abandoning exchange");
                    return;
                }
            }
            Ok(Some(WireUnit::Complete(full_text))) => {
                // A one-shot route answers with a single final payload; a
                // streaming route already delivered it chunk by chunk.
                if let (false, Some(text)) = (saw_chunk, full_text) {
                    if tx.send(Ok(ChatEvent::Batch(text))).await.is_err() {
                        return;
                    }
                }
                let _ = tx.send(Ok(ChatEvent::Completed)).await;
                return;
            }
            Ok(None) => {}
            Err(err) => {
                let _ = tx.send(Err(err)).await;
                return;
            }
        }
    }
    let _ = tx
        .send(Err(AiError::MalformedResponse(
            "event feed closed before complete".into(),
        )))
        .await;
}

// ── Wire decoding ───────────────────────────────────────────────────────────

/// One decoded unit of the event feed.
#[derive(Debug, PartialEq, Eq)]
enum WireUnit {
    Chunk(String),
    Complete(Option<String>),
}

/// Decode one named event. `Ok(None)` means "nothing to forward".
fn wire_event(name: &str, data: &str) -> Result<Option<WireUnit>> {
    match name {
        "generating" => Ok(Some(WireUnit::Chunk(first_string(data)?))),
        "complete" => {
            let trimmed = data.trim();
            if trimmed.is_empty() || trimmed == "null" {
                Ok(Some(WireUnit::Complete(None)))
            } else {
                Ok(Some(WireUnit::Complete(Some(first_string(data)?))))
            }
        }
        "error" => Err(AiError::Endpoint(error_text(data))),
        "heartbeat" => Ok(None),
        other => {
            trace!(event = other, "ignoring unrecognized event");
            Ok(None)
        }
    }
}

/// Extract `data[0]` as a string from an event payload.
fn first_string(data: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|err| AiError::MalformedResponse(format!("payload is not JSON: {err}")))?;
    match value {
        serde_json::Value::Array(items) => match items.into_iter().next() {
            Some(serde_json::Value::String(text)) => Ok(text),
            Some(other) => Err(AiError::MalformedResponse(format!(
                "expected a string in data[0], got {other}"
            ))),
            None => Err(AiError::MalformedResponse("data array is empty".into())),
        },
        other => Err(AiError::MalformedResponse(format!(
            "expected a data array, got {other}"
        ))),
    }
}

fn error_text(data: &str) -> String {
    let trimmed = data.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return "endpoint reported an error".to_string();
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(message)) => message,
        Ok(other) => other.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
