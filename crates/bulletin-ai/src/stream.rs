//! Response events and the cancellable stream they arrive on.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::Result;

/// One validated unit of an endpoint response.
///
/// The wire boundary maps raw payloads into these variants; everything past
/// it matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// The whole answer of a one-shot exchange.
    Batch(String),
    /// One incremental piece of a streamed answer, in arrival order.
    Chunk(String),
    /// The exchange finished cleanly. Nothing follows.
    Completed,
}

impl ChatEvent {
    /// Check if this event carries text.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Batch(_) | Self::Chunk(_))
    }

    /// Check if this event ends the exchange.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Extract the carried text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Batch(text) | Self::Chunk(text) => Some(text),
            Self::Completed => None,
        }
    }
}

/// Ordered sequence of response events for one streaming exchange.
///
/// Finite and not restartable: it yields zero or more `Chunk`s, then either
/// `Completed` or an error, then `None`. Dropping the stream cancels the
/// exchange; the producer notices the closed channel and abandons the
/// network call.
pub struct ChatStream {
    rx: mpsc::Receiver<Result<ChatEvent>>,
}

impl ChatStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<ChatEvent>>) -> Self {
        Self { rx }
    }

    /// Wait for the next event. Returns `None` once the exchange is over
    /// and the channel has drained.
    pub async fn next_event(&mut self) -> Option<Result<ChatEvent>> {
        self.rx.recv().await
    }
}

impl Stream for ChatStream {
    type Item = Result<ChatEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AiError;

    #[test]
    fn test_event_helpers() {
        assert!(ChatEvent::Batch("tout".into()).is_text());
        assert!(ChatEvent::Chunk("morceau".into()).is_text());
        assert!(!ChatEvent::Completed.is_text());
        assert!(ChatEvent::Completed.is_terminal());
        assert_eq!(ChatEvent::Chunk("m".into()).as_text(), Some("m"));
        assert_eq!(ChatEvent::Completed.as_text(), None);
    }

    #[tokio::test]
    async fn test_stream_yields_in_order_then_drains() {
        let (tx, rx) = mpsc::channel(8);
        let mut stream = ChatStream::new(rx);
        tx.send(Ok(ChatEvent::Chunk("a".into()))).await.unwrap();
        tx.send(Ok(ChatEvent::Completed)).await.unwrap();
        drop(tx);

        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Chunk("a".into())
        );
        assert_eq!(
            stream.next_event().await.unwrap().unwrap(),
            ChatEvent::Completed
        );
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_stream_closes_the_channel() {
        let (tx, rx) = mpsc::channel(1);
        let stream = ChatStream::new(rx);
        drop(stream);
        assert!(tx.send(Ok(ChatEvent::Completed)).await.is_err());
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let (tx, rx) = mpsc::channel(1);
        let mut stream = ChatStream::new(rx);
        tx.send(Err(AiError::Transport("connexion interrompue".into())))
            .await
            .unwrap();
        let err = stream.next_event().await.unwrap().unwrap_err();
        assert!(matches!(err, AiError::Transport(_)));
    }
}
