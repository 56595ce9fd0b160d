//! Prompt controller: owns the draft prompt and the in-flight submission.
//!
//! One controller drives one document. `submit` is fire-and-forget: it
//! captures the prompt and the document's plain text synchronously, resets
//! the draft, and spawns a drive task that talks to the endpoint and feeds
//! the response applier. The busy flag is the sole re-entrancy guard; while
//! it is set, further submissions are refused.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bulletin_ai::{ChatEvent, ChatRequest, ChatStream, SharedChatClient};
use bulletin_doc::{RequestId, SharedDocument};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::apply::{self, ApplyMode};
use crate::error::{EditorError, Result};
use crate::notice::{NOTICE_CHANNEL_CAPACITY, Notice};

/// Tuning for one controller instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControllerOptions {
    pub mode: ApplyMode,
    /// Upper bound on the wait for the next stream event. `None` waits
    /// as long as the transport does.
    pub chunk_timeout: Option<Duration>,
}

impl ControllerOptions {
    pub fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.chunk_timeout = Some(timeout);
        self
    }
}

/// Observable controller state, published through a watch channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptState {
    pub prompt_text: String,
    pub busy: bool,
}

/// What a `submit` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A drive task was spawned for this request.
    Started(RequestId),
    /// The trimmed prompt was empty; nothing was sent or mutated.
    EmptyPrompt,
    /// A submission is already in flight (or the controller is shut down).
    Busy,
}

struct Shared {
    document: SharedDocument,
    client: SharedChatClient,
    options: ControllerOptions,
    state: watch::Sender<PromptState>,
    notices: broadcast::Sender<Notice>,
    busy: AtomicBool,
}

pub struct PromptController {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl PromptController {
    pub fn new(document: SharedDocument, client: SharedChatClient) -> Self {
        Self::with_options(document, client, ControllerOptions::default())
    }

    pub fn with_options(
        document: SharedDocument,
        client: SharedChatClient,
        options: ControllerOptions,
    ) -> Self {
        let (state, _) = watch::channel(PromptState::default());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                document,
                client,
                options,
                state,
                notices,
                busy: AtomicBool::new(false),
            }),
            cancel: CancellationToken::new(),
            inflight: Mutex::new(None),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.shared.document
    }

    /// Replace the draft prompt text.
    pub fn set_prompt(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.state.send_modify(|state| state.prompt_text = text);
    }

    pub fn state(&self) -> PromptState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PromptState> {
        self.shared.state.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.shared.notices.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::SeqCst)
    }

    /// Submit the current draft. Returns immediately; the exchange runs on
    /// a spawned task and reports through notices and the state channel.
    pub fn submit(&self) -> SubmitOutcome {
        if self.cancel.is_cancelled() {
            return SubmitOutcome::Busy;
        }
        let prompt = self.shared.state.borrow().prompt_text.trim().to_string();
        if prompt.is_empty() {
            return SubmitOutcome::EmptyPrompt;
        }
        if self
            .shared
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SubmitOutcome::Busy;
        }

        let request = RequestId::new();
        // Context is captured and the draft cleared before any network
        // call, so the prompt box is free while the response is pending.
        let context = self.shared.document.plain_text();
        self.shared.state.send_modify(|state| {
            state.prompt_text.clear();
            state.busy = true;
        });
        info!(request = %request.short(), client = self.shared.client.name(), "submitting prompt");

        let drive = Drive {
            shared: self.shared.clone(),
            cancel: self.cancel.clone(),
        };
        let chat = ChatRequest::new(prompt).with_context(context);
        let handle = tokio::spawn(drive.run(request, chat));
        *self.inflight.lock() = Some(handle);
        SubmitOutcome::Started(request)
    }

    /// Wait for the in-flight submission, if any, to finish.
    pub async fn wait_idle(&self) {
        let handle = self.inflight.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Stop the in-flight submission and refuse further ones. No document
    /// mutation happens after this returns.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.wait_idle().await;
    }
}

impl Drop for PromptController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// One submission, end to end, on its own task.
struct Drive {
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl Drive {
    async fn run(self, request: RequestId, chat: ChatRequest) {
        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            result = self.run_exchange(request, chat) => result,
            _ = cancel.cancelled() => Err(EditorError::Cancelled),
        };
        match outcome {
            Ok(()) => {
                debug!(request = %request.short(), "submission complete");
                let _ = self.shared.notices.send(Notice::info(request, "response applied"));
            }
            Err(EditorError::Cancelled) => {
                debug!(request = %request.short(), "submission cancelled");
            }
            Err(err) => {
                warn!(request = %request.short(), error = %err, "submission failed");
                let _ = self.shared.notices.send(Notice::error(request, err.to_string()));
            }
        }
        self.shared.busy.store(false, Ordering::SeqCst);
        self.shared.state.send_modify(|state| state.busy = false);
    }

    async fn run_exchange(&self, request: RequestId, chat: ChatRequest) -> Result<()> {
        match self.shared.options.mode {
            ApplyMode::Replace => {
                let answer = self.shared.client.predict(chat).await?;
                apply::apply_batch(&self.shared.document, request, &answer.text)
            }
            ApplyMode::Append => {
                let mut stream = self.shared.client.submit(chat).await?;
                apply::begin_stream(&self.shared.document, request)?;
                while let Some(event) = self.next_unit(&mut stream).await? {
                    match event {
                        // A one-shot answer on the streaming path applies
                        // like a single large chunk.
                        ChatEvent::Batch(text) | ChatEvent::Chunk(text) => {
                            apply::apply_chunk(&self.shared.document, request, &text)?;
                        }
                        ChatEvent::Completed => break,
                    }
                }
                Ok(())
            }
        }
    }

    /// Next stream event, bounded by the configured chunk timeout.
    async fn next_unit(&self, stream: &mut ChatStream) -> Result<Option<ChatEvent>> {
        let next = stream.next_event();
        let item = match self.shared.options.chunk_timeout {
            Some(limit) => tokio::time::timeout(limit, next).await.map_err(|_| {
                EditorError::Transport(format!(
                    "no stream event within {}s",
                    limit.as_secs()
                ))
            })?,
            None => next.await,
        };
        match item {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }
}
