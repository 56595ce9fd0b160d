//! Shared document store: one write lock, batched updates, change events.
//!
//! All mutation funnels through [`DocumentStore::update`]. The closure runs
//! against a [`Transaction`]; the batch commits only if it returns `Ok`, and
//! on error the pre-batch snapshot is restored so partial edits never leak.
//! Committed batches feed the undo history and a broadcast channel that UI
//! and log consumers subscribe to. The internal lock is never held across an
//! await point; async callers clone what they need and re-enter per batch.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::document::Document;
use crate::error::Result;
use crate::history::{History, UpdateOrigin, DEFAULT_HISTORY_LIMIT};
use crate::markdown;
use crate::transaction::Transaction;

/// Capacity of the change-event channel. Slow subscribers observe a lag
/// error and resynchronize from a snapshot rather than blocking writers.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast after every committed batch.
#[derive(Clone, Debug)]
pub struct DocEvent {
    pub revision: u64,
    pub origin: UpdateOrigin,
}

/// Shared handle to a [`DocumentStore`].
pub type SharedDocument = Arc<DocumentStore>;

/// Create an empty shared document.
pub fn shared_document() -> SharedDocument {
    Arc::new(DocumentStore::new())
}

/// Create a shared document seeded with `doc`.
pub fn shared_document_with(doc: Document) -> SharedDocument {
    Arc::new(DocumentStore::with_document(doc))
}

struct State {
    doc: Document,
    history: History,
    revision: u64,
}

/// The live document plus its history, guarded by one lock.
pub struct DocumentStore {
    state: RwLock<State>,
    events: broadcast::Sender<DocEvent>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(doc: Document) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(State {
                doc,
                history: History::new(DEFAULT_HISTORY_LIMIT),
                revision: 0,
            }),
            events,
        }
    }

    /// Run a mutation batch. Commits, records history, and broadcasts one
    /// event if the closure succeeded and actually changed something; rolls
    /// the document back wholesale if it returned an error.
    pub fn update<T>(
        &self,
        origin: UpdateOrigin,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write();
        let State {
            doc,
            history,
            revision,
        } = &mut *state;
        let before = doc.clone();
        let mut tx = Transaction::new(doc);
        match f(&mut tx) {
            Ok(value) => {
                let dirty = tx.is_dirty();
                if dirty {
                    history.record(before, origin);
                    *revision += 1;
                }
                let event = dirty.then(|| DocEvent {
                    revision: *revision,
                    origin,
                });
                drop(state);
                if let Some(event) = event {
                    trace!(revision = event.revision, ?origin, "batch committed");
                    let _ = self.events.send(event);
                }
                Ok(value)
            }
            Err(err) => {
                *doc = before;
                drop(state);
                debug!(error = %err, ?origin, "batch rolled back");
                Err(err)
            }
        }
    }

    /// Read the current document without copying it.
    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self.state.read().doc)
    }

    /// A point-in-time copy of the document.
    pub fn snapshot(&self) -> Document {
        self.state.read().doc.clone()
    }

    /// Flattened text of the current document, for prompt context.
    pub fn plain_text(&self) -> String {
        self.read(|doc| doc.plain_text())
    }

    /// Current document serialized to markdown.
    pub fn to_markdown(&self) -> String {
        self.read(markdown::write)
    }

    /// Replace the whole document with parsed markdown.
    pub fn load_markdown(&self, src: &str) -> Result<()> {
        self.update(UpdateOrigin::Load, |tx| {
            tx.replace_with(markdown::parse(src));
            Ok(())
        })
    }

    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocEvent> {
        self.events.subscribe()
    }

    /// Rewind to the previous recorded state. Returns false when the undo
    /// stack is empty.
    pub fn undo(&self) -> bool {
        self.time_travel(|state| {
            let current = state.doc.clone();
            state.history.undo(current)
        })
    }

    /// Replay a state rewound by [`undo`](Self::undo).
    pub fn redo(&self) -> bool {
        self.time_travel(|state| {
            let current = state.doc.clone();
            state.history.redo(current)
        })
    }

    pub fn undo_depth(&self) -> usize {
        self.state.read().history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.state.read().history.redo_depth()
    }

    fn time_travel(&self, swap: impl FnOnce(&mut State) -> Option<Document>) -> bool {
        let event = {
            let mut state = self.state.write();
            match swap(&mut state) {
                Some(restored) => {
                    state.doc = restored;
                    state.revision += 1;
                    Some(DocEvent {
                        revision: state.revision,
                        origin: UpdateOrigin::History,
                    })
                }
                None => None,
            }
        };
        match event {
            Some(event) => {
                let _ = self.events.send(event);
                true
            }
            None => false,
        }
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocError;
    use crate::history::RequestId;
    use crate::node::Block;

    #[test]
    fn test_update_commits_and_bumps_revision() {
        let store = DocumentStore::new();
        store
            .update(UpdateOrigin::User, |tx| {
                tx.append_block(Block::paragraph("premier"));
                Ok(())
            })
            .unwrap();
        assert_eq!(store.revision(), 1);
        assert_eq!(store.plain_text(), "premier");
    }

    #[test]
    fn test_failed_batch_rolls_back_wholesale() {
        let store = DocumentStore::new();
        store.load_markdown("intact").unwrap();
        let revision = store.revision();

        let result: Result<()> = store.update(UpdateOrigin::User, |tx| {
            tx.append_block(Block::paragraph("fantôme"));
            Err(DocError::NoSelection)
        });
        assert!(result.is_err());
        assert_eq!(store.plain_text(), "intact");
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_committed_batch_broadcasts_one_event() {
        let store = DocumentStore::new();
        let mut events = store.subscribe();
        store
            .update(UpdateOrigin::User, |tx| {
                tx.append_block(Block::paragraph("x"));
                Ok(())
            })
            .unwrap();
        let event = events.try_recv().unwrap();
        assert_eq!(event.revision, 1);
        assert_eq!(event.origin, UpdateOrigin::User);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_read_only_batch_is_silent() {
        let store = DocumentStore::new();
        let mut events = store.subscribe();
        let count = store
            .update(UpdateOrigin::User, |tx| Ok(tx.document().block_count()))
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(store.revision(), 0);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_failed_batch_emits_no_event() {
        let store = DocumentStore::new();
        let mut events = store.subscribe();
        let _ = store.update(UpdateOrigin::User, |tx| {
            tx.append_block(Block::paragraph("x"));
            Err::<(), _>(DocError::NoSelection)
        });
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let store = DocumentStore::new();
        store.load_markdown("un").unwrap();
        store
            .update(UpdateOrigin::User, |tx| {
                tx.select_end();
                tx.insert_text(" deux")
            })
            .unwrap();
        assert_eq!(store.plain_text(), "un deux");

        assert!(store.undo());
        assert_eq!(store.plain_text(), "un");
        assert!(store.redo());
        assert_eq!(store.plain_text(), "un deux");
        assert!(!store.redo());
    }

    #[test]
    fn test_stream_chunks_undo_in_one_step() {
        let store = DocumentStore::new();
        store.load_markdown("Base.").unwrap();
        let request = RequestId::new();
        for chunk in ["Le climat ", "est ", "variable."] {
            store
                .update(UpdateOrigin::AssistantStream(request), |tx| {
                    tx.select_end();
                    tx.insert_text(chunk)
                })
                .unwrap();
        }
        assert_eq!(store.plain_text(), "Base.Le climat est variable.");
        assert_eq!(store.undo_depth(), 2);

        assert!(store.undo());
        assert_eq!(store.plain_text(), "Base.");
    }

    #[test]
    fn test_history_origin_tags_time_travel_events() {
        let store = DocumentStore::new();
        store.load_markdown("x").unwrap();
        let mut events = store.subscribe();
        store.undo();
        let event = events.try_recv().unwrap();
        assert_eq!(event.origin, UpdateOrigin::History);
    }

    #[test]
    fn test_load_markdown_replaces_content() {
        let store = DocumentStore::new();
        store.load_markdown("# Titre\n\ncorps").unwrap();
        store.load_markdown("remplacé").unwrap();
        assert_eq!(store.plain_text(), "remplacé");
        assert!(store.undo());
        assert_eq!(store.plain_text(), "Titre\n\ncorps");
        assert_eq!(store.to_markdown(), "# Titre\n\ncorps\n");
    }
}
