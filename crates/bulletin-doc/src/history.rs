//! Bounded snapshot history with per-request coalescing.
//!
//! Every committed batch records the pre-batch document as one undo entry,
//! tagged with the batch's [`UpdateOrigin`]. Consecutive stream chunks from
//! the same assistant request share a single entry, so a whole streamed
//! response undoes in one step instead of one step per chunk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Undo entries kept before the oldest is dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Correlates every mutation a single assistant request produces.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    /// A new time-ordered id (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for log lines only.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who produced a mutation batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOrigin {
    /// A direct user edit.
    User,
    /// Wholesale load or replacement (opening a file, seeding content).
    Load,
    /// A one-shot assistant response applied in a single batch.
    Assistant(RequestId),
    /// One chunk of an incremental assistant response.
    AssistantStream(RequestId),
    /// Undo/redo replaying a recorded state. Never recorded itself.
    History,
}

impl UpdateOrigin {
    /// True when a batch should fold into the previous undo entry.
    pub fn coalesces_with(&self, previous: &UpdateOrigin) -> bool {
        match (self, previous) {
            (UpdateOrigin::AssistantStream(a), UpdateOrigin::AssistantStream(b)) => a == b,
            _ => false,
        }
    }
}

// ── History stacks ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct Entry {
    snapshot: Document,
    origin: UpdateOrigin,
}

/// Undo/redo stacks of whole-document snapshots.
#[derive(Debug)]
pub(crate) struct History {
    undo: Vec<Entry>,
    redo: Vec<Entry>,
    limit: usize,
}

impl History {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the pre-batch state of a committed batch. Coalesced batches
    /// keep the oldest snapshot, so undo rewinds past the whole run.
    pub(crate) fn record(&mut self, before: Document, origin: UpdateOrigin) {
        self.redo.clear();
        if let Some(last) = self.undo.last() {
            if origin.coalesces_with(&last.origin) {
                return;
            }
        }
        self.undo.push(Entry {
            snapshot: before,
            origin,
        });
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
    }

    /// Swap the current document for the most recent recorded state.
    pub(crate) fn undo(&mut self, current: Document) -> Option<Document> {
        let entry = self.undo.pop()?;
        self.redo.push(Entry {
            snapshot: current,
            origin: entry.origin,
        });
        Some(entry.snapshot)
    }

    pub(crate) fn redo(&mut self, current: Document) -> Option<Document> {
        let entry = self.redo.pop()?;
        self.undo.push(Entry {
            snapshot: current,
            origin: entry.origin,
        });
        Some(entry.snapshot)
    }

    pub(crate) fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub(crate) fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Block;

    fn doc(text: &str) -> Document {
        Document::from_blocks(vec![Block::paragraph(text)])
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new(10);
        history.record(doc("v1"), UpdateOrigin::User);
        let restored = history.undo(doc("v2")).unwrap();
        assert_eq!(restored, doc("v1"));
        let replayed = history.redo(restored).unwrap();
        assert_eq!(replayed, doc("v2"));
    }

    #[test]
    fn test_stream_chunks_share_one_entry() {
        let request = RequestId::new();
        let mut history = History::new(10);
        history.record(doc("base"), UpdateOrigin::AssistantStream(request));
        history.record(doc("base + c1"), UpdateOrigin::AssistantStream(request));
        history.record(doc("base + c1c2"), UpdateOrigin::AssistantStream(request));
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.undo(doc("base + c1c2c3")).unwrap(), doc("base"));
    }

    #[test]
    fn test_distinct_requests_do_not_coalesce() {
        let mut history = History::new(10);
        history.record(doc("a"), UpdateOrigin::AssistantStream(RequestId::new()));
        history.record(doc("b"), UpdateOrigin::AssistantStream(RequestId::new()));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_user_edit_breaks_a_stream_run() {
        let request = RequestId::new();
        let mut history = History::new(10);
        history.record(doc("a"), UpdateOrigin::AssistantStream(request));
        history.record(doc("b"), UpdateOrigin::User);
        history.record(doc("c"), UpdateOrigin::AssistantStream(request));
        assert_eq!(history.undo_depth(), 3);
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut history = History::new(10);
        history.record(doc("v1"), UpdateOrigin::User);
        let _ = history.undo(doc("v2")).unwrap();
        assert_eq!(history.redo_depth(), 1);
        history.record(doc("v1"), UpdateOrigin::User);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_limit_drops_oldest_entry() {
        let mut history = History::new(2);
        history.record(doc("1"), UpdateOrigin::User);
        history.record(doc("2"), UpdateOrigin::User);
        history.record(doc("3"), UpdateOrigin::User);
        assert_eq!(history.undo_depth(), 2);
        let restored = history.undo(doc("4")).unwrap();
        assert_eq!(restored, doc("3"));
    }
}
