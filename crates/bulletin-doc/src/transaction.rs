//! Mutation batches over one document.

use crate::document::Document;
use crate::error::{DocError, Result};
use crate::node::Block;
use crate::selection::Selection;

/// A single mutation batch.
///
/// Handed to the closure passed to [`DocumentStore::update`]; every edit made
/// through it commits or rolls back together. The selection lives only for
/// the duration of the batch and is always derived from the live tree, never
/// cached across batches.
///
/// [`DocumentStore::update`]: crate::store::DocumentStore::update
pub struct Transaction<'a> {
    doc: &'a mut Document,
    selection: Option<Selection>,
    dirty: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(doc: &'a mut Document) -> Self {
        Self {
            doc,
            selection: None,
            dirty: false,
        }
    }

    /// Read access to the in-progress state of the batch.
    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Move the caret just past the last char of the document. The position
    /// is recomputed from the tree as it stands at this call.
    pub fn select_end(&mut self) -> Selection {
        let selection = Selection::Caret(self.doc.end_position());
        self.selection = Some(selection);
        selection
    }

    /// Place an explicit selection.
    pub fn select(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    /// Append a block at the end of the document.
    pub fn append_block(&mut self, block: Block) {
        self.doc.push_block(block);
        self.dirty = true;
    }

    /// Append an empty paragraph and leave the caret inside it.
    pub fn append_empty_paragraph(&mut self) -> Selection {
        self.doc.push_block(Block::empty_paragraph());
        self.dirty = true;
        self.select_end()
    }

    /// Insert text at the current caret and advance it past the insertion.
    /// Fails with [`DocError::NoSelection`] if no selection was established
    /// in this batch.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        let selection = self.selection.ok_or(DocError::NoSelection)?;
        let caret = self.doc.insert_text_at(selection.focus(), text)?;
        self.selection = Some(Selection::Caret(caret));
        if !text.is_empty() {
            self.dirty = true;
        }
        Ok(())
    }

    /// Replace the whole document. Clears the batch selection.
    pub fn replace_with(&mut self, replacement: Document) {
        *self.doc = replacement;
        self.selection = None;
        self.dirty = true;
    }
}
