//! Typed rich-text document model for bulletin authoring.
//!
//! A document is a tree of blocks (paragraphs, headings, lists, quotes, code,
//! tables, rules) over styled inline runs. Markdown is the interchange format
//! both for files on disk and for assistant responses.
//!
//! # Design Philosophy
//!
//! - All mutation happens in batches: `DocumentStore::update` hands a
//!   `Transaction` to a closure, and the batch commits or rolls back as one.
//!   Partial edits are never observable.
//! - Selections are ephemeral. A caret is recomputed from the live tree
//!   inside the batch that uses it; nothing ever caches a position across
//!   batches, so concurrent edits cannot strand an insertion point.
//! - Every committed batch carries an `UpdateOrigin`. Origins drive change
//!   events, log lines, and undo granularity: consecutive stream chunks from
//!   one assistant request coalesce into a single undo entry.
//! - `markdown::parse` and `markdown::write` are inverses over parsed trees,
//!   which is what makes the serialize, append, re-parse response cycle
//!   lossless.

mod document;
mod error;
mod history;
pub mod markdown;
mod node;
mod selection;
mod store;
mod transaction;

pub use document::Document;
pub use error::{DocError, Result};
pub use history::{DEFAULT_HISTORY_LIMIT, RequestId, UpdateOrigin};
pub use node::{
    Block, BlockKind, ColumnAlign, HeadingLevel, Inline, ListItem, TableCell, TableRow, TextRun,
    TextStyle,
};
pub use selection::{Position, Selection};
pub use store::{
    DocEvent, DocumentStore, SharedDocument, shared_document, shared_document_with,
};
pub use transaction::Transaction;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_response_cycle_survives_round_trip() {
        let store = shared_document();
        store.load_markdown("# Semaine 12\n\nLes relevés sont stables.").unwrap();

        // One-shot application: serialize, append below, re-parse, replace.
        let merged = format!("{}\n\n{}", store.to_markdown(), "**Synthèse** : rien à signaler.");
        store
            .update(UpdateOrigin::Assistant(RequestId::new()), |tx| {
                tx.replace_with(markdown::parse(&merged));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            store.plain_text(),
            "Semaine 12\n\nLes relevés sont stables.\n\nSynthèse : rien à signaler."
        );
        let reparsed = markdown::parse(&store.to_markdown());
        assert_eq!(reparsed, store.snapshot());
    }

    #[test]
    fn test_streamed_chunks_reacquire_the_end() {
        let store = shared_document();
        store.load_markdown("Contexte.").unwrap();
        let request = RequestId::new();

        store
            .update(UpdateOrigin::AssistantStream(request), |tx| {
                tx.append_empty_paragraph();
                Ok(())
            })
            .unwrap();
        for chunk in ["La vigne ", "débourre."] {
            store
                .update(UpdateOrigin::AssistantStream(request), |tx| {
                    tx.select_end();
                    tx.insert_text(chunk)
                })
                .unwrap();
        }

        assert_eq!(store.plain_text(), "Contexte.\n\nLa vigne débourre.");
        assert!(store.undo());
        assert_eq!(store.plain_text(), "Contexte.");
    }
}
