//! Policies that land an inference result in the document.
//!
//! Every function here wraps exactly one mutation batch, so each received
//! unit costs one history entry, one change event, and one lock scope.
//! Streamed batches share an [`UpdateOrigin::AssistantStream`] origin and
//! coalesce into a single undo step.

use bulletin_doc::{RequestId, SharedDocument, UpdateOrigin, markdown};
use strum::{Display, EnumString};

use crate::error::Result;

/// How a response lands in the document.
///
/// `Append` is the production default: it never rewrites existing content.
/// `Replace` round-trips the whole document through markdown, which drops
/// nothing from the supported node set but rebuilds every block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ApplyMode {
    #[default]
    Append,
    Replace,
}

/// One-shot application: serialize the current document, append a blank
/// line and the answer, re-parse, and swap the result in. Runs inside a
/// single batch so readers never observe the intermediate text.
pub fn apply_batch(document: &SharedDocument, request: RequestId, text: &str) -> Result<()> {
    document.update(UpdateOrigin::Assistant(request), |tx| {
        let mut merged = markdown::write(tx.document()).trim_end().to_string();
        if !merged.is_empty() {
            merged.push_str("\n\n");
        }
        merged.push_str(text);
        tx.replace_with(markdown::parse(&merged));
        Ok(())
    })?;
    Ok(())
}

/// Stream start: open a fresh paragraph at the end of the document. The
/// response will accumulate there unless the author keeps typing below it.
pub fn begin_stream(document: &SharedDocument, request: RequestId) -> Result<()> {
    document.update(UpdateOrigin::AssistantStream(request), |tx| {
        tx.append_empty_paragraph();
        Ok(())
    })?;
    Ok(())
}

/// One received chunk: re-acquire the end of the document and insert there.
/// The position is derived inside the batch, never remembered across the
/// await that produced the chunk, so interleaved edits cannot misplace it.
pub fn apply_chunk(document: &SharedDocument, request: RequestId, chunk: &str) -> Result<()> {
    document.update(UpdateOrigin::AssistantStream(request), |tx| {
        tx.select_end();
        tx.insert_text(chunk)?;
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use bulletin_doc::shared_document;

    use super::*;

    #[test]
    fn test_apply_mode_round_trips_through_strings() {
        assert_eq!(ApplyMode::Append.to_string(), "append");
        assert_eq!("replace".parse::<ApplyMode>().unwrap(), ApplyMode::Replace);
        assert_eq!(ApplyMode::default(), ApplyMode::Append);
    }

    #[test]
    fn test_batch_keeps_prior_blocks_and_appends_a_paragraph() {
        let document = shared_document();
        document
            .load_markdown("# Vigne\n\nLe mildiou progresse.")
            .unwrap();
        let before = document.snapshot();

        apply_batch(&document, RequestId::new(), "Hello world").unwrap();

        let after = document.snapshot();
        assert_eq!(after.block_count(), before.block_count() + 1);
        assert_eq!(&after.blocks()[..before.block_count()], before.blocks());
        assert_eq!(document.plain_text(), "Vigne\n\nLe mildiou progresse.\n\nHello world");
    }

    #[test]
    fn test_batch_into_an_empty_document() {
        let document = shared_document();
        apply_batch(&document, RequestId::new(), "Premier contenu").unwrap();
        assert_eq!(document.plain_text(), "Premier contenu");
        assert_eq!(document.snapshot().block_count(), 1);
    }

    #[test]
    fn test_chunks_accumulate_in_arrival_order() {
        let document = shared_document();
        document.load_markdown("Contexte.").unwrap();

        let request = RequestId::new();
        begin_stream(&document, request).unwrap();
        for chunk in ["Le ", "climat ", "est ", "variable."] {
            apply_chunk(&document, request, chunk).unwrap();
        }

        assert_eq!(document.plain_text(), "Contexte.\n\nLe climat est variable.");
    }

    #[test]
    fn test_chunks_follow_the_live_document_end() {
        let document = shared_document();
        let request = RequestId::new();
        begin_stream(&document, request).unwrap();
        apply_chunk(&document, request, "Début de réponse.").unwrap();

        // An author keeps writing below the response paragraph.
        document
            .update(UpdateOrigin::User, |tx| {
                tx.append_empty_paragraph();
                tx.insert_text("Note manuelle. ")
            })
            .unwrap();

        apply_chunk(&document, request, "Suite.").unwrap();
        assert_eq!(
            document.plain_text(),
            "Début de réponse.\n\nNote manuelle. Suite."
        );
    }
}
