//! The document value: an ordered sequence of blocks plus the tree-editing
//! primitives batches are built from.
//!
//! `Document` is a plain value with no interior locking; concurrency and
//! history live in [`crate::store`]. Editing primitives here keep the tree
//! canonical: adjacent text runs with the same style are always merged, and
//! empty runs never survive an edit.

use serde::{Deserialize, Serialize};

use crate::error::{DocError, Result};
use crate::node::{Block, BlockKind, Inline, push_inline, TextRun, TextStyle};
use crate::selection::Position;

/// A bulletin document. May be empty (zero blocks).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Flattened text of the whole document. Top-level blocks are separated
    /// by blank lines, matching what a reader would select and copy.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            block.plain_text_into(&mut out);
        }
        out
    }

    /// The position just past the last char of the last block. Recomputed
    /// from the live tree on every call; an empty document yields the origin.
    pub fn end_position(&self) -> Position {
        match self.blocks.last() {
            Some(block) => Position::new(self.blocks.len() - 1, block.char_len()),
            None => Position::start(),
        }
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Insert plain text at a position. Newlines in `text` become hard line
    /// breaks within the target block. Inserted text inherits the style of
    /// the run the caret sits in. Returns the caret position just past the
    /// inserted text.
    pub fn insert_text_at(&mut self, pos: Position, text: &str) -> Result<Position> {
        if text.is_empty() {
            return Ok(pos);
        }
        if self.blocks.is_empty() && pos == Position::start() {
            self.blocks.push(Block::empty_paragraph());
        }
        let count = self.blocks.len();
        let block = self
            .blocks
            .get_mut(pos.block)
            .ok_or(DocError::BlockOutOfBounds {
                index: pos.block,
                count,
            })?;
        insert_in_block(block, pos.offset, text)?;
        Ok(Position::new(pos.block, pos.offset + text.chars().count()))
    }
}

// ── Insertion internals ─────────────────────────────────────────────────────

/// Insert text at a flattened char offset inside one block, recursing into
/// containers. Offsets count nested blocks joined by one-char separators,
/// consistent with [`Block::char_len`].
fn insert_in_block(block: &mut Block, offset: usize, text: &str) -> Result<()> {
    let len = block.char_len();
    if offset > len {
        return Err(DocError::OffsetOutOfBounds { offset, len });
    }
    match block {
        Block::Paragraph { inlines } | Block::Heading { inlines, .. } => {
            insert_in_inlines(inlines, offset, text)
        }
        Block::CodeBlock { text: code, .. } => {
            let trimmed_len = code.trim_end_matches('\n').chars().count();
            let byte = char_to_byte(code, offset.min(trimmed_len));
            code.insert_str(byte, text);
            Ok(())
        }
        Block::Quote { blocks } => insert_in_block_seq(blocks.iter_mut(), offset, text),
        Block::List { items, .. } => {
            let blocks = items.iter_mut().flat_map(|item| item.blocks.iter_mut());
            insert_in_block_seq(blocks, offset, text)
        }
        Block::Table { header, rows, .. } => {
            let cells = header
                .cells
                .iter_mut()
                .chain(rows.iter_mut().flat_map(|row| row.cells.iter_mut()));
            let mut acc = 0;
            for (i, cell) in cells.enumerate() {
                if i > 0 {
                    acc += 1;
                }
                let cell_len: usize = cell.inlines.iter().map(Inline::char_len).sum();
                if offset <= acc + cell_len {
                    return insert_in_inlines(&mut cell.inlines, offset - acc, text);
                }
                acc += cell_len;
            }
            Err(DocError::OffsetOutOfBounds { offset, len })
        }
        Block::Rule => Err(DocError::NotTextEditable {
            kind: BlockKind::Rule,
        }),
    }
}

/// Walk a flattened sequence of nested blocks (one-char separators between
/// them) and recurse into the one the offset lands in. A boundary offset
/// belongs to the earlier block.
fn insert_in_block_seq<'a>(
    blocks: impl Iterator<Item = &'a mut Block>,
    offset: usize,
    text: &str,
) -> Result<()> {
    let mut acc = 0;
    for (i, block) in blocks.enumerate() {
        if i > 0 {
            acc += 1;
        }
        let len = block.char_len();
        if offset <= acc + len {
            return insert_in_block(block, offset - acc, text);
        }
        acc += len;
    }
    Err(DocError::OffsetOutOfBounds {
        offset,
        len: acc,
    })
}

/// Insert text into a run list at a char offset. The caller has validated
/// `offset <= total`. A boundary offset attaches to the run before it, so
/// appended text continues that run's style.
fn insert_in_inlines(inlines: &mut Vec<Inline>, offset: usize, text: &str) -> Result<()> {
    if inlines.is_empty() {
        *inlines = text_pieces(text, TextStyle::PLAIN);
        return Ok(());
    }

    let mut acc = 0;
    let mut target = None;
    for (i, inline) in inlines.iter().enumerate() {
        let len = inline.char_len();
        if offset <= acc + len {
            target = Some((i, offset - acc, len));
            break;
        }
        acc += len;
    }
    let Some((index, local, len)) = target else {
        let total: usize = inlines.iter().map(Inline::char_len).sum();
        return Err(DocError::OffsetOutOfBounds { offset, len: total });
    };

    let replacement = match &mut inlines[index] {
        Inline::Text(run) => {
            let byte = char_to_byte(&run.text, local);
            let (left, right) = run.text.split_at(byte);
            let mut seq = Vec::new();
            if !left.is_empty() {
                seq.push(Inline::Text(TextRun::styled(left, run.style)));
            }
            seq.extend(text_pieces(text, run.style));
            if !right.is_empty() {
                seq.push(Inline::Text(TextRun::styled(right, run.style)));
            }
            seq
        }
        Inline::Link { children, .. } if local > 0 && local < len => {
            return insert_in_inlines(children, local, text);
        }
        other => {
            // Atomic inline (image, break, link boundary): text lands
            // beside it as an unstyled run.
            let mut seq = Vec::new();
            let pieces = text_pieces(text, TextStyle::PLAIN);
            if local == 0 {
                seq.extend(pieces);
                seq.push(other.clone());
            } else {
                seq.push(other.clone());
                seq.extend(pieces);
            }
            seq
        }
    };

    inlines.splice(index..=index, replacement);
    normalize_inlines(inlines);
    Ok(())
}

/// Turn inserted text into runs, mapping embedded newlines to hard breaks.
pub(crate) fn text_pieces(text: &str, style: TextStyle) -> Vec<Inline> {
    let mut pieces = Vec::new();
    for (i, segment) in text.split('\n').enumerate() {
        if i > 0 {
            pieces.push(Inline::HardBreak);
        }
        if !segment.is_empty() {
            pieces.push(Inline::Text(TextRun::styled(segment, style)));
        }
    }
    pieces
}

/// Re-canonicalize a run list: merge same-style neighbors, drop empty runs.
fn normalize_inlines(inlines: &mut Vec<Inline>) {
    let old = std::mem::take(inlines);
    for inline in old {
        if matches!(&inline, Inline::Text(run) if run.text.is_empty()) {
            continue;
        }
        push_inline(inlines, inline);
    }
}

fn char_to_byte(s: &str, offset: usize) -> usize {
    s.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

// ── Tests ───────────────────────────────────────────────────────────────────
