//! Ephemeral selection state.
//!
//! Selections are batch-scoped: they exist only inside a mutation batch and
//! are recomputed from the live tree, never cached across batches. Positions
//! address a top-level block by index and a char offset into that block's
//! flattened text.

use serde::{Deserialize, Serialize};

/// A caret position: block index plus char offset into the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }

    /// The very start of a document.
    pub fn start() -> Self {
        Self::new(0, 0)
    }
}

/// A selection: either a collapsed caret or an anchor/focus range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Caret(Position),
    Range { anchor: Position, focus: Position },
}

impl Selection {
    pub fn caret(block: usize, offset: usize) -> Self {
        Selection::Caret(Position::new(block, offset))
    }

    pub fn is_caret(&self) -> bool {
        matches!(self, Selection::Caret(_))
    }

    /// The active end of the selection (where typed text lands).
    pub fn focus(&self) -> Position {
        match self {
            Selection::Caret(pos) => *pos,
            Selection::Range { focus, .. } => *focus,
        }
    }
}
