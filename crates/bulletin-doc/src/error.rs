//! Error types for document operations.

use thiserror::Error;

use crate::node::BlockKind;

/// Errors arising from document mutation.
///
/// A batch that returns an error is rolled back wholesale; the document is
/// left exactly as it was before the batch began.
#[derive(Debug, Error)]
pub enum DocError {
    /// A block index referred to a block that does not exist.
    #[error("block index {index} out of bounds ({count} blocks)")]
    BlockOutOfBounds { index: usize, count: usize },

    /// A character offset fell outside the addressed content.
    #[error("offset {offset} out of bounds (length {len})")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// A text operation ran with no selection in the current batch.
    #[error("no selection active in this batch")]
    NoSelection,

    /// The addressed block cannot hold caret text (e.g. a thematic break).
    #[error("{kind} block does not accept text insertion")]
    NotTextEditable { kind: BlockKind },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, DocError>;
