//! Cursor and selection types over the block sequence.

use serde::{Deserialize, Serialize};

/// A position in the screenplay: which block, and a character offset
/// inside that block's text.
///
/// Both fields are 0-indexed; `offset` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Index of the containing block
    pub block: usize,
    /// Character offset within the block's text
    pub offset: usize,
}

impl Cursor {
    /// Creates a new cursor position.
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }

    /// Position at the start of the document.
    pub const ZERO: Cursor = Cursor {
        block: 0,
        offset: 0,
    };

    /// Returns true if this position is before another.
    pub fn is_before(&self, other: &Cursor) -> bool {
        self.block < other.block || (self.block == other.block && self.offset < other.offset)
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.block, self.offset).cmp(&(other.block, other.offset))
    }
}

/// A selection over the block sequence.
///
/// Start is always before or equal to end (normalized on construction).
/// A collapsed selection is just the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Start position (inclusive)
    pub start: Cursor,
    /// End position (exclusive)
    pub end: Cursor,
}

impl Selection {
    /// Creates a new selection, normalizing so start <= end.
    pub fn new(start: Cursor, end: Cursor) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a zero-width selection at a cursor position.
    pub fn collapsed(at: Cursor) -> Self {
        Self { start: at, end: at }
    }

    /// Returns true if this is a zero-width selection.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive range of block indices touched by this selection.
    pub fn block_range(&self) -> std::ops::RangeInclusive<usize> {
        self.start.block..=self.end.block
    }
}
