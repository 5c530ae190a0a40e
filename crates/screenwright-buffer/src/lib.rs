//! # Screenwright Buffer
//!
//! The typed block buffer underneath the screenplay editor: an ordered
//! sequence of `{kind, text}` blocks with cursor/selection tracking and an
//! undo/redo history recording every mutating call.
//!
//! The buffer owns the document exclusively. Higher layers (the transition
//! controller, the auto-format engine) drive it only through the primitive
//! operations exposed here and never reach into block storage directly.

mod block;
mod cursor;
mod history;
mod screenplay;

pub use block::{Block, BlockType, TitlePage};
pub use cursor::{Cursor, Selection};
pub use history::{Edit, History};
pub use screenplay::Screenplay;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("block index {0} is out of bounds")]
    BlockOutOfBounds(usize),

    #[error("offset {offset} is out of bounds in block {block}")]
    OffsetOutOfBounds { block: usize, offset: usize },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let sp = Screenplay::new();
        assert_eq!(sp.block_count(), 1);
        assert!(!sp.is_modified());
    }

    #[test]
    fn test_from_blocks_round_trip() {
        let blocks = vec![
            Block::new(BlockType::SceneHeading, "INT. ROOM - DAY"),
            Block::new(BlockType::Action, "A writer types."),
        ];
        let sp = Screenplay::from_blocks(blocks.clone());
        assert_eq!(sp.snapshot(), blocks);
    }

    #[test]
    fn test_undo_marks_modified() {
        let mut sp = Screenplay::new();
        sp.insert_text("x").unwrap();
        sp.mark_saved();
        sp.undo().unwrap();
        assert!(sp.is_modified());
    }
}
