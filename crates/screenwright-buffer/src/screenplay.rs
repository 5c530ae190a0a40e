//! The screenplay buffer: an ordered block sequence with cursor tracking
//! and undo/redo.
//!
//! `Screenplay` owns the document exclusively. Every mutating primitive
//! validates its inputs, applies an invertible [`Edit`] and records it on
//! the history, so undo/redo falls out of the edit log rather than from
//! snapshots.

use unicode_segmentation::UnicodeSegmentation;

use crate::block::{Block, BlockType};
use crate::cursor::{Cursor, Selection};
use crate::history::{Edit, History};
use crate::{BufferError, BufferResult};

/// Ordered sequence of typed blocks plus cursor, selection and history.
///
/// Invariant: the block list is never empty; a fresh screenplay holds one
/// empty Action block.
#[derive(Debug, Clone)]
pub struct Screenplay {
    blocks: Vec<Block>,
    cursor: Cursor,
    anchor: Option<Cursor>,
    history: History,
    modified: bool,
    compound_pending: bool,
}

impl Screenplay {
    /// Creates an empty screenplay: one empty Action block.
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Creates a screenplay from existing blocks. An empty input still
    /// yields one empty Action block; the cursor lands at the end of the
    /// last block.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self::from_blocks_with_history(blocks, History::new(1000))
    }

    /// Like [`from_blocks`](Self::from_blocks), with a caller-built
    /// history so undo depth and coalescing follow host configuration.
    pub fn from_blocks_with_history(mut blocks: Vec<Block>, history: History) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::empty(BlockType::Action));
        }
        let last = blocks.len() - 1;
        let offset = blocks[last].len_chars();
        Self {
            blocks,
            cursor: Cursor::new(last, offset),
            anchor: None,
            history,
            modified: false,
            compound_pending: false,
        }
    }

    // ==================== Queries ====================

    /// The block sequence, in reading order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// An owned copy of the block sequence, for export snapshots.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Current selection (collapsed to the cursor when no anchor is set).
    pub fn selection(&self) -> Selection {
        match self.anchor {
            Some(anchor) => Selection::new(anchor, self.cursor),
            None => Selection::collapsed(self.cursor),
        }
    }

    /// True if the selection is just the cursor.
    pub fn selection_collapsed(&self) -> bool {
        self.selection().is_collapsed()
    }

    /// Kind of the block containing the cursor.
    pub fn current_block_kind(&self) -> BlockType {
        self.blocks[self.cursor.block].kind
    }

    /// Full text of the block containing the cursor.
    pub fn current_block_text(&self) -> &str {
        &self.blocks[self.cursor.block].text
    }

    /// True if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Marks the buffer clean, e.g. after a save.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    // ==================== Cursor & selection ====================

    /// Moves the cursor to the start of block `index`, clearing any
    /// selection.
    pub fn move_cursor_into(&mut self, index: usize) -> BufferResult<()> {
        if index >= self.blocks.len() {
            return Err(BufferError::BlockOutOfBounds(index));
        }
        self.cursor = Cursor::new(index, 0);
        self.anchor = None;
        Ok(())
    }

    /// Moves the cursor to an arbitrary valid position.
    pub fn move_cursor_to(&mut self, cursor: Cursor) -> BufferResult<()> {
        self.check_position(cursor)?;
        self.cursor = cursor;
        self.anchor = None;
        Ok(())
    }

    /// Moves the cursor to the end of the block containing it.
    pub fn move_to_block_end(&mut self) {
        self.cursor.offset = self.blocks[self.cursor.block].len_chars();
        self.anchor = None;
    }

    /// Moves one grapheme left, crossing into the previous block at a
    /// block start.
    pub fn move_left(&mut self) {
        self.anchor = None;
        if self.cursor.offset > 0 {
            let text = &self.blocks[self.cursor.block].text;
            let prev = prev_grapheme(text, self.cursor.offset);
            self.cursor.offset -= prev.chars().count();
        } else if self.cursor.block > 0 {
            self.cursor.block -= 1;
            self.cursor.offset = self.blocks[self.cursor.block].len_chars();
        }
    }

    /// Moves one grapheme right, crossing into the next block at a block
    /// end.
    pub fn move_right(&mut self) {
        self.anchor = None;
        let text = &self.blocks[self.cursor.block].text;
        if self.cursor.offset < self.blocks[self.cursor.block].len_chars() {
            let next = next_grapheme(text, self.cursor.offset);
            self.cursor.offset += next.chars().count();
        } else if self.cursor.block + 1 < self.blocks.len() {
            self.cursor.block += 1;
            self.cursor.offset = 0;
        }
    }

    /// Selects from `start` to `end`; the cursor lands at `end`.
    pub fn select(&mut self, start: Cursor, end: Cursor) -> BufferResult<()> {
        self.check_position(start)?;
        self.check_position(end)?;
        self.anchor = Some(start);
        self.cursor = end;
        Ok(())
    }

    /// Selects the entire document.
    pub fn select_all(&mut self) {
        let last = self.blocks.len() - 1;
        self.anchor = Some(Cursor::ZERO);
        self.cursor = Cursor::new(last, self.blocks[last].len_chars());
    }

    /// Collapses the selection to the cursor.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    // ==================== Mutations ====================

    /// Inserts text at the cursor. An active selection is deleted first,
    /// as one undo step with the insertion.
    pub fn insert_text(&mut self, text: &str) -> BufferResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let had_selection = !self.selection_collapsed();
        if had_selection {
            self.begin_compound();
            self.delete_selection()?;
        }
        let at = self.cursor;
        self.commit(Edit::InsertText {
            block: at.block,
            offset: at.offset,
            text: text.to_string(),
        });
        self.cursor.offset = at.offset + text.chars().count();
        if had_selection {
            self.end_compound();
        }
        Ok(())
    }

    /// Deletes `n` graphemes before the cursor. At a block start the
    /// current block merges into the previous one (the previous block's
    /// kind survives). With an active selection, the selection is deleted
    /// instead and counts as the whole call.
    pub fn delete_backward(&mut self, n: usize) -> BufferResult<()> {
        if !self.selection_collapsed() {
            return self.delete_selection();
        }
        for _ in 0..n {
            if self.cursor.offset > 0 {
                let text = &self.blocks[self.cursor.block].text;
                let grapheme = prev_grapheme(text, self.cursor.offset).to_string();
                let start = self.cursor.offset - grapheme.chars().count();
                self.commit(Edit::DeleteText {
                    block: self.cursor.block,
                    offset: start,
                    text: grapheme,
                });
                self.cursor.offset = start;
            } else if self.cursor.block > 0 {
                let prev = self.cursor.block - 1;
                let junction = self.blocks[prev].len_chars();
                let kind = self.blocks[self.cursor.block].kind;
                self.commit(Edit::MergeBlocks {
                    block: prev,
                    offset: junction,
                    kind,
                });
                self.cursor = Cursor::new(prev, junction);
            } else {
                break; // start of document
            }
        }
        Ok(())
    }

    /// Deletes `n` graphemes after the cursor; at a block end the next
    /// block merges into the current one.
    pub fn delete_forward(&mut self, n: usize) -> BufferResult<()> {
        if !self.selection_collapsed() {
            return self.delete_selection();
        }
        for _ in 0..n {
            let len = self.blocks[self.cursor.block].len_chars();
            if self.cursor.offset < len {
                let text = &self.blocks[self.cursor.block].text;
                let grapheme = next_grapheme(text, self.cursor.offset).to_string();
                self.commit(Edit::DeleteText {
                    block: self.cursor.block,
                    offset: self.cursor.offset,
                    text: grapheme,
                });
            } else if self.cursor.block + 1 < self.blocks.len() {
                let kind = self.blocks[self.cursor.block + 1].kind;
                self.commit(Edit::MergeBlocks {
                    block: self.cursor.block,
                    offset: self.cursor.offset,
                    kind,
                });
            } else {
                break; // end of document
            }
        }
        Ok(())
    }

    /// Deletes the selected range, if any. One undo step.
    pub fn delete_selection(&mut self) -> BufferResult<()> {
        let sel = self.selection();
        if sel.is_collapsed() {
            return Ok(());
        }
        let single_step = !self.compound_pending;
        if single_step {
            self.begin_compound();
        }

        if sel.start.block == sel.end.block {
            let text = self.chars_between(sel.start.block, sel.start.offset, sel.end.offset);
            self.commit(Edit::DeleteText {
                block: sel.start.block,
                offset: sel.start.offset,
                text,
            });
        } else {
            // Trim the tail of the first block.
            let start_len = self.blocks[sel.start.block].len_chars();
            if sel.start.offset < start_len {
                let tail = self.chars_between(sel.start.block, sel.start.offset, start_len);
                self.commit(Edit::DeleteText {
                    block: sel.start.block,
                    offset: sel.start.offset,
                    text: tail,
                });
            }
            // Consume following blocks until the end block has been merged in.
            let mut remaining = sel.end.block - sel.start.block;
            while remaining > 0 {
                let victim = sel.start.block + 1;
                let last = remaining == 1;
                let keep_from = if last { sel.end.offset } else { self.blocks[victim].len_chars() };
                if keep_from > 0 {
                    let head = self.chars_between(victim, 0, keep_from);
                    self.commit(Edit::DeleteText {
                        block: victim,
                        offset: 0,
                        text: head,
                    });
                }
                self.commit(Edit::MergeBlocks {
                    block: sel.start.block,
                    offset: sel.start.offset,
                    kind: self.blocks[victim].kind,
                });
                remaining -= 1;
            }
        }

        self.cursor = sel.start;
        self.anchor = None;
        if single_step {
            self.end_compound();
        }
        Ok(())
    }

    /// Retypes the block containing the cursor. No-op (and no history
    /// entry) when the kind is unchanged.
    pub fn set_current_block_kind(&mut self, kind: BlockType) {
        let block = self.cursor.block;
        let old = self.blocks[block].kind;
        if old != kind {
            self.commit(Edit::SetKind {
                block,
                old,
                new: kind,
            });
        }
    }

    /// Retypes an arbitrary block.
    pub fn set_block_kind(&mut self, index: usize, kind: BlockType) -> BufferResult<()> {
        let old = self
            .blocks
            .get(index)
            .ok_or(BufferError::BlockOutOfBounds(index))?
            .kind;
        if old != kind {
            self.commit(Edit::SetKind {
                block: index,
                old,
                new: kind,
            });
        }
        Ok(())
    }

    /// Splits the current block at the cursor: text left of the cursor
    /// stays, text right of it moves into a new block of `kind` inserted
    /// immediately after, and the cursor lands at the new block's start.
    pub fn insert_block_at_cursor(&mut self, kind: BlockType) {
        let at = self.cursor;
        self.commit(Edit::SplitBlock {
            block: at.block,
            offset: at.offset,
            kind,
        });
        self.cursor = Cursor::new(at.block + 1, 0);
        self.anchor = None;
    }

    // ==================== Undo/redo ====================

    /// Undoes the last undo step.
    pub fn undo(&mut self) -> BufferResult<()> {
        let edits = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        for edit in edits.iter().rev() {
            let inverse = edit.inverse();
            self.apply(&inverse);
            self.cursor = self.cursor_after(&inverse);
        }
        self.anchor = None;
        self.modified = true;
        Ok(())
    }

    /// Redoes the last undone step.
    pub fn redo(&mut self) -> BufferResult<()> {
        let edits = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        for edit in &edits {
            self.apply(edit);
            self.cursor = self.cursor_after(edit);
        }
        self.anchor = None;
        self.modified = true;
        Ok(())
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Begins a compound operation: edits until [`Self::end_compound`]
    /// form one undo step.
    pub fn begin_compound(&mut self) {
        self.compound_pending = true;
    }

    /// Ends the current compound operation.
    pub fn end_compound(&mut self) {
        self.compound_pending = false;
        self.history.end_group();
    }

    // ==================== Internals ====================

    /// Applies an edit and records it on the history.
    fn commit(&mut self, edit: Edit) {
        self.apply(&edit);
        if self.compound_pending {
            self.history.begin_group(edit);
            self.compound_pending = false;
        } else {
            self.history.push(edit);
        }
        self.modified = true;
    }

    /// Performs the structural change an edit describes. Edits are
    /// constructed internally against the current state, so indices are
    /// trusted here.
    fn apply(&mut self, edit: &Edit) {
        match edit {
            Edit::InsertText {
                block,
                offset,
                text,
            } => {
                let byte = byte_of_char(&self.blocks[*block].text, *offset);
                self.blocks[*block].text.insert_str(byte, text);
            }
            Edit::DeleteText {
                block,
                offset,
                text,
            } => {
                let start = byte_of_char(&self.blocks[*block].text, *offset);
                let end = byte_of_char(&self.blocks[*block].text, *offset + text.chars().count());
                self.blocks[*block].text.replace_range(start..end, "");
            }
            Edit::SetKind { block, new, .. } => {
                self.blocks[*block].kind = *new;
            }
            Edit::SplitBlock {
                block,
                offset,
                kind,
            } => {
                let byte = byte_of_char(&self.blocks[*block].text, *offset);
                let tail = self.blocks[*block].text.split_off(byte);
                self.blocks.insert(*block + 1, Block::new(*kind, tail));
            }
            Edit::MergeBlocks { block, .. } => {
                let removed = self.blocks.remove(*block + 1);
                self.blocks[*block].text.push_str(&removed.text);
            }
        }
    }

    /// Where the cursor lands after an edit has been applied.
    fn cursor_after(&self, edit: &Edit) -> Cursor {
        match edit {
            Edit::InsertText {
                block,
                offset,
                text,
            } => Cursor::new(*block, offset + text.chars().count()),
            Edit::DeleteText { block, offset, .. } => Cursor::new(*block, *offset),
            Edit::SetKind { block, .. } => Cursor::new(*block, self.blocks[*block].len_chars()),
            Edit::SplitBlock { block, .. } => Cursor::new(*block + 1, 0),
            Edit::MergeBlocks { block, offset, .. } => Cursor::new(*block, *offset),
        }
    }

    fn check_position(&self, cursor: Cursor) -> BufferResult<()> {
        let block = self
            .blocks
            .get(cursor.block)
            .ok_or(BufferError::BlockOutOfBounds(cursor.block))?;
        if cursor.offset > block.len_chars() {
            return Err(BufferError::OffsetOutOfBounds {
                block: cursor.block,
                offset: cursor.offset,
            });
        }
        Ok(())
    }

    /// Extracts the text between two character offsets of a block.
    fn chars_between(&self, block: usize, start: usize, end: usize) -> String {
        let text = &self.blocks[block].text;
        let a = byte_of_char(text, start);
        let b = byte_of_char(text, end);
        text[a..b].to_string()
    }
}

impl Default for Screenplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte index of the `char_offset`-th character of `text`.
fn byte_of_char(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// The grapheme ending at character offset `offset`.
fn prev_grapheme(text: &str, offset: usize) -> &str {
    let byte = byte_of_char(text, offset);
    text[..byte]
        .graphemes(true)
        .next_back()
        .unwrap_or("")
}

/// The grapheme starting at character offset `offset`.
fn next_grapheme(text: &str, offset: usize) -> &str {
    let byte = byte_of_char(text, offset);
    text[byte..].graphemes(true).next().unwrap_or("")
}
