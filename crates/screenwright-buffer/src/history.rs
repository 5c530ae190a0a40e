//! Undo/redo history over block edits.
//!
//! Every mutating buffer primitive records an invertible [`Edit`]. Undo
//! applies inverses in reverse order; redo re-applies. Rapid
//! single-character text edits coalesce into one undo step, and compound
//! operations (such as a palette confirmation) can be grouped explicitly.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::block::BlockType;

/// A single invertible edit to the block sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edit {
    /// `text` was inserted into block `block` at character `offset`.
    InsertText {
        block: usize,
        offset: usize,
        text: String,
    },
    /// `text` was removed from block `block` starting at character `offset`.
    DeleteText {
        block: usize,
        offset: usize,
        text: String,
    },
    /// Block `block` was retyped from `old` to `new`.
    SetKind {
        block: usize,
        old: BlockType,
        new: BlockType,
    },
    /// Block `block` was split at character `offset`; the trailing text
    /// moved into a new block of kind `kind` at index `block + 1`.
    SplitBlock {
        block: usize,
        offset: usize,
        kind: BlockType,
    },
    /// Block `block + 1` (of kind `kind`) was merged into block `block`;
    /// the junction sits at character `offset` of the surviving block.
    MergeBlocks {
        block: usize,
        offset: usize,
        kind: BlockType,
    },
}

impl Edit {
    /// Returns the inverse edit, for undo.
    pub fn inverse(&self) -> Edit {
        match self {
            Edit::InsertText {
                block,
                offset,
                text,
            } => Edit::DeleteText {
                block: *block,
                offset: *offset,
                text: text.clone(),
            },
            Edit::DeleteText {
                block,
                offset,
                text,
            } => Edit::InsertText {
                block: *block,
                offset: *offset,
                text: text.clone(),
            },
            Edit::SetKind { block, old, new } => Edit::SetKind {
                block: *block,
                old: *new,
                new: *old,
            },
            Edit::SplitBlock {
                block,
                offset,
                kind,
            } => Edit::MergeBlocks {
                block: *block,
                offset: *offset,
                kind: *kind,
            },
            Edit::MergeBlocks {
                block,
                offset,
                kind,
            } => Edit::SplitBlock {
                block: *block,
                offset: *offset,
                kind: *kind,
            },
        }
    }

    /// Returns true if this edit can absorb `other` into one undo step.
    ///
    /// Only plain text edits coalesce: same block, adjacent offsets, no
    /// newlines on either side.
    pub fn can_coalesce(&self, other: &Edit) -> bool {
        match (self, other) {
            (
                Edit::InsertText {
                    block,
                    offset,
                    text,
                },
                Edit::InsertText {
                    block: b2,
                    offset: o2,
                    text: t2,
                },
            ) => {
                block == b2
                    && offset + text.chars().count() == *o2
                    && !text.contains('\n')
                    && !t2.contains('\n')
            }
            (
                Edit::DeleteText {
                    block,
                    offset,
                    text: _,
                },
                Edit::DeleteText {
                    block: b2,
                    offset: o2,
                    text: t2,
                },
            ) => {
                // Backspace run: the next deletion ends where this one starts.
                block == b2 && o2 + t2.chars().count() == *offset && !t2.contains('\n')
            }
            _ => false,
        }
    }

    /// Absorbs `other` into this edit. Caller must have checked
    /// `can_coalesce` first.
    pub fn coalesce(&mut self, other: Edit) {
        match (self, other) {
            (Edit::InsertText { text, .. }, Edit::InsertText { text: t2, .. }) => {
                text.push_str(&t2);
            }
            (
                Edit::DeleteText { offset, text, .. },
                Edit::DeleteText {
                    offset: o2,
                    text: t2,
                    ..
                },
            ) => {
                *text = t2 + text;
                *offset = o2;
            }
            _ => unreachable!("coalesce called on incompatible edits"),
        }
    }
}

/// A group of edits undone/redone together.
#[derive(Debug, Clone)]
pub struct EditGroup {
    pub edits: Vec<Edit>,
    /// When this group was last extended; None disables coalescing.
    timestamp: Option<Instant>,
}

impl EditGroup {
    fn new(edit: Edit) -> Self {
        Self {
            edits: vec![edit],
            timestamp: Some(Instant::now()),
        }
    }
}

/// Bounded undo/redo stacks with coalescing and explicit grouping.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<EditGroup>,
    redo_stack: Vec<EditGroup>,
    max_size: usize,
    coalesce_threshold: Duration,
    in_group: bool,
}

impl History {
    /// Creates a new history keeping at most `max_size` undo steps.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size.min(64)),
            redo_stack: Vec::new(),
            max_size,
            coalesce_threshold: Duration::from_millis(300),
            in_group: false,
        }
    }

    /// Sets how long after the previous edit typing still merges into
    /// the same undo step. A zero window disables coalescing.
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_threshold = window;
        self
    }

    /// Records an edit. Clears the redo stack; may coalesce with the
    /// previous edit or extend the current group.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if let Some(last_group) = self.undo_stack.back_mut() {
            if self.in_group {
                last_group.edits.push(edit);
                last_group.timestamp = Some(Instant::now());
                return;
            }

            if let Some(timestamp) = last_group.timestamp {
                if timestamp.elapsed() < self.coalesce_threshold {
                    if let Some(last_edit) = last_group.edits.last_mut() {
                        if last_edit.can_coalesce(&edit) {
                            last_edit.coalesce(edit);
                            last_group.timestamp = Some(Instant::now());
                            return;
                        }
                    }
                }
            }
        }

        self.undo_stack.push_back(EditGroup::new(edit));
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Starts a group; edits until `end_group` form one undo step.
    pub fn begin_group(&mut self, first: Edit) {
        self.redo_stack.clear();
        self.undo_stack.push_back(EditGroup::new(first));
        self.in_group = true;
    }

    /// Ends the current group.
    pub fn end_group(&mut self) {
        self.in_group = false;
    }

    /// Pops the last undo step. The edits are returned in application
    /// order; the caller applies their inverses in reverse.
    pub fn undo(&mut self) -> Option<Vec<Edit>> {
        let group = self.undo_stack.pop_back()?;
        self.redo_stack.push(EditGroup {
            edits: group.edits.clone(),
            timestamp: None,
        });
        Some(group.edits)
    }

    /// Pops the last redo step, returning edits in application order.
    pub fn redo(&mut self) -> Option<Vec<Edit>> {
        let group = self.redo_stack.pop()?;
        self.undo_stack.push_back(EditGroup {
            edits: group.edits.clone(),
            timestamp: None, // no timestamp prevents coalescing
        });
        Some(group.edits)
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.in_group = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_inverse_roundtrip() {
        let edit = Edit::InsertText {
            block: 0,
            offset: 3,
            text: "abc".to_string(),
        };
        assert_eq!(edit.inverse().inverse(), edit);

        let split = Edit::SplitBlock {
            block: 1,
            offset: 4,
            kind: BlockType::Dialogue,
        };
        assert!(matches!(split.inverse(), Edit::MergeBlocks { block: 1, offset: 4, .. }));
    }

    #[test]
    fn test_insert_coalescing() {
        let mut a = Edit::InsertText {
            block: 0,
            offset: 0,
            text: "a".to_string(),
        };
        let b = Edit::InsertText {
            block: 0,
            offset: 1,
            text: "b".to_string(),
        };
        assert!(a.can_coalesce(&b));
        a.coalesce(b);
        assert_eq!(
            a,
            Edit::InsertText {
                block: 0,
                offset: 0,
                text: "ab".to_string()
            }
        );
    }

    #[test]
    fn test_backspace_coalescing() {
        let mut a = Edit::DeleteText {
            block: 0,
            offset: 4,
            text: "e".to_string(),
        };
        let b = Edit::DeleteText {
            block: 0,
            offset: 3,
            text: "d".to_string(),
        };
        assert!(a.can_coalesce(&b));
        a.coalesce(b);
        assert_eq!(
            a,
            Edit::DeleteText {
                block: 0,
                offset: 3,
                text: "de".to_string()
            }
        );
    }

    #[test]
    fn test_no_coalesce_across_blocks() {
        let a = Edit::InsertText {
            block: 0,
            offset: 0,
            text: "a".to_string(),
        };
        let b = Edit::InsertText {
            block: 1,
            offset: 1,
            text: "b".to_string(),
        };
        assert!(!a.can_coalesce(&b));
    }

    #[test]
    fn test_history_undo_redo() {
        let mut history = History::new(100);
        history.push(Edit::SetKind {
            block: 0,
            old: BlockType::Action,
            new: BlockType::SceneHeading,
        });

        assert!(history.can_undo());
        let edits = history.undo().unwrap();
        assert_eq!(edits.len(), 1);
        assert!(history.can_redo());
        assert_eq!(history.redo().unwrap(), edits);
    }

    #[test]
    fn test_grouped_edits_undo_together() {
        let mut history = History::new(100);
        history.begin_group(Edit::DeleteText {
            block: 0,
            offset: 0,
            text: "/".to_string(),
        });
        history.push(Edit::SplitBlock {
            block: 0,
            offset: 0,
            kind: BlockType::Character,
        });
        history.end_group();

        let edits = history.undo().unwrap();
        assert_eq!(edits.len(), 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_coalesce_window_disables_merging() {
        let mut history = History::new(100).with_coalesce_window(Duration::ZERO);
        history.push(Edit::InsertText {
            block: 0,
            offset: 0,
            text: "a".to_string(),
        });
        history.push(Edit::InsertText {
            block: 0,
            offset: 1,
            text: "b".to_string(),
        });

        assert_eq!(history.undo().unwrap().len(), 1);
        assert!(history.can_undo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(100);
        history.push(Edit::SetKind {
            block: 0,
            old: BlockType::Action,
            new: BlockType::Character,
        });
        history.undo().unwrap();
        assert!(history.can_redo());
        history.push(Edit::SetKind {
            block: 0,
            old: BlockType::Action,
            new: BlockType::Dialogue,
        });
        assert!(!history.can_redo());
    }
}
