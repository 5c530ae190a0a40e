//! The block transition controller: a two-state machine (Editing /
//! PaletteOpen) deciding how each whole-key event mutates the block
//! sequence.
//!
//! Ordinary characters fall through to the buffer and then to the
//! auto-format engine; Enter, Tab and "/" are intercepted before the
//! buffer sees them. While the palette is open it owns the keyboard:
//! everything except ArrowUp/ArrowDown/Enter/Escape is suppressed.

use screenwright_buffer::{BlockType, Screenplay};
use tracing::debug;

use crate::autoformat::AutoFormat;
use crate::input::{CaretAnchor, Key, KeyPress};
use crate::palette::{CommandPalette, PaletteCommand};

/// What a key event did, for event emission by the editor facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Text entered the buffer (possibly after deleting a selection).
    Inserted,
    /// Text was deleted (Backspace/Delete).
    Deleted,
    /// The block under the cursor was reclassified by auto-format.
    Reclassified(BlockType),
    /// A new block was inserted and the cursor moved into it.
    BlockInserted(BlockType),
    /// The palette opened.
    PaletteOpened,
    /// The palette closed without inserting (Escape).
    PaletteDismissed,
    /// A palette command was confirmed and its block inserted.
    Confirmed(&'static PaletteCommand),
    /// The palette selection moved.
    SelectionMoved,
    /// The key was suppressed or had no effect.
    Ignored,
}

/// Two-state controller over a screenplay buffer.
///
/// All transitions are synchronous and infallible: every key either
/// succeeds or is a no-op. The palette's open/closed flag is the whole of
/// the machine's state; everything else lives in the buffer.
#[derive(Debug, Clone)]
pub struct TransitionController {
    palette: CommandPalette,
    autoformat: AutoFormat,
}

impl TransitionController {
    /// Creates a controller with the standard auto-format rules.
    pub fn new() -> Self {
        Self::with_autoformat(AutoFormat::standard())
    }

    /// Creates a controller with an explicit auto-format engine.
    pub fn with_autoformat(autoformat: AutoFormat) -> Self {
        Self {
            palette: CommandPalette::new(),
            autoformat,
        }
    }

    /// Read access to the palette, for rendering.
    pub fn palette(&self) -> &CommandPalette {
        &self.palette
    }

    /// Handles one unmodified key press. `caret` is the current caret
    /// screen position, forwarded unchanged to the palette if this key
    /// opens it.
    pub fn handle_key(
        &mut self,
        buffer: &mut Screenplay,
        key: &KeyPress,
        caret: CaretAnchor,
    ) -> KeyOutcome {
        if self.palette.is_open() {
            self.handle_palette_key(buffer, key)
        } else {
            self.handle_editing_key(buffer, key, caret)
        }
    }

    /// Inserts pasted or programmatic text at the cursor. Auto-format
    /// fires only for single-character insertions; bulk content is never
    /// reclassified.
    pub fn insert_text(&mut self, buffer: &mut Screenplay, text: &str) -> KeyOutcome {
        if self.palette.is_open() || text.is_empty() {
            return KeyOutcome::Ignored;
        }
        let _ = buffer.insert_text(text);
        if text.chars().count() == 1 && !text.contains(['\n', '\t']) {
            if let Some(kind) = self.classify_current(buffer) {
                return KeyOutcome::Reclassified(kind);
            }
        }
        KeyOutcome::Inserted
    }

    /// Pointer click on a palette entry: identical to selecting it and
    /// confirming with Enter. No-op while the palette is closed.
    pub fn click_palette(&mut self, buffer: &mut Screenplay, index: usize) -> KeyOutcome {
        if !self.palette.is_open() {
            return KeyOutcome::Ignored;
        }
        self.palette.select(index);
        self.confirm_palette(buffer)
    }

    /// Toolbar toggle: retypes every block touched by the selection.
    /// Blocks already of `kind` toggle off to Paragraph; all others
    /// become `kind`. One undo step. Undefined while the palette is open,
    /// implemented as a no-op.
    pub fn toggle_block(&mut self, buffer: &mut Screenplay, kind: BlockType) -> KeyOutcome {
        if self.palette.is_open() {
            return KeyOutcome::Ignored;
        }
        let range = buffer.selection().block_range();
        buffer.begin_compound();
        for index in range {
            let current = buffer.blocks()[index].kind;
            let next = if current == kind {
                BlockType::Paragraph
            } else {
                kind
            };
            // set_block_kind only fails on a bad index; the range comes
            // from the buffer itself.
            let _ = buffer.set_block_kind(index, next);
        }
        buffer.end_compound();
        KeyOutcome::Reclassified(kind)
    }

    // ==================== Editing state ====================

    fn handle_editing_key(
        &mut self,
        buffer: &mut Screenplay,
        key: &KeyPress,
        caret: CaretAnchor,
    ) -> KeyOutcome {
        if key.modifiers.ctrl || key.modifiers.alt || key.modifiers.meta {
            // Chorded keys belong to the host surface, not this machine.
            return KeyOutcome::Ignored;
        }
        match key.key {
            Key::Char('/') => {
                // The slash lands in the buffer; closing the palette
                // removes exactly this character again.
                let _ = buffer.insert_text("/");
                self.palette.open(caret);
                debug!(x = caret.x, y = caret.y, "palette opened");
                KeyOutcome::PaletteOpened
            }
            Key::Char(c) => {
                let _ = buffer.insert_text(c.encode_utf8(&mut [0u8; 4]));
                if let Some(kind) = self.classify_current(buffer) {
                    return KeyOutcome::Reclassified(kind);
                }
                KeyOutcome::Inserted
            }
            Key::Enter => {
                if !buffer.selection_collapsed() {
                    return KeyOutcome::Ignored;
                }
                let kind = next_block_kind(buffer.current_block_kind());
                buffer.insert_block_at_cursor(kind);
                KeyOutcome::BlockInserted(kind)
            }
            Key::Tab => {
                // Unconditional: Tab always starts a Character cue.
                buffer.insert_block_at_cursor(BlockType::Character);
                KeyOutcome::BlockInserted(BlockType::Character)
            }
            Key::Backspace => {
                let _ = buffer.delete_backward(1);
                KeyOutcome::Deleted
            }
            Key::Delete => {
                let _ = buffer.delete_forward(1);
                KeyOutcome::Deleted
            }
            Key::Left => {
                buffer.move_left();
                KeyOutcome::Ignored
            }
            Key::Right => {
                buffer.move_right();
                KeyOutcome::Ignored
            }
            // Escape with the palette closed, vertical arrows: no-ops here;
            // vertical caret motion belongs to the host surface.
            Key::Escape | Key::Up | Key::Down => KeyOutcome::Ignored,
        }
    }

    // ==================== PaletteOpen state ====================

    fn handle_palette_key(&mut self, buffer: &mut Screenplay, key: &KeyPress) -> KeyOutcome {
        match key.key {
            Key::Down => {
                self.palette.move_selection(1);
                KeyOutcome::SelectionMoved
            }
            Key::Up => {
                self.palette.move_selection(-1);
                KeyOutcome::SelectionMoved
            }
            Key::Enter => self.confirm_palette(buffer),
            Key::Escape => {
                self.palette.close();
                // Remove the triggering slash; nothing is inserted.
                let _ = buffer.delete_backward(1);
                KeyOutcome::PaletteDismissed
            }
            // The palette owns input: everything else is swallowed.
            _ => KeyOutcome::Ignored,
        }
    }

    fn confirm_palette(&mut self, buffer: &mut Screenplay) -> KeyOutcome {
        let command = self.palette.confirm();
        debug!(id = command.id, "palette command confirmed");
        // Slash removal and block insertion form one undo step.
        buffer.begin_compound();
        let _ = buffer.delete_backward(1);
        buffer.insert_block_at_cursor(command.target);
        buffer.end_compound();
        KeyOutcome::Confirmed(command)
    }

    // ==================== Helpers ====================

    fn classify_current(&self, buffer: &mut Screenplay) -> Option<BlockType> {
        let kind = self
            .autoformat
            .classify(buffer.current_block_text(), buffer.current_block_kind())?;
        buffer.set_current_block_kind(kind);
        debug!(?kind, "block reclassified");
        Some(kind)
    }
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new()
    }
}

/// The Enter lookup table: which kind follows the current block. This is
/// a table keyed by kind, not a generic paragraph split.
fn next_block_kind(current: BlockType) -> BlockType {
    match current {
        BlockType::Character => BlockType::Dialogue,
        BlockType::SceneHeading => BlockType::Action,
        _ => BlockType::Action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenwright_buffer::{Block, Cursor};

    fn type_str(ctl: &mut TransitionController, buffer: &mut Screenplay, s: &str) {
        for c in s.chars() {
            ctl.handle_key(buffer, &KeyPress::ch(c), CaretAnchor::ZERO);
        }
    }

    fn press(ctl: &mut TransitionController, buffer: &mut Screenplay, key: Key) -> KeyOutcome {
        ctl.handle_key(buffer, &KeyPress::plain(key), CaretAnchor::ZERO)
    }

    #[test]
    fn test_typing_int_space_reclassifies_to_scene_heading() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        assert_eq!(buffer.current_block_kind(), BlockType::Action);

        type_str(&mut ctl, &mut buffer, "INT");
        assert_eq!(buffer.current_block_kind(), BlockType::Action);

        let outcome = ctl.handle_key(&mut buffer, &KeyPress::ch(' '), CaretAnchor::ZERO);
        assert_eq!(outcome, KeyOutcome::Reclassified(BlockType::SceneHeading));
        assert_eq!(buffer.current_block_kind(), BlockType::SceneHeading);
    }

    #[test]
    fn test_reclassification_fires_once_not_on_later_chars() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        type_str(&mut ctl, &mut buffer, "INT. ");
        let outcome = ctl.handle_key(&mut buffer, &KeyPress::ch('R'), CaretAnchor::ZERO);
        // Already a SceneHeading: the rule still matches but the match is
        // terminal and changes nothing.
        assert_eq!(outcome, KeyOutcome::Inserted);
        assert_eq!(buffer.current_block_kind(), BlockType::SceneHeading);
    }

    #[test]
    fn test_paste_never_triggers_autoformat() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        let outcome = ctl.insert_text(&mut buffer, "INT. ROOM - DAY");
        assert_eq!(outcome, KeyOutcome::Inserted);
        assert_eq!(buffer.current_block_kind(), BlockType::Action);
    }

    #[test]
    fn test_single_char_paste_classifies() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        ctl.insert_text(&mut buffer, "INT");
        let outcome = ctl.insert_text(&mut buffer, " ");
        assert_eq!(outcome, KeyOutcome::Reclassified(BlockType::SceneHeading));
    }

    #[test]
    fn test_enter_on_character_inserts_dialogue() {
        let mut ctl = TransitionController::new();
        let mut buffer =
            Screenplay::from_blocks(vec![Block::new(BlockType::Character, "WRITER")]);
        let outcome = press(&mut ctl, &mut buffer, Key::Enter);
        assert_eq!(outcome, KeyOutcome::BlockInserted(BlockType::Dialogue));
        assert_eq!(buffer.block_count(), 2);
        assert_eq!(buffer.blocks()[1].kind, BlockType::Dialogue);
        assert_eq!(buffer.blocks()[1].text, "");
        assert_eq!(buffer.cursor(), Cursor::new(1, 0));
    }

    #[test]
    fn test_enter_on_scene_heading_inserts_action() {
        let mut ctl = TransitionController::new();
        let mut buffer =
            Screenplay::from_blocks(vec![Block::new(BlockType::SceneHeading, "INT. ROOM")]);
        let outcome = press(&mut ctl, &mut buffer, Key::Enter);
        assert_eq!(outcome, KeyOutcome::BlockInserted(BlockType::Action));
    }

    #[test]
    fn test_enter_on_everything_else_inserts_action() {
        for kind in [
            BlockType::Paragraph,
            BlockType::Action,
            BlockType::Dialogue,
            BlockType::Parenthetical,
            BlockType::Transition,
        ] {
            let mut ctl = TransitionController::new();
            let mut buffer = Screenplay::from_blocks(vec![Block::new(kind, "x")]);
            let outcome = press(&mut ctl, &mut buffer, Key::Enter);
            assert_eq!(
                outcome,
                KeyOutcome::BlockInserted(BlockType::Action),
                "Enter after {kind:?}"
            );
        }
    }

    #[test]
    fn test_enter_with_selection_is_ignored() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::from_blocks(vec![Block::new(BlockType::Action, "abc")]);
        buffer.select(Cursor::new(0, 0), Cursor::new(0, 2)).unwrap();
        let outcome = press(&mut ctl, &mut buffer, Key::Enter);
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(buffer.block_count(), 1);
    }

    #[test]
    fn test_tab_always_inserts_character() {
        for kind in [BlockType::Action, BlockType::Dialogue, BlockType::Transition] {
            let mut ctl = TransitionController::new();
            let mut buffer = Screenplay::from_blocks(vec![Block::new(kind, "x")]);
            let outcome = press(&mut ctl, &mut buffer, Key::Tab);
            assert_eq!(outcome, KeyOutcome::BlockInserted(BlockType::Character));
            assert_eq!(buffer.blocks()[1].kind, BlockType::Character);
        }
    }

    #[test]
    fn test_escape_in_editing_is_noop() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        assert_eq!(press(&mut ctl, &mut buffer, Key::Escape), KeyOutcome::Ignored);
    }

    #[test]
    fn test_slash_opens_palette_and_inserts_slash() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        let anchor = CaretAnchor::new(120.0, 48.0);
        let outcome = ctl.handle_key(&mut buffer, &KeyPress::ch('/'), anchor);
        assert_eq!(outcome, KeyOutcome::PaletteOpened);
        assert!(ctl.palette().is_open());
        assert_eq!(ctl.palette().anchor(), Some(anchor));
        assert_eq!(ctl.palette().selected_index(), Some(0));
        assert_eq!(buffer.current_block_text(), "/");
    }

    #[test]
    fn test_palette_suppresses_ordinary_keys() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        let outcome = press(&mut ctl, &mut buffer, Key::Char('a'));
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(buffer.current_block_text(), "/");
        // Tab is also swallowed, not a Character insertion.
        assert_eq!(press(&mut ctl, &mut buffer, Key::Tab), KeyOutcome::Ignored);
        assert_eq!(buffer.block_count(), 1);
    }

    #[test]
    fn test_palette_arrows_cycle_selection() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        press(&mut ctl, &mut buffer, Key::Up);
        assert_eq!(
            ctl.palette().selected_index(),
            Some(crate::palette::CATALOG.len() - 1)
        );
        press(&mut ctl, &mut buffer, Key::Down);
        assert_eq!(ctl.palette().selected_index(), Some(0));
    }

    #[test]
    fn test_palette_confirm_removes_slash_and_inserts_block() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::from_blocks(vec![Block::new(BlockType::Action, "abc")]);
        buffer.move_to_block_end();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        assert_eq!(buffer.current_block_text(), "abc/");

        // Move to "character".
        let index = crate::palette::CATALOG
            .iter()
            .position(|c| c.id == "character")
            .unwrap();
        for _ in 0..index {
            press(&mut ctl, &mut buffer, Key::Down);
        }
        let outcome = press(&mut ctl, &mut buffer, Key::Enter);
        assert!(matches!(outcome, KeyOutcome::Confirmed(c) if c.id == "character"));
        assert!(!ctl.palette().is_open());
        assert_eq!(buffer.block_count(), 2);
        assert_eq!(buffer.blocks()[0].text, "abc");
        assert_eq!(buffer.blocks()[1].kind, BlockType::Character);
        assert_eq!(buffer.cursor(), Cursor::new(1, 0));
    }

    #[test]
    fn test_palette_confirm_dual_inserts_dialogue() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        let index = crate::palette::CATALOG
            .iter()
            .position(|c| c.id == "dual")
            .unwrap();
        let outcome = ctl.click_palette(&mut buffer, index);
        assert!(matches!(outcome, KeyOutcome::Confirmed(c) if c.target == BlockType::Dialogue));
        assert_eq!(buffer.blocks()[1].kind, BlockType::Dialogue);
    }

    #[test]
    fn test_palette_confirm_is_one_undo_step() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        press(&mut ctl, &mut buffer, Key::Enter);
        assert_eq!(buffer.block_count(), 2);
        buffer.undo().unwrap();
        assert_eq!(buffer.block_count(), 1);
        assert_eq!(buffer.current_block_text(), "/");
    }

    #[test]
    fn test_palette_escape_removes_slash_only() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::from_blocks(vec![Block::new(BlockType::Action, "ab")]);
        buffer.move_to_block_end();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        let outcome = press(&mut ctl, &mut buffer, Key::Escape);
        assert_eq!(outcome, KeyOutcome::PaletteDismissed);
        assert!(!ctl.palette().is_open());
        assert_eq!(buffer.block_count(), 1);
        assert_eq!(buffer.current_block_text(), "ab");
    }

    #[test]
    fn test_click_while_closed_is_ignored() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        assert_eq!(ctl.click_palette(&mut buffer, 0), KeyOutcome::Ignored);
    }

    #[test]
    fn test_toggle_block_retypes_and_toggles_off() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::from_blocks(vec![Block::new(BlockType::Action, "x")]);
        ctl.toggle_block(&mut buffer, BlockType::Character);
        assert_eq!(buffer.blocks()[0].kind, BlockType::Character);
        ctl.toggle_block(&mut buffer, BlockType::Character);
        assert_eq!(buffer.blocks()[0].kind, BlockType::Paragraph);
    }

    #[test]
    fn test_toggle_block_covers_selection() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::from_blocks(vec![
            Block::new(BlockType::Action, "one"),
            Block::new(BlockType::Dialogue, "two"),
            Block::new(BlockType::Transition, "three"),
        ]);
        buffer.select(Cursor::new(0, 1), Cursor::new(2, 1)).unwrap();
        ctl.toggle_block(&mut buffer, BlockType::Dialogue);
        assert_eq!(buffer.blocks()[0].kind, BlockType::Dialogue);
        // Already Dialogue: toggles off.
        assert_eq!(buffer.blocks()[1].kind, BlockType::Paragraph);
        assert_eq!(buffer.blocks()[2].kind, BlockType::Dialogue);
    }

    #[test]
    fn test_toggle_block_noop_while_palette_open() {
        let mut ctl = TransitionController::new();
        let mut buffer = Screenplay::new();
        press(&mut ctl, &mut buffer, Key::Char('/'));
        let outcome = ctl.toggle_block(&mut buffer, BlockType::Character);
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(buffer.blocks()[0].kind, BlockType::Action);
    }
}
