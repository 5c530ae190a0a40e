//! Main editor orchestration.
//!
//! `Editor` is the one surface a host embeds: it owns the screenplay
//! buffer, the transition controller, the configuration and the event
//! bus, and translates key presses and pointer actions into buffer
//! mutations plus broadcast events.

use std::time::Duration;

use screenwright_buffer::{Block, BlockType, Cursor, History, Screenplay, Selection, TitlePage};

use crate::autoformat::{AutoFormat, AutoFormatRule};
use crate::config::Config;
use crate::event::{EditorEvent, EventBus};
use crate::input::{CaretAnchor, Key, KeyPress, Modifiers};
use crate::palette::CommandPalette;
use crate::transition::{KeyOutcome, TransitionController};
use crate::CoreResult;

/// The main editor state. Owned by a single thread; background work
/// observes it through the event bus.
pub struct Editor {
    screenplay: Screenplay,
    controller: TransitionController,
    config: Config,
    event_bus: EventBus,

    /// Screenplay title, used for exports and persistence.
    title: String,
    title_page: TitlePage,

    /// Latest caret screen position reported by the rendering surface.
    /// Forwarded to the palette when it opens.
    caret_anchor: CaretAnchor,
}

impl Editor {
    /// Creates an editor over an empty screenplay with default config.
    pub fn new() -> Self {
        let config = Config::default();
        Self {
            screenplay: build_screenplay(&config, Vec::new()),
            controller: TransitionController::new(),
            config,
            event_bus: EventBus::new(),
            title: String::from("Untitled"),
            title_page: TitlePage::default(),
            caret_anchor: CaretAnchor::ZERO,
        }
    }

    /// Creates an editor with explicit configuration. Fails only if a
    /// custom auto-format rule has a bad pattern.
    pub fn with_config(config: Config) -> CoreResult<Self> {
        let autoformat = build_autoformat(&config)?;
        Ok(Self {
            screenplay: build_screenplay(&config, Vec::new()),
            controller: TransitionController::with_autoformat(autoformat),
            config,
            event_bus: EventBus::new(),
            title: String::from("Untitled"),
            title_page: TitlePage::default(),
            caret_anchor: CaretAnchor::ZERO,
        })
    }

    /// Replaces the buffer content, e.g. after loading from a store.
    /// Clears history and resets the caret to the first block.
    pub fn load(&mut self, title: String, title_page: TitlePage, blocks: Vec<Block>) {
        self.title = title;
        self.title_page = title_page;
        self.screenplay = build_screenplay(&self.config, blocks);
        self.emit(EditorEvent::ScreenplayChanged);
        self.emit(EditorEvent::CursorMoved);
    }

    // ==================== Accessors ====================

    pub fn screenplay(&self) -> &Screenplay {
        &self.screenplay
    }

    pub fn blocks(&self) -> &[Block] {
        self.screenplay.blocks()
    }

    /// Owned copy of the block sequence, for export and persistence.
    pub fn snapshot(&self) -> Vec<Block> {
        self.screenplay.snapshot()
    }

    pub fn cursor(&self) -> Cursor {
        self.screenplay.cursor()
    }

    pub fn selection(&self) -> Selection {
        self.screenplay.selection()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn title_page(&self) -> &TitlePage {
        &self.title_page
    }

    pub fn title_page_mut(&mut self) -> &mut TitlePage {
        &mut self.title_page
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn palette(&self) -> &CommandPalette {
        self.controller.palette()
    }

    pub fn is_modified(&self) -> bool {
        self.screenplay.is_modified()
    }

    /// Marks the buffer clean after a successful save.
    pub fn mark_saved(&mut self) {
        self.screenplay.mark_saved();
        self.emit(EditorEvent::Saved);
    }

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    /// The rendering surface reports where the caret sits on screen.
    pub fn set_caret_anchor(&mut self, anchor: CaretAnchor) {
        self.caret_anchor = anchor;
    }

    // ==================== Input ====================

    /// Routes one key press. Chorded editor shortcuts (undo/redo,
    /// select-all) are resolved here; everything else goes through the
    /// transition controller. While the palette is open it owns input,
    /// so chords are suppressed: undoing under an open palette would
    /// leave Escape's slash removal pointing at stale text.
    pub fn handle_key(&mut self, key: KeyPress) {
        if key.modifiers == Modifiers::CTRL && !self.controller.palette().is_open() {
            match key.key {
                Key::Char('z') => {
                    self.undo();
                    return;
                }
                Key::Char('y') => {
                    self.redo();
                    return;
                }
                Key::Char('a') => {
                    self.screenplay.select_all();
                    self.emit(EditorEvent::SelectionChanged);
                    return;
                }
                _ => {}
            }
        }

        let outcome = self
            .controller
            .handle_key(&mut self.screenplay, &key, self.caret_anchor);
        self.emit_outcome(outcome);
    }

    /// Inserts pasted text at the cursor.
    pub fn paste(&mut self, text: &str) {
        let outcome = self.controller.insert_text(&mut self.screenplay, text);
        self.emit_outcome(outcome);
    }

    /// Pointer click on the palette entry at `index`.
    pub fn click_palette(&mut self, index: usize) {
        let outcome = self.controller.click_palette(&mut self.screenplay, index);
        self.emit_outcome(outcome);
    }

    /// Toolbar block-type toggle over the current selection.
    pub fn toggle_block(&mut self, kind: BlockType) {
        let outcome = self.controller.toggle_block(&mut self.screenplay, kind);
        self.emit_outcome(outcome);
    }

    /// Moves the cursor to a pointer position, clamping to the buffer.
    pub fn click_at(&mut self, block: usize, offset: usize) {
        let block = block.min(self.screenplay.block_count() - 1);
        let offset = offset.min(self.screenplay.blocks()[block].len_chars());
        // Both coordinates are clamped, the move cannot fail.
        let _ = self.screenplay.move_cursor_to(Cursor::new(block, offset));
        self.emit(EditorEvent::CursorMoved);
    }

    /// Replaces the selection.
    pub fn select(&mut self, start: Cursor, end: Cursor) -> CoreResult<()> {
        self.screenplay.select(start, end)?;
        self.emit(EditorEvent::SelectionChanged);
        Ok(())
    }

    pub fn undo(&mut self) {
        if self.screenplay.undo().is_ok() {
            self.emit(EditorEvent::ScreenplayChanged);
            self.emit(EditorEvent::CursorMoved);
        }
    }

    pub fn redo(&mut self) {
        if self.screenplay.redo().is_ok() {
            self.emit(EditorEvent::ScreenplayChanged);
            self.emit(EditorEvent::CursorMoved);
        }
    }

    // ==================== Internals ====================

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }

    fn emit_outcome(&self, outcome: KeyOutcome) {
        match outcome {
            KeyOutcome::Inserted | KeyOutcome::Deleted => {
                self.emit(EditorEvent::ScreenplayChanged);
                self.emit(EditorEvent::CursorMoved);
            }
            KeyOutcome::Reclassified(kind) => {
                self.emit(EditorEvent::ScreenplayChanged);
                self.emit(EditorEvent::BlockRetyped(kind));
            }
            KeyOutcome::BlockInserted(kind) => {
                self.emit(EditorEvent::ScreenplayChanged);
                self.emit(EditorEvent::BlockInserted(kind));
                self.emit(EditorEvent::CursorMoved);
            }
            KeyOutcome::PaletteOpened => self.emit(EditorEvent::PaletteOpened),
            KeyOutcome::PaletteDismissed => {
                self.emit(EditorEvent::ScreenplayChanged);
                self.emit(EditorEvent::PaletteDismissed);
            }
            KeyOutcome::Confirmed(command) => {
                self.emit(EditorEvent::ScreenplayChanged);
                self.emit(EditorEvent::PaletteConfirmed(command));
                self.emit(EditorEvent::BlockInserted(command.target));
                self.emit(EditorEvent::CursorMoved);
            }
            KeyOutcome::SelectionMoved | KeyOutcome::Ignored => {}
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a screenplay whose history honors the configured undo depth
/// and coalesce window.
fn build_screenplay(config: &Config, blocks: Vec<Block>) -> Screenplay {
    let history = History::new(config.editor.undo_limit)
        .with_coalesce_window(Duration::from_millis(config.editor.undo_coalesce_ms));
    Screenplay::from_blocks_with_history(blocks, history)
}

/// Builds the auto-format engine dictated by config: the standard rule
/// set plus any user rules, or a disabled engine.
fn build_autoformat(config: &Config) -> CoreResult<AutoFormat> {
    if !config.autoformat.enabled {
        return Ok(AutoFormat::disabled());
    }
    let mut engine = AutoFormat::standard();
    for rule in &config.autoformat.extra_rules {
        engine.push_rule(AutoFormatRule::new(&rule.pattern, rule.target)?);
    }
    Ok(engine)
}
