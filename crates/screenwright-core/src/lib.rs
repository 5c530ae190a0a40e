//! # Screenwright Core
//!
//! Editor logic: the auto-format engine, the block transition
//! controller, the command palette and the editor facade tying them to
//! a screenplay buffer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                       Editor                         │
//! │  ┌────────────┐ ┌──────────────┐ ┌────────────────┐  │
//! │  │   Config   │ │  Event Bus   │ │  Caret Anchor  │  │
//! │  └────────────┘ └──────────────┘ └────────────────┘  │
//! │         │                                            │
//! │  ┌──────┴────────────────────────────────┐           │
//! │  │         Transition Controller         │           │
//! │  │  ┌─────────────┐  ┌────────────────┐  │           │
//! │  │  │ Auto-Format │  │ Command Palette│  │           │
//! │  │  └─────────────┘  └────────────────┘  │           │
//! │  └──────────────────┬────────────────────┘           │
//! │                 Screenplay                           │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod autoformat;
pub mod config;
pub mod editor;
pub mod event;
pub mod input;
pub mod palette;
pub mod transition;

pub use autoformat::{AutoFormat, AutoFormatRule};
pub use config::{Config, ConfigError};
pub use editor::Editor;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use input::{CaretAnchor, Key, KeyPress, Modifiers};
pub use palette::{CommandPalette, PaletteCommand, CATALOG};
pub use transition::{KeyOutcome, TransitionController};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid auto-format pattern `{pattern}`: {source}")]
    BadRule {
        pattern: String,
        source: regex::Error,
    },

    #[error("Buffer error: {0}")]
    Buffer(#[from] screenwright_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
