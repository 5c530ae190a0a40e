//! The slash command palette: a modal selection state over a fixed
//! catalog of insertable block kinds.

use screenwright_buffer::BlockType;

use crate::input::CaretAnchor;

/// One entry in the palette catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteCommand {
    /// Stable identifier, also what fuzzy filtering would key on.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Shortcut hint shown next to the label.
    pub shortcut: &'static str,
    /// The block kind inserted on confirmation.
    pub target: BlockType,
}

/// The fixed, ordered catalog. Several ids collapse onto the same target
/// kind; the mapping is a plain table, nothing dynamic.
pub const CATALOG: &[PaletteCommand] = &[
    PaletteCommand {
        id: "scene",
        label: "Scene Heading",
        shortcut: "INT./EXT.",
        target: BlockType::SceneHeading,
    },
    PaletteCommand {
        id: "int",
        label: "Interior Scene",
        shortcut: "INT.",
        target: BlockType::SceneHeading,
    },
    PaletteCommand {
        id: "ext",
        label: "Exterior Scene",
        shortcut: "EXT.",
        target: BlockType::SceneHeading,
    },
    PaletteCommand {
        id: "action",
        label: "Action",
        shortcut: "A",
        target: BlockType::Action,
    },
    PaletteCommand {
        id: "character",
        label: "Character",
        shortcut: "C",
        target: BlockType::Character,
    },
    PaletteCommand {
        id: "dialogue",
        label: "Dialogue",
        shortcut: "D",
        target: BlockType::Dialogue,
    },
    PaletteCommand {
        id: "dual",
        label: "Dual Dialogue",
        shortcut: "DD",
        target: BlockType::Dialogue,
    },
    PaletteCommand {
        id: "parenthetical",
        label: "Parenthetical",
        shortcut: "(",
        target: BlockType::Parenthetical,
    },
    PaletteCommand {
        id: "transition",
        label: "Transition",
        shortcut: "T",
        target: BlockType::Transition,
    },
    PaletteCommand {
        id: "cut",
        label: "Cut To",
        shortcut: "CUT TO:",
        target: BlockType::Transition,
    },
    PaletteCommand {
        id: "fade",
        label: "Fade",
        shortcut: "FADE",
        target: BlockType::Transition,
    },
    PaletteCommand {
        id: "shot",
        label: "Shot",
        shortcut: "S",
        target: BlockType::Action,
    },
    PaletteCommand {
        id: "text",
        label: "Plain Text",
        shortcut: "",
        target: BlockType::Action,
    },
    PaletteCommand {
        id: "note",
        label: "Note",
        shortcut: "",
        target: BlockType::Action,
    },
    PaletteCommand {
        id: "montage",
        label: "Montage",
        shortcut: "",
        target: BlockType::Action,
    },
    PaletteCommand {
        id: "paragraph",
        label: "Paragraph",
        shortcut: "P",
        target: BlockType::Paragraph,
    },
];

/// Live palette state while open.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenState {
    anchor: CaretAnchor,
    selected: usize,
}

/// Modal selection state machine over [`CATALOG`].
///
/// The selection index is kept in range by euclidean modulo arithmetic,
/// so `move_selection` accepts any integer delta. Confirming while closed
/// is a contract violation and fails fast.
#[derive(Debug, Clone, Default)]
pub struct CommandPalette {
    open: Option<OpenState>,
}

impl CommandPalette {
    /// Creates a closed palette.
    pub fn new() -> Self {
        // The catalog is baked in and never empty; the modulo arithmetic
        // below relies on that.
        assert!(!CATALOG.is_empty(), "palette catalog must not be empty");
        Self { open: None }
    }

    /// Opens the palette at the given screen anchor, resetting the
    /// selection to the first entry. Reopening while already open just
    /// re-anchors and resets.
    pub fn open(&mut self, anchor: CaretAnchor) {
        self.open = Some(OpenState {
            anchor,
            selected: 0,
        });
    }

    /// Closes the palette, discarding its state.
    pub fn close(&mut self) {
        self.open = None;
    }

    /// Returns true while the palette is open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The anchor captured at open time, unchanged.
    pub fn anchor(&self) -> Option<CaretAnchor> {
        self.open.map(|s| s.anchor)
    }

    /// The currently selected index, while open.
    pub fn selected_index(&self) -> Option<usize> {
        self.open.map(|s| s.selected)
    }

    /// Moves the selection by `delta`, wrapping in both directions.
    /// No-op while closed.
    pub fn move_selection(&mut self, delta: isize) {
        if let Some(state) = &mut self.open {
            let n = CATALOG.len() as isize;
            let index = state.selected as isize;
            state.selected = (index + delta).rem_euclid(n) as usize;
        }
    }

    /// Selects an explicit index (pointer hover), wrapping like
    /// `move_selection`.
    pub fn select(&mut self, index: usize) {
        if let Some(state) = &mut self.open {
            state.selected = index % CATALOG.len();
        }
    }

    /// Returns the command under the selection and closes the palette.
    ///
    /// Contract: callable only while open; the transition controller
    /// enforces that, so a closed confirm is a programming error.
    pub fn confirm(&mut self) -> &'static PaletteCommand {
        let state = self
            .open
            .take()
            .expect("confirm called while the palette is closed");
        &CATALOG[state.selected]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_catalog_has_sixteen_entries() {
        assert_eq!(CATALOG.len(), 16);
    }

    #[test]
    fn test_dual_maps_to_dialogue() {
        let dual = CATALOG.iter().find(|c| c.id == "dual").unwrap();
        assert_eq!(dual.target, BlockType::Dialogue);
    }

    #[test]
    fn test_action_aliases() {
        for id in ["shot", "text", "note"] {
            let cmd = CATALOG.iter().find(|c| c.id == id).unwrap();
            assert_eq!(cmd.target, BlockType::Action, "{id} should map to Action");
        }
    }

    #[test]
    fn test_open_resets_selection() {
        let mut palette = CommandPalette::new();
        palette.open(CaretAnchor::ZERO);
        palette.move_selection(5);
        assert_eq!(palette.selected_index(), Some(5));
        palette.close();
        palette.open(CaretAnchor::new(10.0, 20.0));
        assert_eq!(palette.selected_index(), Some(0));
        assert_eq!(palette.anchor(), Some(CaretAnchor::new(10.0, 20.0)));
    }

    #[test]
    fn test_move_selection_wraps_backward() {
        let mut palette = CommandPalette::new();
        palette.open(CaretAnchor::ZERO);
        palette.move_selection(-1);
        assert_eq!(palette.selected_index(), Some(CATALOG.len() - 1));
    }

    #[test]
    fn test_move_selection_full_cycle_is_identity() {
        let mut palette = CommandPalette::new();
        palette.open(CaretAnchor::ZERO);
        palette.move_selection(CATALOG.len() as isize);
        assert_eq!(palette.selected_index(), Some(0));
    }

    #[test]
    fn test_confirm_returns_selected_and_closes() {
        let mut palette = CommandPalette::new();
        palette.open(CaretAnchor::ZERO);
        palette.move_selection(3);
        let cmd = palette.confirm();
        assert_eq!(cmd.id, CATALOG[3].id);
        assert!(!palette.is_open());
    }

    #[test]
    #[should_panic(expected = "palette is closed")]
    fn test_confirm_while_closed_panics() {
        let mut palette = CommandPalette::new();
        palette.confirm();
    }

    proptest! {
        #[test]
        fn prop_move_selection_stays_in_range(deltas in prop::collection::vec(-100isize..100, 0..64)) {
            let mut palette = CommandPalette::new();
            palette.open(CaretAnchor::ZERO);
            for delta in deltas {
                palette.move_selection(delta);
                let index = palette.selected_index().unwrap();
                prop_assert!(index < CATALOG.len());
            }
        }

        #[test]
        fn prop_delta_reduced_modulo_catalog_len(delta in -1000isize..1000) {
            let n = CATALOG.len() as isize;
            let mut a = CommandPalette::new();
            let mut b = CommandPalette::new();
            a.open(CaretAnchor::ZERO);
            b.open(CaretAnchor::ZERO);
            a.move_selection(delta);
            b.move_selection(delta.rem_euclid(n));
            prop_assert_eq!(a.selected_index(), b.selected_index());
        }
    }
}
