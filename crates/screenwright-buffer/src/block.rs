//! Screenplay block model.

use serde::{Deserialize, Serialize};

/// The structural kind of a screenplay block.
///
/// `Paragraph` is the untyped default; every other variant is one of the
/// standard screenplay elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Paragraph,
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
}

impl BlockType {
    /// Returns a human-readable label, for listings and UI.
    pub fn label(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "Paragraph",
            BlockType::SceneHeading => "Scene Heading",
            BlockType::Action => "Action",
            BlockType::Character => "Character",
            BlockType::Dialogue => "Dialogue",
            BlockType::Parenthetical => "Parenthetical",
            BlockType::Transition => "Transition",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One structural unit of the screenplay: a kind plus a single plain-text
/// run. The text holds no block boundaries; newlines inside it are soft
/// line breaks that pagination splits on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockType,
    pub text: String,
}

impl Block {
    /// Creates a block with the given kind and text.
    pub fn new(kind: BlockType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Creates an empty block of the given kind.
    pub fn empty(kind: BlockType) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }

    /// Number of characters in the block's text.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Title-page metadata attached to a screenplay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlePage {
    pub title: String,
    pub author: String,
    pub contact: String,
    pub based_on: String,
}

impl TitlePage {
    /// True if there is nothing worth printing: a title page is emitted
    /// only when at least one of title/author is non-empty.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.author.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_default_is_paragraph() {
        assert_eq!(BlockType::default(), BlockType::Paragraph);
    }

    #[test]
    fn test_block_len_chars_counts_chars_not_bytes() {
        let block = Block::new(BlockType::Dialogue, "café");
        assert_eq!(block.len_chars(), 4);
        assert_eq!(block.text.len(), 5);
    }

    #[test]
    fn test_title_page_blank() {
        assert!(TitlePage::default().is_blank());
        let tp = TitlePage {
            author: "Jo March".to_string(),
            ..Default::default()
        };
        assert!(!tp.is_blank());
    }
}
