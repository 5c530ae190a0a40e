//! Pattern-driven block reclassification.
//!
//! After every single-character insertion the engine inspects the full
//! text of the block under the cursor against an ordered rule list. The
//! first matching rule wins: if its target differs from the block's
//! current kind the block is retyped, and either way no lower-priority
//! rule is consulted. Multi-character insertions (paste) and control keys
//! never reach this engine, so bulk content is never reclassified.

use regex::Regex;
use screenwright_buffer::BlockType;

use crate::{CoreError, CoreResult};

/// One reclassification rule: a pattern and the kind it promotes to.
#[derive(Debug, Clone)]
pub struct AutoFormatRule {
    pattern: Regex,
    target: BlockType,
}

impl AutoFormatRule {
    /// Compiles a rule from a regex pattern. Patterns are matched against
    /// the block's full text; anchor with `^` for prefix rules.
    pub fn new(pattern: &str, target: BlockType) -> CoreResult<Self> {
        let pattern = Regex::new(pattern).map_err(|source| CoreError::BadRule {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern, target })
    }

    /// The kind this rule promotes matching blocks to.
    pub fn target(&self) -> BlockType {
        self.target
    }

    /// Returns true if the rule matches the given block text.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered first-match-wins rule list.
#[derive(Debug, Clone)]
pub struct AutoFormat {
    rules: Vec<AutoFormatRule>,
}

impl AutoFormat {
    /// The reference rule set: scene-heading and transition prefixes,
    /// case-insensitive, anchored at the start of the text.
    pub fn standard() -> Self {
        let rules = [
            (r"(?i)^INT[. ]", BlockType::SceneHeading),
            (r"(?i)^EXT[. ]", BlockType::SceneHeading),
            (r"(?i)^FADE ", BlockType::Transition),
            (r"(?i)^CUT ", BlockType::Transition),
            (r"(?i)^DISSOLVE ", BlockType::Transition),
        ]
        .into_iter()
        .map(|(pattern, target)| {
            AutoFormatRule::new(pattern, target)
                .unwrap_or_else(|_| unreachable!("standard rules always compile"))
        })
        .collect();
        Self { rules }
    }

    /// An engine with no rules; classification never fires.
    pub fn disabled() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates an engine from an explicit rule list.
    pub fn with_rules(rules: Vec<AutoFormatRule>) -> Self {
        Self { rules }
    }

    /// Appends a rule below the existing ones.
    pub fn push_rule(&mut self, rule: AutoFormatRule) {
        self.rules.push(rule);
    }

    /// Classifies the block text against the rule list.
    ///
    /// Returns `Some(kind)` when the first matching rule names a kind
    /// different from `current`; returns `None` when no rule matches or
    /// the first match already equals `current` (a same-kind match is
    /// terminal and does not retry lower rules).
    pub fn classify(&self, text: &str, current: BlockType) -> Option<BlockType> {
        let rule = self.rules.iter().find(|rule| rule.matches(text))?;
        (rule.target != current).then_some(rule.target)
    }
}

impl Default for AutoFormat {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_prefix_promotes_to_scene_heading() {
        let af = AutoFormat::standard();
        assert_eq!(
            af.classify("INT. ROOM - DAY", BlockType::Action),
            Some(BlockType::SceneHeading)
        );
        assert_eq!(
            af.classify("INT ", BlockType::Action),
            Some(BlockType::SceneHeading)
        );
    }

    #[test]
    fn test_prefix_requires_separator() {
        let af = AutoFormat::standard();
        // "INT" alone is not yet a scene heading; "INTERIOR" never is.
        assert_eq!(af.classify("INT", BlockType::Action), None);
        assert_eq!(af.classify("INTERIOR", BlockType::Action), None);
    }

    #[test]
    fn test_case_insensitive() {
        let af = AutoFormat::standard();
        assert_eq!(
            af.classify("ext. alley - night", BlockType::Paragraph),
            Some(BlockType::SceneHeading)
        );
        assert_eq!(
            af.classify("fade to black", BlockType::Action),
            Some(BlockType::Transition)
        );
    }

    #[test]
    fn test_transition_prefixes() {
        let af = AutoFormat::standard();
        assert_eq!(
            af.classify("CUT TO:", BlockType::Action),
            Some(BlockType::Transition)
        );
        assert_eq!(
            af.classify("DISSOLVE TO:", BlockType::Action),
            Some(BlockType::Transition)
        );
    }

    #[test]
    fn test_same_kind_match_is_terminal() {
        let af = AutoFormat::standard();
        // Already a scene heading: the INT rule matches but changes nothing,
        // and no lower rule is retried.
        assert_eq!(af.classify("INT. ROOM", BlockType::SceneHeading), None);
    }

    #[test]
    fn test_anchored_not_substring() {
        let af = AutoFormat::standard();
        assert_eq!(af.classify("THE INT. ROOM", BlockType::Action), None);
    }

    #[test]
    fn test_first_match_wins_over_later_rules() {
        // A custom list where two rules could match the same text.
        let rules = vec![
            AutoFormatRule::new(r"(?i)^FADE ", BlockType::Transition).unwrap(),
            AutoFormatRule::new(r"(?i)^FADE IN", BlockType::SceneHeading).unwrap(),
        ];
        let af = AutoFormat::with_rules(rules);
        assert_eq!(
            af.classify("FADE IN:", BlockType::Action),
            Some(BlockType::Transition)
        );
    }

    #[test]
    fn test_disabled_never_fires() {
        let af = AutoFormat::disabled();
        assert_eq!(af.classify("INT. ROOM", BlockType::Action), None);
    }

    #[test]
    fn test_bad_rule_reports_pattern() {
        let err = AutoFormatRule::new("(unclosed", BlockType::Action).unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }
}
