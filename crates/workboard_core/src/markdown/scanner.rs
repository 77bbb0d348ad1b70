//! Line scanner and ordered rule table for markdown import.
//!
//! # Invariants
//! - Rules are tried in `LINE_RULES` order; the first match wins.
//! - `LineRule::Text` matches every line, so classification is total.
//! - An unterminated code fence consumes the rest of the input.

use crate::model::block::{Block, BlockKind, BlockType, CalloutIcon};
use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";

static DIVIDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-{3,}$").expect("valid divider regex"));
static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. ").expect("valid numbered regex"));
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^!\[((?:\\.|[^\\\]])*)\]\(((?:\\.|[^\\)])*)\)$").expect("valid image regex")
});
static TASK_EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[#((?:\\.|[^\\\]])*)\]\(task:((?:\\.|[^\\)\s])*)\)$")
        .expect("valid task regex")
});
static MENTION_EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[@((?:\\.|[^\\\]])*)\]\(mention:((?:\\.|[^\\)\s])*)\)$")
        .expect("valid mention regex")
});

/// One line-level recognition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    CodeFence,
    Divider,
    Heading,
    Checklist,
    Bullet,
    Numbered,
    Quote,
    Callout,
    Blank,
    Image,
    Embed,
    Text,
}

/// Rule precedence. Checklist precedes bullet because it is a specialization
/// of the same `- ` prefix.
pub const LINE_RULES: [LineRule; 12] = [
    LineRule::CodeFence,
    LineRule::Divider,
    LineRule::Heading,
    LineRule::Checklist,
    LineRule::Bullet,
    LineRule::Numbered,
    LineRule::Quote,
    LineRule::Callout,
    LineRule::Blank,
    LineRule::Image,
    LineRule::Embed,
    LineRule::Text,
];

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    /// Opens a fenced code block with an optional language tag.
    OpenFence { language: Option<String> },
    /// Produces exactly one block.
    Block(BlockKind),
    /// Produces nothing.
    Skip,
}

impl LineRule {
    /// Tests this rule against `line`.
    pub fn apply(self, line: &str) -> Option<LineMatch> {
        match self {
            Self::CodeFence => line.strip_prefix(FENCE).map(|rest| {
                let language = rest.trim();
                LineMatch::OpenFence {
                    language: (!language.is_empty()).then(|| language.to_string()),
                }
            }),
            Self::Divider => DIVIDER_RE
                .is_match(line.trim())
                .then_some(LineMatch::Block(BlockKind::Divider)),
            Self::Heading => [
                ("### ", BlockType::Heading3),
                ("## ", BlockType::Heading2),
                ("# ", BlockType::Heading1),
            ]
            .into_iter()
            .find_map(|(prefix, kind)| {
                line.strip_prefix(prefix)
                    .map(|rest| LineMatch::Block(BlockKind::with_content(kind, rest)))
            }),
            Self::Checklist => [("- [ ] ", false), ("- [x] ", true)]
                .into_iter()
                .find_map(|(prefix, checked)| {
                    line.strip_prefix(prefix).map(|rest| {
                        LineMatch::Block(BlockKind::Checklist {
                            content: rest.to_string(),
                            checked,
                        })
                    })
                }),
            Self::Bullet => line
                .strip_prefix("- ")
                .map(|rest| LineMatch::Block(BlockKind::with_content(BlockType::BulletList, rest))),
            Self::Numbered => NUMBERED_RE.find(line).map(|marker| {
                LineMatch::Block(BlockKind::with_content(
                    BlockType::NumberedList,
                    &line[marker.end()..],
                ))
            }),
            Self::Quote => line
                .strip_prefix("> ")
                .filter(|rest| CalloutIcon::first_in(rest).is_none())
                .map(|rest| LineMatch::Block(BlockKind::with_content(BlockType::Quote, rest))),
            Self::Callout => {
                let rest = line.strip_prefix("> ")?;
                if let Some(icon) = CalloutIcon::leading(rest) {
                    let body = &rest[icon.glyph().len()..];
                    let body = body.strip_prefix(' ').unwrap_or(body);
                    return Some(LineMatch::Block(BlockKind::Callout {
                        content: body.to_string(),
                        icon,
                    }));
                }
                CalloutIcon::first_in(rest).map(|icon| {
                    LineMatch::Block(BlockKind::Callout {
                        content: rest.to_string(),
                        icon,
                    })
                })
            }
            Self::Blank => line.trim().is_empty().then_some(LineMatch::Skip),
            Self::Image => IMAGE_RE.captures(line).map(|caps| {
                LineMatch::Block(BlockKind::Image {
                    content: unescape(&caps[1]),
                    url: unescape(&caps[2]),
                })
            }),
            Self::Embed => {
                if let Some(caps) = TASK_EMBED_RE.captures(line) {
                    return Some(LineMatch::Block(BlockKind::Task {
                        content: unescape(&caps[1]),
                        task_id: non_empty(&caps[2]),
                    }));
                }
                MENTION_EMBED_RE.captures(line).map(|caps| {
                    LineMatch::Block(BlockKind::Mention {
                        content: unescape(&caps[1]),
                        user_id: non_empty(&caps[2]),
                    })
                })
            }
            Self::Text => Some(LineMatch::Block(BlockKind::with_content(
                BlockType::Text,
                line,
            ))),
        }
    }
}

/// Classifies `line` against the ordered rule table.
pub fn classify(line: &str) -> (LineRule, LineMatch) {
    LINE_RULES
        .iter()
        .find_map(|rule| rule.apply(line).map(|found| (*rule, found)))
        .unwrap_or_else(|| {
            (
                LineRule::Text,
                LineMatch::Block(BlockKind::with_content(BlockType::Text, line)),
            )
        })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| unescape(value))
}

/// Drops each escaping backslash and keeps the character it protects.
fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => unescaped.extend(chars.next()),
            other => unescaped.push(other),
        }
    }
    unescaped
}

/// Explicit-state line scanner producing blocks lazily.
///
/// The scanner is finite and can be restarted with [`BlockScanner::reset`];
/// each pass mints fresh block IDs.
#[derive(Debug, Clone)]
pub struct BlockScanner<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
}

impl<'a> BlockScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            cursor: 0,
        }
    }

    /// Rewinds to the first line.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Index of the next unread line.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of unread lines.
    pub fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.cursor)
    }

    fn read_fence(&mut self, language: Option<String>) -> BlockKind {
        let mut body = Vec::new();
        while let Some(line) = self.lines.get(self.cursor) {
            self.cursor += 1;
            if line.starts_with(FENCE) {
                break;
            }
            body.push(*line);
        }
        BlockKind::Code {
            content: body.join("\n"),
            language,
        }
    }
}

impl Iterator for BlockScanner<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = *self.lines.get(self.cursor)?;
            self.cursor += 1;
            match classify(line).1 {
                LineMatch::Skip => continue,
                LineMatch::Block(kind) => return Some(Block::new(kind)),
                LineMatch::OpenFence { language } => {
                    return Some(Block::new(self.read_fence(language)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, BlockScanner, LineMatch, LineRule};
    use crate::model::block::{BlockKind, BlockType, CalloutIcon};

    #[test]
    fn rule_precedence_checklist_before_bullet() {
        let (rule, _) = classify("- [ ] todo");
        assert_eq!(rule, LineRule::Checklist);
        let (rule, _) = classify("- todo");
        assert_eq!(rule, LineRule::Bullet);
    }

    #[test]
    fn headings_match_longest_prefix_first() {
        let (_, found) = classify("### deep");
        assert_eq!(
            found,
            LineMatch::Block(BlockKind::with_content(BlockType::Heading3, "deep"))
        );
        let (rule, _) = classify("#### too deep");
        assert_eq!(rule, LineRule::Text);
    }

    #[test]
    fn divider_requires_only_hyphens() {
        assert_eq!(classify("-----").0, LineRule::Divider);
        assert_eq!(classify("--").0, LineRule::Text);
        assert_eq!(classify("--- x").0, LineRule::Text);
    }

    #[test]
    fn quote_and_callout_split_on_marker_glyph() {
        assert_eq!(classify("> plain").0, LineRule::Quote);
        let (rule, found) = classify("> 💡 try this");
        assert_eq!(rule, LineRule::Callout);
        assert_eq!(
            found,
            LineMatch::Block(BlockKind::Callout {
                content: "try this".to_string(),
                icon: CalloutIcon::Idea,
            })
        );
    }

    #[test]
    fn callout_with_inner_glyph_keeps_full_text() {
        let (_, found) = classify("> mind the ⚠️ step");
        assert_eq!(
            found,
            LineMatch::Block(BlockKind::Callout {
                content: "mind the ⚠️ step".to_string(),
                icon: CalloutIcon::Warning,
            })
        );
    }

    #[test]
    fn escaped_link_text_is_unescaped() {
        let (_, found) = classify(r"[#[P1\] Fix login](task:t(1\))");
        assert_eq!(
            found,
            LineMatch::Block(BlockKind::Task {
                content: "[P1] Fix login".to_string(),
                task_id: Some("t(1)".to_string()),
            })
        );
        let (_, found) = classify(r"![a\\b](https://x.test/my\ pic.png)");
        assert_eq!(
            found,
            LineMatch::Block(BlockKind::Image {
                content: r"a\b".to_string(),
                url: "https://x.test/my pic.png".to_string(),
            })
        );
        assert_eq!(classify("[#a]b](task:t1)").0, LineRule::Text);
    }

    #[test]
    fn whitespace_line_is_blank() {
        assert_eq!(classify("   \t").1, LineMatch::Skip);
    }

    #[test]
    fn unterminated_fence_consumes_rest() {
        let blocks = BlockScanner::new("```\na\n\nb").collect::<Vec<_>>();
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].kind,
            BlockKind::Code {
                content: "a\n\nb".to_string(),
                language: None,
            }
        );
    }

    #[test]
    fn scanner_is_restartable() {
        let mut scanner = BlockScanner::new("# a\n- b");
        assert_eq!(scanner.by_ref().count(), 2);
        assert_eq!(scanner.remaining(), 0);
        scanner.reset();
        assert_eq!(scanner.position(), 0);
        let kinds = scanner.map(|block| block.block_type()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![BlockType::Heading1, BlockType::BulletList]);
    }
}
