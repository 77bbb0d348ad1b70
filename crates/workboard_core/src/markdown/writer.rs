//! Markdown export for block documents.

use crate::model::block::{Block, BlockKind, BlockType};

/// Display ordinal of the numbered-list block at `index`.
///
/// Counts the contiguous run of `numbered-list` blocks immediately before
/// `index`, so reordering and insertion renumber without stored state.
pub fn numbered_ordinal(blocks: &[Block], index: usize) -> usize {
    let preceding = blocks.get(..index).unwrap_or(blocks);
    preceding
        .iter()
        .rev()
        .take_while(|block| block.block_type() == BlockType::NumberedList)
        .count()
        + 1
}

/// Renders one block as its markdown line group.
pub fn render_block(blocks: &[Block], index: usize) -> String {
    let Some(block) = blocks.get(index) else {
        return String::new();
    };
    match &block.kind {
        BlockKind::Text { content } => content.clone(),
        BlockKind::Heading1 { content } => format!("# {content}"),
        BlockKind::Heading2 { content } => format!("## {content}"),
        BlockKind::Heading3 { content } => format!("### {content}"),
        BlockKind::BulletList { content } => format!("- {content}"),
        BlockKind::NumberedList { content } => {
            format!("{}. {content}", numbered_ordinal(blocks, index))
        }
        BlockKind::Checklist { content, checked } => {
            let marker = if *checked { "x" } else { " " };
            format!("- [{marker}] {content}")
        }
        BlockKind::Quote { content } => format!("> {content}"),
        BlockKind::Callout { content, icon } => format!("> {} {content}", icon.glyph()),
        BlockKind::Code { content, language } => {
            let language = language.as_deref().unwrap_or_default();
            if content.is_empty() {
                format!("```{language}\n```")
            } else {
                format!("```{language}\n{content}\n```")
            }
        }
        BlockKind::Divider => "---".to_string(),
        BlockKind::Image { content, url } => {
            format!("![{}]({})", escape_label(content), escape_target(url))
        }
        BlockKind::Task { content, task_id } => format!(
            "[#{}](task:{})",
            escape_label(content),
            escape_target(task_id.as_deref().unwrap_or_default())
        ),
        BlockKind::Mention { content, user_id } => format!(
            "[@{}](mention:{})",
            escape_label(content),
            escape_target(user_id.as_deref().unwrap_or_default())
        ),
    }
}

/// Backslash-escapes `\` and `]` inside link text.
fn escape_label(value: &str) -> String {
    escape_with(value, |ch| matches!(ch, '\\' | ']'))
}

/// Backslash-escapes `\`, `)` and whitespace inside a link target.
fn escape_target(value: &str) -> String {
    escape_with(value, |ch| matches!(ch, '\\' | ')') || ch.is_whitespace())
}

fn escape_with(value: &str, needs_escape: impl Fn(char) -> bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if needs_escape(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Serializes an ordered block list, one line group per block.
pub fn serialize(blocks: &[Block]) -> String {
    (0..blocks.len())
        .map(|index| render_block(blocks, index))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{numbered_ordinal, serialize};
    use crate::model::block::{Block, BlockKind, BlockType};

    fn block(kind: BlockType, content: &str) -> Block {
        Block::new(BlockKind::with_content(kind, content))
    }

    #[test]
    fn numbered_ordinals_restart_after_interruption() {
        let blocks = vec![
            block(BlockType::NumberedList, "a"),
            block(BlockType::NumberedList, "b"),
            block(BlockType::Text, "break"),
            block(BlockType::NumberedList, "c"),
        ];
        assert_eq!(numbered_ordinal(&blocks, 0), 1);
        assert_eq!(numbered_ordinal(&blocks, 1), 2);
        assert_eq!(numbered_ordinal(&blocks, 3), 1);
        assert_eq!(serialize(&blocks), "1. a\n2. b\nbreak\n1. c");
    }

    #[test]
    fn code_block_renders_fence_with_language() {
        let blocks = vec![Block::new(BlockKind::Code {
            content: "x=1".to_string(),
            language: Some("py".to_string()),
        })];
        assert_eq!(serialize(&blocks), "```py\nx=1\n```");
    }

    #[test]
    fn unresolved_embeds_render_empty_reference() {
        let blocks = vec![block(BlockType::Task, "write docs")];
        assert_eq!(serialize(&blocks), "[#write docs](task:)");
    }

    #[test]
    fn link_text_and_targets_are_escaped() {
        let blocks = vec![
            Block::new(BlockKind::Task {
                content: "[P1] Fix login".to_string(),
                task_id: Some("t(1)".to_string()),
            }),
            Block::new(BlockKind::Image {
                content: "a\\b".to_string(),
                url: "https://x.test/my pic.png".to_string(),
            }),
        ];
        assert_eq!(
            serialize(&blocks),
            "[#[P1\\] Fix login](task:t(1\\))\n![a\\\\b](https://x.test/my\\ pic.png)"
        );
    }

    #[test]
    fn empty_list_serializes_to_empty_string() {
        assert_eq!(serialize(&[]), "");
    }
}
