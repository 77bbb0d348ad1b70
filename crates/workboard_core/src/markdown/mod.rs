//! Markdown codec for block documents.
//!
//! # Responsibility
//! - Import markdown text as an ordered block list.
//! - Export block lists back to markdown.
//!
//! # Invariants
//! - `parse` never fails; unrecognized lines become `text` blocks verbatim.
//! - `parse` never returns an empty list.
//! - `serialize(parse(x))` is a fixed point after one normalization pass.
//! - Numbered-list ordinals are regenerated on export, never preserved.

mod scanner;
mod writer;

pub use scanner::{classify, BlockScanner, LineMatch, LineRule, LINE_RULES};
pub use writer::{numbered_ordinal, render_block, serialize};

use crate::model::block::Block;
use log::debug;

/// Parses markdown into blocks.
///
/// Empty or blank-only input yields a single empty `text` block.
pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = BlockScanner::new(text).collect::<Vec<_>>();
    if blocks.is_empty() {
        blocks.push(Block::empty_text());
    }
    debug!(
        "event=markdown_parse module=markdown status=ok lines={} blocks={}",
        text.lines().count(),
        blocks.len()
    );
    blocks
}

/// Re-renders markdown through one parse/serialize pass.
pub fn normalize(text: &str) -> String {
    serialize(&parse(text))
}
