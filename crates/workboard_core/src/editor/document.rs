//! Editable block document.
//!
//! # Responsibility
//! - Own the ordered block list of one task description.
//! - Apply editor commands (insert, remove, convert, move, edit).
//!
//! # Invariants
//! - The block list is never empty.
//! - Block IDs are never changed by any operation.
//! - Converting a block keeps its text content.

use crate::editor::reference::{apply_reference, ReferenceMatch};
use crate::markdown;
use crate::model::block::{Block, BlockId, BlockKind, BlockType};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for document commands.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Document command error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// No block with this ID exists in the document.
    BlockNotFound(BlockId),
    /// The command does not apply to this block type.
    UnsupportedOperation {
        block_type: BlockType,
        operation: &'static str,
    },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlockNotFound(id) => write!(f, "block not found: {id}"),
            Self::UnsupportedOperation {
                block_type,
                operation,
            } => write!(
                f,
                "operation `{operation}` is not supported for `{}` blocks",
                block_type.as_str()
            ),
        }
    }
}

impl Error for DocumentError {}

/// Move direction for [`Document::move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Ordered, never-empty block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Block>", into = "Vec<Block>")]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Block>> for Document {
    type Error = &'static str;

    fn try_from(blocks: Vec<Block>) -> Result<Self, Self::Error> {
        if blocks.is_empty() {
            return Err("document must contain at least one block");
        }
        Ok(Self { blocks })
    }
}

impl From<Document> for Vec<Block> {
    fn from(value: Document) -> Self {
        value.blocks
    }
}

impl Document {
    /// Creates a document holding one empty text block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::empty_text()],
        }
    }

    /// Imports markdown; never fails.
    pub fn from_markdown(text: &str) -> Self {
        Self {
            blocks: markdown::parse(text),
        }
    }

    /// Exports the current blocks as markdown.
    pub fn to_markdown(&self) -> String {
        markdown::serialize(&self.blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    fn index_of(&self, id: BlockId) -> DocumentResult<usize> {
        self.position(id).ok_or(DocumentError::BlockNotFound(id))
    }

    fn block_mut(&mut self, id: BlockId) -> DocumentResult<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|block| block.id == id)
            .ok_or(DocumentError::BlockNotFound(id))
    }

    /// Display ordinal for the block at `index` when it is a numbered item.
    pub fn numbered_ordinal(&self, index: usize) -> Option<usize> {
        let block = self.blocks.get(index)?;
        (block.block_type() == BlockType::NumberedList)
            .then(|| markdown::numbered_ordinal(&self.blocks, index))
    }

    /// Inserts an empty block of `kind` right after `after`.
    pub fn insert_after(&mut self, after: BlockId, kind: BlockType) -> DocumentResult<BlockId> {
        let index = self.index_of(after)?;
        let block = Block::new(BlockKind::empty(kind));
        let id = block.id;
        self.blocks.insert(index + 1, block);
        debug!(
            "event=block_insert module=editor block_type={} index={}",
            kind.as_str(),
            index + 1
        );
        Ok(id)
    }

    /// Removes a block; removing the last one leaves a fresh empty text block.
    pub fn remove(&mut self, id: BlockId) -> DocumentResult<Block> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty_text());
        }
        Ok(removed)
    }

    /// Replaces the text content of a block.
    pub fn set_content(&mut self, id: BlockId, content: impl Into<String>) -> DocumentResult<()> {
        let block = self.block_mut(id)?;
        let block_type = block.block_type();
        let slot = block
            .kind
            .content_mut()
            .ok_or(DocumentError::UnsupportedOperation {
                block_type,
                operation: "set_content",
            })?;
        *slot = content.into();
        Ok(())
    }

    /// Changes the block type in place, keeping ID and content.
    ///
    /// Converting to the current type is a no-op, so type-specific fields
    /// survive a redundant slash command.
    pub fn convert(&mut self, id: BlockId, kind: BlockType) -> DocumentResult<()> {
        let block = self.block_mut(id)?;
        if block.block_type() == kind {
            return Ok(());
        }
        let from = block.block_type();
        block.kind = BlockKind::with_content(kind, block.content());
        debug!(
            "event=block_convert module=editor from={} to={}",
            from.as_str(),
            kind.as_str()
        );
        Ok(())
    }

    /// Flips the `checked` flag of a checklist block and returns the new value.
    pub fn toggle_checked(&mut self, id: BlockId) -> DocumentResult<bool> {
        let block = self.block_mut(id)?;
        match &mut block.kind {
            BlockKind::Checklist { checked, .. } => {
                *checked = !*checked;
                Ok(*checked)
            }
            other => Err(DocumentError::UnsupportedOperation {
                block_type: other.block_type(),
                operation: "toggle_checked",
            }),
        }
    }

    /// Sets the language tag of a code block.
    pub fn set_language(&mut self, id: BlockId, language: Option<String>) -> DocumentResult<()> {
        let block = self.block_mut(id)?;
        match &mut block.kind {
            BlockKind::Code { language: slot, .. } => {
                *slot = language.filter(|value| !value.trim().is_empty());
                Ok(())
            }
            other => Err(DocumentError::UnsupportedOperation {
                block_type: other.block_type(),
                operation: "set_language",
            }),
        }
    }

    /// Sets the source URL of an image block.
    pub fn set_image_url(&mut self, id: BlockId, url: impl Into<String>) -> DocumentResult<()> {
        let block = self.block_mut(id)?;
        match &mut block.kind {
            BlockKind::Image { url: slot, .. } => {
                *slot = url.into();
                Ok(())
            }
            other => Err(DocumentError::UnsupportedOperation {
                block_type: other.block_type(),
                operation: "set_image_url",
            }),
        }
    }

    /// Swaps a block with its neighbour; returns `false` at the edges.
    pub fn move_block(&mut self, id: BlockId, direction: MoveDirection) -> DocumentResult<bool> {
        let index = self.index_of(id)?;
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|next| *next < self.blocks.len()),
        };
        let Some(target) = target else {
            return Ok(false);
        };
        self.blocks.swap(index, target);
        Ok(true)
    }

    /// Commits a reference search result into a task or mention block.
    pub fn apply_reference(
        &mut self,
        id: BlockId,
        selected: &ReferenceMatch<'_>,
    ) -> DocumentResult<()> {
        let block = self.block_mut(id)?;
        if apply_reference(block, selected) {
            return Ok(());
        }
        Err(DocumentError::UnsupportedOperation {
            block_type: block.block_type(),
            operation: "apply_reference",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, DocumentError, MoveDirection};
    use crate::model::block::{BlockKind, BlockType};

    #[test]
    fn remove_last_block_keeps_document_non_empty() {
        let mut doc = Document::new();
        let only = doc.blocks()[0].id;
        doc.remove(only).expect("block should exist");
        assert_eq!(doc.len(), 1);
        assert_ne!(doc.blocks()[0].id, only);
        assert_eq!(doc.blocks()[0].block_type(), BlockType::Text);
    }

    #[test]
    fn convert_keeps_id_and_content() {
        let mut doc = Document::from_markdown("buy milk");
        let id = doc.blocks()[0].id;
        doc.convert(id, BlockType::Checklist).unwrap();
        assert_eq!(doc.blocks()[0].id, id);
        assert_eq!(
            doc.blocks()[0].kind,
            BlockKind::Checklist {
                content: "buy milk".to_string(),
                checked: false,
            }
        );
    }

    #[test]
    fn toggle_checked_rejects_other_types() {
        let mut doc = Document::from_markdown("# title");
        let id = doc.blocks()[0].id;
        let err = doc.toggle_checked(id).unwrap_err();
        assert_eq!(
            err,
            DocumentError::UnsupportedOperation {
                block_type: BlockType::Heading1,
                operation: "toggle_checked",
            }
        );
    }

    #[test]
    fn move_block_stops_at_edges() {
        let mut doc = Document::from_markdown("a\nb");
        let first = doc.blocks()[0].id;
        assert!(!doc.move_block(first, MoveDirection::Up).unwrap());
        assert!(doc.move_block(first, MoveDirection::Down).unwrap());
        assert_eq!(doc.position(first), Some(1));
        assert!(!doc.move_block(first, MoveDirection::Down).unwrap());
    }

    #[test]
    fn empty_document_json_is_rejected() {
        let err = serde_json::from_str::<Document>("[]").unwrap_err();
        assert!(err.to_string().contains("at least one block"));
    }
}
