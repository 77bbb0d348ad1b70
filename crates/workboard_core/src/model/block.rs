//! Block domain model.
//!
//! # Responsibility
//! - Define the document unit rendered by the task editor.
//! - Keep per-type fields on the variant that owns them.
//!
//! # Invariants
//! - `id` is stable, never nil and never reassigned after creation.
//! - Type-specific fields exist only on their variant (`checked` only on
//!   checklist, `url` only on image, and so on).
//! - Numbered-list ordinals are never stored; they are derived from position.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one block inside a document.
pub type BlockId = Uuid;

/// Fieldless block discriminant used by catalogs and conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Text,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    Checklist,
    Quote,
    Callout,
    Code,
    Divider,
    Image,
    Task,
    Mention,
}

impl BlockType {
    /// All block types in catalog order.
    pub const ALL: [BlockType; 14] = [
        BlockType::Text,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::BulletList,
        BlockType::NumberedList,
        BlockType::Checklist,
        BlockType::Quote,
        BlockType::Callout,
        BlockType::Code,
        BlockType::Divider,
        BlockType::Image,
        BlockType::Task,
        BlockType::Mention,
    ];

    /// Wire name, identical to the serde tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Heading1 => "heading1",
            Self::Heading2 => "heading2",
            Self::Heading3 => "heading3",
            Self::BulletList => "bullet-list",
            Self::NumberedList => "numbered-list",
            Self::Checklist => "checklist",
            Self::Quote => "quote",
            Self::Callout => "callout",
            Self::Code => "code",
            Self::Divider => "divider",
            Self::Image => "image",
            Self::Task => "task",
            Self::Mention => "mention",
        }
    }

    /// Parses a wire name back into a block type.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
    }
}

/// Callout marker glyph.
///
/// Kept on the callout so the serialized form reproduces the same emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutIcon {
    #[default]
    Idea,
    Warning,
    Info,
    Success,
    Important,
    Pin,
    Hot,
}

impl CalloutIcon {
    pub const ALL: [CalloutIcon; 7] = [
        CalloutIcon::Idea,
        CalloutIcon::Warning,
        CalloutIcon::Info,
        CalloutIcon::Success,
        CalloutIcon::Important,
        CalloutIcon::Pin,
        CalloutIcon::Hot,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Idea => "💡",
            Self::Warning => "⚠️",
            Self::Info => "ℹ️",
            Self::Success => "✅",
            Self::Important => "❗",
            Self::Pin => "📌",
            Self::Hot => "🔥",
        }
    }

    /// Returns the icon whose glyph starts `text`, if any.
    pub fn leading(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|icon| text.starts_with(icon.glyph()))
    }

    /// Returns the icon whose glyph occurs first in `text`, if any.
    pub fn first_in(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter_map(|icon| text.find(icon.glyph()).map(|at| (at, icon)))
            .min_by_key(|(at, _)| *at)
            .map(|(_, icon)| icon)
    }
}

/// Type-specific payload of a block.
///
/// Serialized flat next to `id`, tagged by `type` to match the editor's
/// external JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    Text {
        content: String,
    },
    Heading1 {
        content: String,
    },
    Heading2 {
        content: String,
    },
    Heading3 {
        content: String,
    },
    BulletList {
        content: String,
    },
    NumberedList {
        content: String,
    },
    Checklist {
        content: String,
        checked: bool,
    },
    Quote {
        content: String,
    },
    Callout {
        content: String,
        #[serde(default)]
        icon: CalloutIcon,
    },
    Code {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    Divider,
    Image {
        /// Alt text.
        content: String,
        url: String,
    },
    Task {
        content: String,
        #[serde(rename = "taskId", default, skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
    },
    Mention {
        content: String,
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
}

impl BlockKind {
    /// Builds an empty payload for `kind`.
    pub fn empty(kind: BlockType) -> Self {
        Self::with_content(kind, String::new())
    }

    /// Builds a payload for `kind` carrying `content`.
    ///
    /// Optional references start unresolved, checklists start unchecked and
    /// dividers drop the content.
    pub fn with_content(kind: BlockType, content: impl Into<String>) -> Self {
        let content = content.into();
        match kind {
            BlockType::Text => Self::Text { content },
            BlockType::Heading1 => Self::Heading1 { content },
            BlockType::Heading2 => Self::Heading2 { content },
            BlockType::Heading3 => Self::Heading3 { content },
            BlockType::BulletList => Self::BulletList { content },
            BlockType::NumberedList => Self::NumberedList { content },
            BlockType::Checklist => Self::Checklist {
                content,
                checked: false,
            },
            BlockType::Quote => Self::Quote { content },
            BlockType::Callout => Self::Callout {
                content,
                icon: CalloutIcon::default(),
            },
            BlockType::Code => Self::Code {
                content,
                language: None,
            },
            BlockType::Divider => Self::Divider,
            BlockType::Image => Self::Image {
                content,
                url: String::new(),
            },
            BlockType::Task => Self::Task {
                content,
                task_id: None,
            },
            BlockType::Mention => Self::Mention {
                content,
                user_id: None,
            },
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Text { .. } => BlockType::Text,
            Self::Heading1 { .. } => BlockType::Heading1,
            Self::Heading2 { .. } => BlockType::Heading2,
            Self::Heading3 { .. } => BlockType::Heading3,
            Self::BulletList { .. } => BlockType::BulletList,
            Self::NumberedList { .. } => BlockType::NumberedList,
            Self::Checklist { .. } => BlockType::Checklist,
            Self::Quote { .. } => BlockType::Quote,
            Self::Callout { .. } => BlockType::Callout,
            Self::Code { .. } => BlockType::Code,
            Self::Divider => BlockType::Divider,
            Self::Image { .. } => BlockType::Image,
            Self::Task { .. } => BlockType::Task,
            Self::Mention { .. } => BlockType::Mention,
        }
    }

    /// Text content; empty for dividers.
    pub fn content(&self) -> &str {
        match self {
            Self::Divider => "",
            Self::Text { content }
            | Self::Heading1 { content }
            | Self::Heading2 { content }
            | Self::Heading3 { content }
            | Self::BulletList { content }
            | Self::NumberedList { content }
            | Self::Checklist { content, .. }
            | Self::Quote { content }
            | Self::Callout { content, .. }
            | Self::Code { content, .. }
            | Self::Image { content, .. }
            | Self::Task { content, .. }
            | Self::Mention { content, .. } => content,
        }
    }

    /// Mutable text content; `None` for dividers.
    pub fn content_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Divider => None,
            Self::Text { content }
            | Self::Heading1 { content }
            | Self::Heading2 { content }
            | Self::Heading3 { content }
            | Self::BulletList { content }
            | Self::NumberedList { content }
            | Self::Checklist { content, .. }
            | Self::Quote { content }
            | Self::Callout { content, .. }
            | Self::Code { content, .. }
            | Self::Image { content, .. }
            | Self::Task { content, .. }
            | Self::Mention { content, .. } => Some(content),
        }
    }
}

/// Block invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockValidationError {
    NilId,
}

impl Display for BlockValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "block id must not be nil"),
        }
    }
}

impl Error for BlockValidationError {}

/// One unit of an editor document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BlockRecord")]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Deserialize)]
struct BlockRecord {
    id: BlockId,
    #[serde(flatten)]
    kind: BlockKind,
}

impl TryFrom<BlockRecord> for Block {
    type Error = BlockValidationError;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        Self::with_id(record.id, record.kind)
    }
}

impl Block {
    /// Creates a block with a generated stable ID.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }

    /// Creates a block with a caller-provided ID.
    ///
    /// Used when a document is rehydrated from its JSON form.
    ///
    /// # Errors
    /// - [`BlockValidationError::NilId`] for `Uuid::nil()`.
    pub fn with_id(id: BlockId, kind: BlockKind) -> Result<Self, BlockValidationError> {
        if id.is_nil() {
            return Err(BlockValidationError::NilId);
        }
        Ok(Self { id, kind })
    }

    /// Creates an empty `text` block.
    pub fn empty_text() -> Self {
        Self::new(BlockKind::empty(BlockType::Text))
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn content(&self) -> &str {
        self.kind.content()
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockKind, BlockType, BlockValidationError, CalloutIcon};
    use uuid::Uuid;

    #[test]
    fn block_type_wire_names_round_trip() {
        for kind in BlockType::ALL {
            assert_eq!(BlockType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(BlockType::parse("heading4"), None);
    }

    #[test]
    fn with_content_matches_requested_type() {
        for kind in BlockType::ALL {
            assert_eq!(BlockKind::with_content(kind, "x").block_type(), kind);
        }
    }

    #[test]
    fn divider_drops_content() {
        let block = Block::new(BlockKind::with_content(BlockType::Divider, "ignored"));
        assert_eq!(block.content(), "");
    }

    #[test]
    fn callout_icon_detection() {
        assert_eq!(CalloutIcon::leading("⚠️ careful"), Some(CalloutIcon::Warning));
        assert_eq!(CalloutIcon::leading("careful ⚠️"), None);
        assert_eq!(
            CalloutIcon::first_in("note 📌 then 💡"),
            Some(CalloutIcon::Pin)
        );
        assert_eq!(CalloutIcon::first_in("plain"), None);
    }

    #[test]
    fn with_id_rejects_nil_id() {
        let err = Block::with_id(Uuid::nil(), BlockKind::Divider).unwrap_err();
        assert_eq!(err, BlockValidationError::NilId);
        assert_eq!(err.to_string(), "block id must not be nil");
    }
}
