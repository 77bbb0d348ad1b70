//! Slash-command catalog and menu reducer.
//!
//! # Invariants
//! - The catalog is static and holds exactly one command per block type.
//! - An empty query lists the whole catalog in catalog order.

use crate::editor::{step_selection, NavKey};
use crate::model::block::BlockType;

/// Static descriptor for one insertable block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub id: BlockType,
    pub label: &'static str,
    /// Indonesian label.
    pub label_localized: &'static str,
    pub description: &'static str,
    /// Indonesian description.
    pub description_localized: &'static str,
    pub keywords: &'static [&'static str],
}

impl SlashCommand {
    /// Case-insensitive match against labels and keywords.
    ///
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
            || self.label_localized.to_lowercase().contains(needle)
            || self.keywords.iter().any(|keyword| keyword.contains(needle))
    }
}

const SLASH_COMMANDS: [SlashCommand; 14] = [
    SlashCommand {
        id: BlockType::Text,
        label: "Text",
        label_localized: "Teks",
        description: "Plain paragraph",
        description_localized: "Paragraf biasa",
        keywords: &["text", "paragraph", "plain"],
    },
    SlashCommand {
        id: BlockType::Heading1,
        label: "Heading 1",
        label_localized: "Judul 1",
        description: "Large section heading",
        description_localized: "Judul bagian besar",
        keywords: &["h1", "title", "heading"],
    },
    SlashCommand {
        id: BlockType::Heading2,
        label: "Heading 2",
        label_localized: "Judul 2",
        description: "Medium section heading",
        description_localized: "Judul bagian sedang",
        keywords: &["h2", "subtitle", "heading"],
    },
    SlashCommand {
        id: BlockType::Heading3,
        label: "Heading 3",
        label_localized: "Judul 3",
        description: "Small section heading",
        description_localized: "Judul bagian kecil",
        keywords: &["h3", "heading"],
    },
    SlashCommand {
        id: BlockType::BulletList,
        label: "Bulleted list",
        label_localized: "Daftar poin",
        description: "Simple bulleted list",
        description_localized: "Daftar poin sederhana",
        keywords: &["bullet", "ul", "list", "-"],
    },
    SlashCommand {
        id: BlockType::NumberedList,
        label: "Numbered list",
        label_localized: "Daftar bernomor",
        description: "List with automatic numbering",
        description_localized: "Daftar dengan penomoran otomatis",
        keywords: &["numbered", "ol", "list", "1."],
    },
    SlashCommand {
        id: BlockType::Checklist,
        label: "Checklist",
        label_localized: "Daftar centang",
        description: "Track items with checkboxes",
        description_localized: "Lacak item dengan kotak centang",
        keywords: &["todo", "check", "checkbox", "[]"],
    },
    SlashCommand {
        id: BlockType::Quote,
        label: "Quote",
        label_localized: "Kutipan",
        description: "Capture a quotation",
        description_localized: "Tulis kutipan",
        keywords: &["quote", "blockquote", ">"],
    },
    SlashCommand {
        id: BlockType::Callout,
        label: "Callout",
        label_localized: "Sorotan",
        description: "Make a note stand out",
        description_localized: "Tonjolkan catatan",
        keywords: &["callout", "note", "info", "warning"],
    },
    SlashCommand {
        id: BlockType::Code,
        label: "Code",
        label_localized: "Kode",
        description: "Code snippet with language",
        description_localized: "Potongan kode dengan bahasa",
        keywords: &["code", "snippet", "```"],
    },
    SlashCommand {
        id: BlockType::Divider,
        label: "Divider",
        label_localized: "Pembatas",
        description: "Visual separator",
        description_localized: "Pemisah visual",
        keywords: &["divider", "hr", "line", "---"],
    },
    SlashCommand {
        id: BlockType::Image,
        label: "Image",
        label_localized: "Gambar",
        description: "Embed an image by URL",
        description_localized: "Sisipkan gambar dari URL",
        keywords: &["image", "img", "picture", "photo"],
    },
    SlashCommand {
        id: BlockType::Task,
        label: "Task",
        label_localized: "Tugas",
        description: "Link an existing task",
        description_localized: "Tautkan tugas yang ada",
        keywords: &["task", "issue", "link"],
    },
    SlashCommand {
        id: BlockType::Mention,
        label: "Mention",
        label_localized: "Sebut",
        description: "Mention a team member",
        description_localized: "Sebut anggota tim",
        keywords: &["mention", "user", "member", "@"],
    },
];

/// Returns the full catalog in display order.
pub fn slash_commands() -> &'static [SlashCommand] {
    &SLASH_COMMANDS
}

/// Looks up the catalog entry for `kind`.
pub fn command_for(kind: BlockType) -> Option<&'static SlashCommand> {
    SLASH_COMMANDS.iter().find(|command| command.id == kind)
}

/// Filters the catalog by `query`.
pub fn filter_commands(query: &str) -> Vec<&'static SlashCommand> {
    let needle = query.trim().to_lowercase();
    SLASH_COMMANDS
        .iter()
        .filter(|command| needle.is_empty() || command.matches(&needle))
        .collect()
}

/// Result of one key press in the slash menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashOutcome {
    Moved(usize),
    Chosen(BlockType),
    Dismissed,
    Ignored,
}

/// Selection state of the open slash menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashMenu {
    query: String,
    selected: usize,
    open: bool,
}

impl SlashMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the menu with an empty query.
    pub fn open(&mut self) {
        self.query.clear();
        self.selected = 0;
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Replaces the filter text and resets the cursor.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selected = 0;
    }

    pub fn matches(&self) -> Vec<&'static SlashCommand> {
        filter_commands(&self.query)
    }

    pub fn handle_key(&mut self, key: NavKey) -> SlashOutcome {
        if !self.open {
            return SlashOutcome::Ignored;
        }
        let matches = self.matches();
        match key {
            NavKey::Up | NavKey::Down => {
                self.selected = step_selection(self.selected, key, matches.len());
                SlashOutcome::Moved(self.selected)
            }
            NavKey::Enter => {
                let index = step_selection(self.selected, key, matches.len());
                match matches.get(index) {
                    Some(command) => {
                        self.open = false;
                        SlashOutcome::Chosen(command.id)
                    }
                    None => SlashOutcome::Ignored,
                }
            }
            NavKey::Escape => {
                self.open = false;
                SlashOutcome::Dismissed
            }
        }
    }
}
