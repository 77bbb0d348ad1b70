//! Inline task/member reference search for embed blocks.
//!
//! # Responsibility
//! - Filter already-loaded task and member collections by block content.
//! - Commit a chosen match into a `task` or `mention` block.
//!
//! # Invariants
//! - Matching is a case-insensitive substring test in source order.
//! - At most `MAX_REFERENCE_MATCHES` results are returned.
//! - Escape never mutates the block.

use crate::editor::{step_selection, NavKey};
use crate::model::block::{Block, BlockKind};
use log::debug;
use serde::{Deserialize, Serialize};

/// Result cap for one reference query.
pub const MAX_REFERENCE_MATCHES: usize = 5;

/// Task entry supplied by the task collection provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    pub text: String,
}

/// Team member entry supplied by the member collection provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub uid: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Borrowed view over both reference collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceDirectory<'a> {
    pub tasks: &'a [TaskRef],
    pub members: &'a [MemberRef],
}

/// One selectable search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMatch<'a> {
    Task(&'a TaskRef),
    Member(&'a MemberRef),
}

impl ReferenceMatch<'_> {
    pub fn id(&self) -> &str {
        match self {
            Self::Task(task) => &task.id,
            Self::Member(member) => &member.uid,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Task(task) => &task.text,
            Self::Member(member) => &member.display_name,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Returns up to five tasks whose text contains `query`.
pub fn search_tasks<'a>(tasks: &'a [TaskRef], query: &str) -> Vec<&'a TaskRef> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| contains_ignore_case(&task.text, &needle))
        .take(MAX_REFERENCE_MATCHES)
        .collect()
}

/// Returns up to five members whose display name contains `query`.
pub fn search_members<'a>(members: &'a [MemberRef], query: &str) -> Vec<&'a MemberRef> {
    let needle = query.to_lowercase();
    members
        .iter()
        .filter(|member| contains_ignore_case(&member.display_name, &needle))
        .take(MAX_REFERENCE_MATCHES)
        .collect()
}

/// Matches for `block` against `directory`.
///
/// Empty unless the block is a `task` or `mention` with non-empty content.
pub fn reference_matches<'a>(
    block: &Block,
    directory: &ReferenceDirectory<'a>,
) -> Vec<ReferenceMatch<'a>> {
    match &block.kind {
        BlockKind::Task { content, .. } if !content.is_empty() => {
            search_tasks(directory.tasks, content)
                .into_iter()
                .map(ReferenceMatch::Task)
                .collect()
        }
        BlockKind::Mention { content, .. } if !content.is_empty() => {
            search_members(directory.members, content)
                .into_iter()
                .map(ReferenceMatch::Member)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Writes `selected` into `block`.
///
/// Returns `false` and leaves the block untouched when the match kind does
/// not fit the block type.
pub fn apply_reference(block: &mut Block, selected: &ReferenceMatch<'_>) -> bool {
    match (&mut block.kind, selected) {
        (BlockKind::Task { content, task_id }, ReferenceMatch::Task(task)) => {
            *task_id = Some(task.id.clone());
            *content = task.text.clone();
            true
        }
        (BlockKind::Mention { content, user_id }, ReferenceMatch::Member(member)) => {
            *user_id = Some(member.uid.clone());
            *content = member.display_name.clone();
            true
        }
        _ => false,
    }
}

/// Result of one key press in the reference overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKeyOutcome {
    /// Cursor moved to the given index.
    Moved(usize),
    /// Match committed; carries the referenced ID.
    Committed(String),
    /// Overlay closed without changes.
    Dismissed,
    /// Key had no effect.
    Ignored,
}

/// Selection state of the reference overlay for one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSearch {
    selected: usize,
    dismissed: bool,
}

impl ReferenceSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Whether the overlay should be shown for `block`.
    pub fn is_open(&self, block: &Block) -> bool {
        !self.dismissed
            && matches!(block.kind, BlockKind::Task { .. } | BlockKind::Mention { .. })
            && !block.content().is_empty()
    }

    /// Call after the block content changed; re-opens a dismissed overlay.
    pub fn on_query_changed(&mut self) {
        self.selected = 0;
        self.dismissed = false;
    }

    pub fn handle_key(
        &mut self,
        key: NavKey,
        block: &mut Block,
        directory: &ReferenceDirectory<'_>,
    ) -> SearchKeyOutcome {
        if !self.is_open(block) {
            return SearchKeyOutcome::Ignored;
        }
        let matches = reference_matches(block, directory);
        match key {
            NavKey::Up | NavKey::Down => {
                self.selected = step_selection(self.selected, key, matches.len());
                SearchKeyOutcome::Moved(self.selected)
            }
            NavKey::Enter => {
                let index = step_selection(self.selected, key, matches.len());
                let Some(selected) = matches.get(index) else {
                    return SearchKeyOutcome::Ignored;
                };
                let id = selected.id().to_string();
                if !apply_reference(block, selected) {
                    return SearchKeyOutcome::Ignored;
                }
                debug!(
                    "event=reference_commit module=editor block_type={} status=ok",
                    block.block_type().as_str()
                );
                self.selected = 0;
                self.dismissed = true;
                SearchKeyOutcome::Committed(id)
            }
            NavKey::Escape => {
                self.dismissed = true;
                SearchKeyOutcome::Dismissed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{search_members, search_tasks, MemberRef, TaskRef, MAX_REFERENCE_MATCHES};

    fn task(id: &str, text: &str) -> TaskRef {
        TaskRef {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn task_search_is_case_insensitive_and_capped() {
        let tasks = (0..8)
            .map(|i| task(&format!("t{i}"), &format!("Deploy service {i}")))
            .collect::<Vec<_>>();
        let hits = search_tasks(&tasks, "DEPLOY");
        assert_eq!(hits.len(), MAX_REFERENCE_MATCHES);
        assert_eq!(hits[0].id, "t0");
        assert_eq!(hits[4].id, "t4");
    }

    #[test]
    fn member_search_keeps_source_order() {
        let members = vec![
            MemberRef {
                uid: "u1".to_string(),
                display_name: "Ana Lima".to_string(),
            },
            MemberRef {
                uid: "u2".to_string(),
                display_name: "Bob".to_string(),
            },
            MemberRef {
                uid: "u3".to_string(),
                display_name: "Diana".to_string(),
            },
        ];
        let hits = search_members(&members, "ana");
        assert_eq!(
            hits.iter().map(|m| m.uid.as_str()).collect::<Vec<_>>(),
            vec!["u1", "u3"]
        );
    }
}
