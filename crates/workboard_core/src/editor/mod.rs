//! Block editor state and pure selection reducers.
//!
//! # Responsibility
//! - Own the ordered block list behind the task editor.
//! - Provide the slash-command catalog and inline reference search.
//!
//! # Invariants
//! - Reducers never perform I/O; inputs are already-loaded collections.
//! - Selection cursors are always clamped to the current match count.

pub mod document;
pub mod reference;
pub mod slash;

/// Keyboard input understood by the editor overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// Moves `selected` one step for `key`, clamped to `[0, count-1]`.
///
/// Keys other than `Up`/`Down` leave the cursor unchanged (after clamping).
pub(crate) fn step_selection(selected: usize, key: NavKey, count: usize) -> usize {
    let last = count.saturating_sub(1);
    let current = selected.min(last);
    match key {
        NavKey::Down => (current + 1).min(last),
        NavKey::Up => current.saturating_sub(1),
        NavKey::Enter | NavKey::Escape => current,
    }
}

#[cfg(test)]
mod tests {
    use super::{step_selection, NavKey};

    #[test]
    fn selection_is_clamped() {
        assert_eq!(step_selection(0, NavKey::Up, 3), 0);
        assert_eq!(step_selection(2, NavKey::Down, 3), 2);
        assert_eq!(step_selection(1, NavKey::Down, 3), 2);
        assert_eq!(step_selection(0, NavKey::Down, 0), 0);
        assert_eq!(step_selection(4, NavKey::Enter, 2), 1);
    }
}
