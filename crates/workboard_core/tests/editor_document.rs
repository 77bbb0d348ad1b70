use workboard_core::editor::reference::apply_reference;
use workboard_core::{
    filter_commands, reference_matches, BlockKind, BlockType, Document, DocumentError,
    MemberRef, MoveDirection, NavKey, ReferenceDirectory, ReferenceMatch, ReferenceSearch,
    SearchKeyOutcome, SlashMenu, SlashOutcome, TaskRef,
};

fn tasks() -> Vec<TaskRef> {
    [
        ("t1", "Fix login redirect"),
        ("t2", "Write release notes"),
        ("t3", "Fix flaky test"),
        ("t4", "LOGIN page copy"),
    ]
    .into_iter()
    .map(|(id, text)| TaskRef {
        id: id.to_string(),
        text: text.to_string(),
    })
    .collect()
}

fn members() -> Vec<MemberRef> {
    vec![
        MemberRef {
            uid: "u1".to_string(),
            display_name: "Ana Lima".to_string(),
        },
        MemberRef {
            uid: "u2".to_string(),
            display_name: "Bruno".to_string(),
        },
    ]
}

#[test]
fn numbered_ordinals_follow_reordering() {
    let mut doc = Document::from_markdown("1. a\n2. b\nbreak\n1. c");
    let break_id = doc.blocks()[2].id;
    assert_eq!(doc.numbered_ordinal(3), Some(1));
    assert_eq!(doc.numbered_ordinal(2), None);

    doc.move_block(break_id, MoveDirection::Down).unwrap();
    assert_eq!(doc.to_markdown(), "1. a\n2. b\n3. c\nbreak");
}

#[test]
fn insert_after_places_block_and_returns_id() {
    let mut doc = Document::from_markdown("first\nthird");
    let first = doc.blocks()[0].id;
    let inserted = doc.insert_after(first, BlockType::Divider).unwrap();
    assert_eq!(doc.position(inserted), Some(1));
    assert_eq!(doc.to_markdown(), "first\n---\nthird");
}

#[test]
fn unknown_block_id_is_reported() {
    let mut doc = Document::new();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        doc.set_content(missing, "x"),
        Err(DocumentError::BlockNotFound(missing))
    );
}

#[test]
fn slash_menu_choice_converts_block() {
    let mut doc = Document::from_markdown("todo item");
    let id = doc.blocks()[0].id;

    let mut menu = SlashMenu::new();
    menu.open();
    menu.set_query("check");
    let SlashOutcome::Chosen(kind) = menu.handle_key(NavKey::Enter) else {
        panic!("expected a chosen command");
    };
    doc.convert(id, kind).unwrap();
    doc.toggle_checked(id).unwrap();
    assert_eq!(doc.to_markdown(), "- [x] todo item");
    assert_eq!(filter_commands("check")[0].id, BlockType::Checklist);
}

#[test]
fn task_search_commits_selection_into_block() {
    let tasks = tasks();
    let directory = ReferenceDirectory {
        tasks: &tasks,
        members: &[],
    };
    let mut doc = Document::new();
    let id = doc.blocks()[0].id;
    doc.convert(id, BlockType::Task).unwrap();
    doc.set_content(id, "login").unwrap();

    let mut block = doc.get(id).unwrap().clone();
    let labels = reference_matches(&block, &directory)
        .iter()
        .map(|m| m.label().to_string())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["Fix login redirect", "LOGIN page copy"]);

    let mut search = ReferenceSearch::new();
    assert!(search.is_open(&block));
    assert_eq!(
        search.handle_key(NavKey::Down, &mut block, &directory),
        SearchKeyOutcome::Moved(1)
    );
    assert_eq!(
        search.handle_key(NavKey::Down, &mut block, &directory),
        SearchKeyOutcome::Moved(1)
    );
    assert_eq!(
        search.handle_key(NavKey::Enter, &mut block, &directory),
        SearchKeyOutcome::Committed("t4".to_string())
    );
    assert_eq!(
        block.kind,
        BlockKind::Task {
            content: "LOGIN page copy".to_string(),
            task_id: Some("t4".to_string()),
        }
    );
    assert!(!search.is_open(&block));
}

#[test]
fn escape_dismisses_without_mutation() {
    let members = members();
    let directory = ReferenceDirectory {
        tasks: &[],
        members: &members,
    };
    let mut doc = Document::new();
    let id = doc.blocks()[0].id;
    doc.convert(id, BlockType::Mention).unwrap();
    doc.set_content(id, "an").unwrap();
    let mut block = doc.get(id).unwrap().clone();
    let before = block.clone();

    let mut search = ReferenceSearch::new();
    assert_eq!(
        search.handle_key(NavKey::Escape, &mut block, &directory),
        SearchKeyOutcome::Dismissed
    );
    assert_eq!(block, before);
    assert_eq!(
        search.handle_key(NavKey::Enter, &mut block, &directory),
        SearchKeyOutcome::Ignored
    );

    search.on_query_changed();
    assert!(search.is_open(&block));
}

#[test]
fn enter_with_no_matches_is_noop() {
    let tasks = tasks();
    let directory = ReferenceDirectory {
        tasks: &tasks,
        members: &[],
    };
    let mut doc = Document::new();
    let id = doc.blocks()[0].id;
    doc.convert(id, BlockType::Task).unwrap();
    doc.set_content(id, "nothing matches").unwrap();
    let mut block = doc.get(id).unwrap().clone();
    let before = block.clone();

    let mut search = ReferenceSearch::new();
    assert_eq!(
        search.handle_key(NavKey::Enter, &mut block, &directory),
        SearchKeyOutcome::Ignored
    );
    assert_eq!(block, before);
}

#[test]
fn empty_content_closes_search() {
    let tasks = tasks();
    let directory = ReferenceDirectory {
        tasks: &tasks,
        members: &[],
    };
    let mut doc = Document::new();
    let id = doc.blocks()[0].id;
    doc.convert(id, BlockType::Task).unwrap();
    let block = doc.get(id).unwrap();
    assert!(!ReferenceSearch::new().is_open(block));
    assert!(reference_matches(block, &directory).is_empty());
}

#[test]
fn mismatched_reference_kind_is_rejected() {
    let members = members();
    let mut doc = Document::new();
    let id = doc.blocks()[0].id;
    doc.convert(id, BlockType::Task).unwrap();
    let member = ReferenceMatch::Member(&members[0]);

    let mut block = doc.get(id).unwrap().clone();
    assert!(!apply_reference(&mut block, &member));
    assert!(matches!(
        doc.apply_reference(id, &member),
        Err(DocumentError::UnsupportedOperation { .. })
    ));
}
