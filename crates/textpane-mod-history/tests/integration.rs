// Integration tests for the history system.
//
// These tests replay recorded entries against a plain byte vector the way
// an editor would, checking that undo and redo walk the log consistently.

use textpane_mod_history::{EditKind, HistoryConfig, Merge, UndoEntry, UndoManager};

fn apply_forward(text: &mut Vec<u8>, entry: &UndoEntry) {
    let p = entry.position;
    match entry.kind {
        EditKind::Insert => {
            text.splice(p..p, entry.data.iter().copied());
        }
        EditKind::Delete => {
            text.drain(p..p + entry.data.len());
        }
        EditKind::Replace => {
            text.splice(p..p + entry.old_data.len(), entry.data.iter().copied());
        }
    }
}

fn apply_inverse(text: &mut Vec<u8>, entry: &UndoEntry) {
    let p = entry.position;
    match entry.kind {
        EditKind::Insert => {
            text.drain(p..p + entry.data.len());
        }
        EditKind::Delete => {
            text.splice(p..p, entry.data.iter().copied());
        }
        EditKind::Replace => {
            text.splice(p..p + entry.data.len(), entry.old_data.iter().copied());
        }
    }
}

fn edit(mgr: &mut UndoManager, text: &mut Vec<u8>, entry: UndoEntry, merge: Merge) {
    apply_forward(text, &entry);
    mgr.record(entry, merge).unwrap();
}

// ── Full Workflow ──────────────────────────────────────────────────────

#[test]
fn test_full_workflow_type_delete_undo_redo() {
    let mut mgr = UndoManager::default();
    let mut text = Vec::new();

    for (i, b) in b"hello world".iter().enumerate() {
        edit(&mut mgr, &mut text, UndoEntry::insert(i, vec![*b]), Merge::Typing);
    }
    mgr.break_session();
    edit(
        &mut mgr,
        &mut text,
        UndoEntry::delete(5, b" world".to_vec(), true, true),
        Merge::Never,
    );
    assert_eq!(text, b"hello");
    assert_eq!(mgr.len(), 2);

    let entry = mgr.undo().unwrap().clone();
    apply_inverse(&mut text, &entry);
    assert_eq!(text, b"hello world");

    let entry = mgr.undo().unwrap().clone();
    apply_inverse(&mut text, &entry);
    assert!(text.is_empty());
    assert!(!mgr.can_undo());

    while let Some(entry) = mgr.redo().cloned() {
        apply_forward(&mut text, &entry);
    }
    assert_eq!(text, b"hello");
}

#[test]
fn test_branch_truncation_after_undo() {
    let mut mgr = UndoManager::default();
    let mut text = Vec::new();
    edit(&mut mgr, &mut text, UndoEntry::insert(0, b"one ".to_vec()), Merge::Never);
    edit(&mut mgr, &mut text, UndoEntry::insert(4, b"two ".to_vec()), Merge::Never);
    edit(&mut mgr, &mut text, UndoEntry::insert(8, b"three".to_vec()), Merge::Never);

    for _ in 0..2 {
        let entry = mgr.undo().unwrap().clone();
        apply_inverse(&mut text, &entry);
    }
    assert_eq!(text, b"one ");
    assert!(mgr.can_redo());

    edit(&mut mgr, &mut text, UndoEntry::insert(4, b"four".to_vec()), Merge::Never);
    assert!(!mgr.can_redo());
    assert_eq!(mgr.len(), 2);
    assert_eq!(text, b"one four");
}

#[test]
fn test_overtype_run_undoes_as_one() {
    let mut mgr = UndoManager::default();
    let mut text = b"abcdef".to_vec();
    for (i, b) in b"XYZ".iter().enumerate() {
        let old = vec![text[i]];
        edit(
            &mut mgr,
            &mut text,
            UndoEntry::replace(i, old, vec![*b], true, false),
            Merge::Overtype,
        );
    }
    assert_eq!(text, b"XYZdef");
    assert_eq!(mgr.len(), 1);

    let entry = mgr.undo().unwrap().clone();
    apply_inverse(&mut text, &entry);
    assert_eq!(text, b"abcdef");
}

#[test]
fn test_forward_delete_run_undoes_as_one() {
    let mut mgr = UndoManager::default();
    let mut text = b"abcdef".to_vec();
    for _ in 0..3 {
        let b = text[1];
        edit(
            &mut mgr,
            &mut text,
            UndoEntry::delete(1, vec![b], true, false),
            Merge::DeleteForward,
        );
    }
    assert_eq!(text, b"aef");
    assert_eq!(mgr.len(), 1);
    assert_eq!(mgr.last_applied().unwrap().data, b"bcd");
}

// ── Capacity ───────────────────────────────────────────────────────────

#[test]
fn test_many_entries_grow_in_blocks() {
    let mut mgr = UndoManager::new(HistoryConfig {
        block_size: 4,
        max_history_depth: 0,
    });
    let mut text = Vec::new();
    for i in 0..100 {
        edit(&mut mgr, &mut text, UndoEntry::insert(i, vec![b'x']), Merge::Never);
    }
    assert_eq!(mgr.len(), 100);
    for _ in 0..100 {
        let entry = mgr.undo().unwrap().clone();
        apply_inverse(&mut text, &entry);
    }
    assert!(text.is_empty());
}

#[test]
fn test_silent_replay_does_not_record() {
    let mut mgr = UndoManager::default();
    let mut text = Vec::new();
    edit(&mut mgr, &mut text, UndoEntry::insert(0, b"abc".to_vec()), Merge::Never);

    let entry = mgr.undo().unwrap().clone();
    mgr.pause_recording();
    // An editor routes the inverse through its normal mutation path, which
    // tries to record; paused recording must swallow it.
    mgr.record(UndoEntry::delete(0, entry.data.clone(), true, false), Merge::Never)
        .unwrap();
    mgr.resume_recording();

    assert_eq!(mgr.len(), 1);
    assert!(mgr.can_redo());
}
