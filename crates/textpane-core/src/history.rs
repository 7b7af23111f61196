// Re-exports from textpane-mod-history and the selection each entry
// leaves behind when it is undone or redone.
pub use textpane_mod_history::{Carets, EditKind, HistoryConfig, Merge, UndoEntry, UndoManager};

use crate::caret::Selection;

/// Selection to restore after undoing `entry`.
///
/// A deleted or replaced selection comes back selected, facing the way it
/// faced when it was removed.
pub fn selection_after_undo(entry: &UndoEntry) -> Selection {
    if let Some(Carets { before, .. }) = entry.carets {
        return Selection::new(before.0, before.1);
    }
    let pos = entry.position;
    match entry.kind {
        EditKind::Insert => Selection::caret_only(pos),
        EditKind::Delete | EditKind::Replace if entry.selected => {
            let end = pos + entry.restored_len();
            if entry.caret_first {
                Selection::new(end, pos)
            } else {
                Selection::new(pos, end)
            }
        }
        EditKind::Delete if entry.caret_first => Selection::caret_only(pos),
        EditKind::Delete => Selection::caret_only(pos + entry.data.len()),
        EditKind::Replace => Selection::caret_only(pos),
    }
}

/// Selection to restore after redoing `entry`.
pub fn selection_after_redo(entry: &UndoEntry) -> Selection {
    match entry.carets {
        Some(Carets { after, .. }) => Selection::new(after.0, after.1),
        None => Selection::caret_only(entry.end_after()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_insert_puts_caret_at_start() {
        let e = UndoEntry::insert(4, b"abc".to_vec());
        assert_eq!(selection_after_undo(&e), Selection::caret_only(4));
        assert_eq!(selection_after_redo(&e), Selection::caret_only(7));
    }

    #[test]
    fn test_undo_backspace_and_forward_delete() {
        let back = UndoEntry::delete(2, b"xy".to_vec(), false, false);
        assert_eq!(selection_after_undo(&back), Selection::caret_only(4));
        let fwd = UndoEntry::delete(2, b"xy".to_vec(), true, false);
        assert_eq!(selection_after_undo(&fwd), Selection::caret_only(2));
        assert_eq!(selection_after_redo(&fwd), Selection::caret_only(2));
    }

    #[test]
    fn test_undo_selection_delete_keeps_direction() {
        let e = UndoEntry::delete(3, b"four".to_vec(), true, true);
        assert_eq!(selection_after_undo(&e), Selection::new(7, 3));
        let e = UndoEntry::delete(3, b"four".to_vec(), false, true);
        assert_eq!(selection_after_undo(&e), Selection::new(3, 7));
    }

    #[test]
    fn test_undo_replace_restores_old_selection() {
        let e = UndoEntry::replace(1, b"old".to_vec(), b"x".to_vec(), false, true);
        assert_eq!(selection_after_undo(&e), Selection::new(1, 4));
        assert_eq!(selection_after_redo(&e), Selection::caret_only(2));
    }

    #[test]
    fn test_recorded_carets_win() {
        let e = UndoEntry::delete(6, b"world".to_vec(), false, false)
            .with_carets((0, 16), (0, 11));
        assert_eq!(selection_after_undo(&e), Selection::new(0, 16));
        assert_eq!(selection_after_redo(&e), Selection::new(0, 11));
    }
}
