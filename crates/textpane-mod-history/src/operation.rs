/// Core types for recorded edits.

/// What a recorded entry did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// `data` was inserted at `position`.
    Insert,
    /// `data` was removed from `position`.
    Delete,
    /// `old_data` at `position` was replaced by `data`.
    Replace,
}

/// How a new entry may merge into the previous one.
///
/// Merging only happens while the previous entry was recorded with the
/// same `Merge` value and no session break occurred in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Always start a new entry and close the session.
    Never,
    /// A typed byte appended after the previous insertion.
    Typing,
    /// A typed byte overwriting the byte after the previous replacement.
    Overtype,
    /// A byte deleted just before the previous deletion.
    Backspace,
    /// A byte deleted at the position of the previous deletion.
    DeleteForward,
}

/// Anchor and caret around an edit whose selection does not follow from
/// its position, as `(anchor, caret)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carets {
    pub before: (usize, usize),
    pub after: (usize, usize),
}

/// A single undoable edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    pub kind: EditKind,
    /// Byte offset where the edit occurred.
    pub position: usize,
    /// Inserted bytes for `Insert`/`Replace`, removed bytes for `Delete`.
    pub data: Vec<u8>,
    /// Overwritten bytes for `Replace`; empty otherwise.
    pub old_data: Vec<u8>,
    /// Whether the caret sat before the anchor (or at `position` rather than
    /// after the text) when the edit was made.
    pub caret_first: bool,
    /// Whether the affected text was an active selection.
    pub selected: bool,
    /// Exact selections to restore, overriding the ones derived from
    /// `position` and `caret_first`.
    pub carets: Option<Carets>,
}

impl UndoEntry {
    pub fn insert(position: usize, data: Vec<u8>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            data,
            old_data: Vec::new(),
            caret_first: false,
            selected: false,
            carets: None,
        }
    }

    pub fn delete(position: usize, data: Vec<u8>, caret_first: bool, selected: bool) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            data,
            old_data: Vec::new(),
            caret_first,
            selected,
            carets: None,
        }
    }

    pub fn replace(
        position: usize,
        old_data: Vec<u8>,
        data: Vec<u8>,
        caret_first: bool,
        selected: bool,
    ) -> Self {
        Self {
            kind: EditKind::Replace,
            position,
            data,
            old_data,
            caret_first,
            selected,
            carets: None,
        }
    }

    /// Attaches the exact selections before and after the edit.
    pub fn with_carets(mut self, before: (usize, usize), after: (usize, usize)) -> Self {
        self.carets = Some(Carets { before, after });
        self
    }

    /// End offset of the text this entry left in the buffer.
    pub fn end_after(&self) -> usize {
        match self.kind {
            EditKind::Insert | EditKind::Replace => self.position + self.data.len(),
            EditKind::Delete => self.position,
        }
    }

    /// Length of the text an undo of this entry puts back.
    pub fn restored_len(&self) -> usize {
        match self.kind {
            EditKind::Insert => 0,
            EditKind::Delete => self.data.len(),
            EditKind::Replace => self.old_data.len(),
        }
    }

    /// Folds `next` into `self` if `merge` allows it. Returns false when the
    /// two entries are not adjacent in the required direction.
    pub(crate) fn absorb(&mut self, next: &UndoEntry, merge: Merge) -> bool {
        match merge {
            Merge::Never => false,
            Merge::Typing => {
                if next.kind != EditKind::Insert
                    || next.data.len() != 1
                    || self.kind == EditKind::Delete
                    || next.position != self.position + self.data.len()
                {
                    return false;
                }
                self.data.extend_from_slice(&next.data);
                true
            }
            Merge::Overtype => {
                if next.kind != EditKind::Replace
                    || self.kind != EditKind::Replace
                    || self.selected
                    || next.data.len() != 1
                    || next.old_data.len() != 1
                    || next.position != self.position + self.data.len()
                {
                    return false;
                }
                self.data.extend_from_slice(&next.data);
                self.old_data.extend_from_slice(&next.old_data);
                true
            }
            Merge::Backspace => {
                if next.kind != EditKind::Delete
                    || self.kind != EditKind::Delete
                    || self.selected
                    || next.data.len() != 1
                    || next.position + 1 != self.position
                {
                    return false;
                }
                self.data.insert(0, next.data[0]);
                self.position = next.position;
                true
            }
            Merge::DeleteForward => {
                if next.kind != EditKind::Delete
                    || self.kind != EditKind::Delete
                    || self.selected
                    || next.data.len() != 1
                    || next.position != self.position
                {
                    return false;
                }
                self.data.extend_from_slice(&next.data);
                true
            }
        }
    }
}
