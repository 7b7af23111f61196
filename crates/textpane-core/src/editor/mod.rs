//! The editor instance: buffer, layout, history, and view state.
//!
//! An `Editor` owns everything one text pane needs. Every edit runs the
//! same path: the buffer is mutated, the affected display lines are
//! relaid, the render cache is invalidated for those lines only, and the
//! history records the change. View state and scrolling live in the
//! `view` submodule; caret motion and mouse handling in `navigation`.

mod navigation;
mod view;

pub use navigation::{ClickKind, Motion};

use std::collections::VecDeque;
use std::ops::Range;

use anyhow::Result;

use crate::buffer::{TextBuffer, DEFAULT_GROWTH};
use crate::caret::{self, Selection};
use crate::clipboard::{self, Clipboard};
use crate::history::{
    selection_after_redo, selection_after_undo, EditKind, HistoryConfig, Merge, UndoEntry,
    UndoManager,
};
use crate::layout::{Layout, TextEdit, WrapMode, DEFAULT_MAX_LINE_LEN};
use crate::metrics::{FontMetrics, TabStops};
use crate::render_cache::RenderCache;
use crate::viewport::Viewport;

/// Construction-time settings.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub wrap_mode: WrapMode,
    /// Byte cap for a single display line.
    pub max_line_len: usize,
    /// Buffer capacity increment.
    pub buffer_growth: usize,
    pub history: HistoryConfig,
    /// Tab interval in average character widths.
    pub tab_width_chars: i32,
    /// Lines per wheel notch; 0 scrolls a page.
    pub wheel_lines: i32,
    pub overwrite: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            wrap_mode: WrapMode::Truncate,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            buffer_growth: DEFAULT_GROWTH,
            history: HistoryConfig::default(),
            tab_width_chars: 8,
            wheel_lines: 3,
            overwrite: false,
        }
    }
}

/// Notifications for the host, queued until drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// The selection became active (`true`) or inactive.
    SelectionChanged(bool),
    UndoAvailabilityChanged { can_undo: bool, can_redo: bool },
}

pub struct Editor {
    buffer: TextBuffer,
    /// Selection anchor; the caret lives in the buffer.
    anchor: usize,
    layout: Layout,
    metrics: FontMetrics,
    tabs: TabStops,
    viewport: Viewport,
    /// Width asked for by the host, before the text area clamp.
    requested_width: i32,
    cache: RenderCache,
    /// Horizontal scroll the cache slots were measured at.
    cache_scroll_x: i32,
    history: UndoManager,
    options: EditorOptions,
    overwrite: bool,
    drag: Option<navigation::Drag>,
    events: VecDeque<EditorEvent>,
    reported_selection: bool,
    reported_undo: (bool, bool),
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("len", &self.buffer.len())
            .field("selection", &self.selection())
            .field("lines", &self.layout.line_count())
            .field("mode", &self.layout.mode())
            .field("overwrite", &self.overwrite)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Creates an empty editor with a `width` by `height` pixel text area.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial layout cannot be allocated.
    pub fn new(options: EditorOptions, metrics: FontMetrics, width: i32, height: i32) -> Result<Self> {
        let mut editor = Self {
            buffer: TextBuffer::new(options.buffer_growth),
            anchor: 0,
            layout: Layout::new(options.wrap_mode, options.max_line_len, width),
            metrics,
            tabs: TabStops::uniform(1),
            viewport: Viewport::new(width, height),
            requested_width: width,
            cache: RenderCache::new(),
            cache_scroll_x: 0,
            history: UndoManager::new(options.history.clone().sanitized()),
            overwrite: options.overwrite,
            options,
            drag: None,
            events: VecDeque::new(),
            reported_selection: false,
            reported_undo: (false, false),
        };
        editor.apply_text_area();
        editor.relayout_full()?;
        editor.refresh()?;
        Ok(editor)
    }

    // ── Buffer handle ──────────────────────────────────────────────

    /// Replaces the text with `bytes`, returning the previous text.
    ///
    /// History, selection, and scroll position are reset and everything
    /// is laid out from scratch.
    ///
    /// # Errors
    ///
    /// Returns an error if the new layout cannot be allocated. The editor
    /// keeps the new text with an empty view in that case.
    pub fn set_buffer_handle(&mut self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        self.cancel_drag();
        let old = std::mem::replace(
            &mut self.buffer,
            TextBuffer::from_bytes(bytes, self.options.buffer_growth),
        );
        self.anchor = 0;
        self.history.clear();
        self.viewport = Viewport::new(self.viewport.width(), self.viewport.height());
        tracing::debug!(len = self.buffer.len(), "Buffer replaced");
        self.relayout_full()?;
        self.refresh()?;
        Ok(old.into_bytes())
    }

    /// The current text.
    pub fn buffer_handle(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Takes the text out, leaving the editor empty.
    pub fn take_buffer(&mut self) -> Result<Vec<u8>> {
        self.set_buffer_handle(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    // ── Selection ──────────────────────────────────────────────────

    pub fn selection(&self) -> Selection {
        Selection::new(self.anchor, self.buffer.caret())
    }

    pub fn caret(&self) -> usize {
        self.buffer.caret()
    }

    /// Selects `anchor..caret`, clamping both ends to the text.
    pub fn set_selection(&mut self, anchor: usize, caret: usize) -> Result<()> {
        self.cancel_drag();
        self.history.break_session();
        self.set_selection_raw(Selection::new(anchor, caret));
        self.follow_caret();
        self.refresh()
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.set_selection(0, self.buffer.len())
    }

    /// Bytes of the active selection.
    pub fn selected_bytes(&self) -> Option<&[u8]> {
        let range = self.selection().range()?;
        Some(self.buffer.slice(range.start, range.end))
    }

    fn set_selection_raw(&mut self, sel: Selection) {
        let sel = sel.clamped(self.buffer.len());
        self.anchor = sel.anchor;
        self.buffer.set_caret(sel.caret);
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn set_overwrite(&mut self, on: bool) {
        self.overwrite = on;
        self.history.break_session();
    }

    /// Flips overwrite mode and returns the new state.
    pub fn toggle_overwrite(&mut self) -> bool {
        self.set_overwrite(!self.overwrite);
        self.overwrite
    }

    // ── Edit primitives ────────────────────────────────────────────

    /// Inserts `data` at `pos` and relays the affected lines. The buffer
    /// is unchanged on error.
    fn splice_in(&mut self, pos: usize, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.buffer.insert(pos, data)?;
        self.relayout(TextEdit::Insert { pos, len: data.len() }, data.len() as isize)
    }

    /// Removes `range` and relays the affected lines.
    fn splice_out(&mut self, range: Range<usize>) -> Result<Vec<u8>> {
        let len = range.len();
        let removed = self.buffer.remove(range.start, range.end);
        if len > 0 {
            self.relayout(TextEdit::Delete { pos: range.start, len }, -(len as isize))?;
        }
        Ok(removed)
    }

    /// Overwrites the byte at `pos` in place.
    fn overtype(&mut self, pos: usize, byte: u8) -> Result<u8> {
        let old = self.buffer.overwrite(pos, byte);
        self.relayout(TextEdit::Replace { pos, len: 1 }, 0)?;
        Ok(old)
    }

    /// Replaces `range` with `data`. The new text goes in before the old
    /// is removed so a failed allocation leaves the buffer untouched.
    fn splice_replace(&mut self, range: Range<usize>, data: &[u8]) -> Result<Vec<u8>> {
        self.splice_in(range.end, data)?;
        self.splice_out(range)
    }

    // ── Edit commands ──────────────────────────────────────────────

    /// Replaces the selection with `data`, or inserts it at the caret.
    fn replace_selection(&mut self, data: &[u8], merge: Merge) -> Result<()> {
        let sel = self.selection();
        self.history.reserve()?;
        match sel.range() {
            Some(range) => {
                let start = range.start;
                let old = self.splice_replace(range, data)?;
                self.set_selection_raw(Selection::caret_only(start + data.len()));
                let entry = UndoEntry::replace(start, old, data.to_vec(), sel.caret_first(), true);
                self.history.record(entry, merge)
            }
            None if data.is_empty() => Ok(()),
            None => {
                let pos = sel.caret;
                self.splice_in(pos, data)?;
                self.set_selection_raw(Selection::caret_only(pos + data.len()));
                self.history.record(UndoEntry::insert(pos, data.to_vec()), merge)
            }
        }
    }

    /// Removes `range` and records it. `caret_first` tells undo where to
    /// put the caret back.
    fn delete_span(&mut self, range: Range<usize>, caret_first: bool, merge: Merge) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }
        self.history.reserve()?;
        let start = range.start;
        let removed = self.splice_out(range)?;
        self.set_selection_raw(Selection::caret_only(start));
        self.history
            .record(UndoEntry::delete(start, removed, caret_first, false), merge)
    }

    /// Deletes the active selection without refreshing the view.
    fn remove_selection(&mut self) -> Result<bool> {
        let sel = self.selection();
        let Some(range) = sel.range() else {
            return Ok(false);
        };
        self.history.reserve()?;
        let start = range.start;
        let removed = self.splice_out(range)?;
        self.set_selection_raw(Selection::caret_only(start));
        self.history.record(
            UndoEntry::delete(start, removed, sel.caret_first(), true),
            Merge::Never,
        )?;
        Ok(true)
    }

    fn after_edit(&mut self) -> Result<()> {
        self.follow_caret();
        self.refresh()
    }

    /// Types one byte at the caret.
    ///
    /// Carriage return and newline insert `\n`; other control bytes except
    /// tab are ignored. In overwrite mode, without a selection, a byte that
    /// is not a newline is replaced in place.
    pub fn insert_char(&mut self, c: u8) -> Result<()> {
        let c = match c {
            b'\r' | b'\n' => b'\n',
            b'\t' => b'\t',
            c if c < 0x20 => return Ok(()),
            c => c,
        };
        self.cancel_drag();
        let caret = self.buffer.caret();
        let overtype = self.overwrite
            && !self.selection().is_active()
            && matches!(self.buffer.byte_at(caret), Some(b) if b != b'\n');
        if overtype {
            self.history.reserve()?;
            let old = self.overtype(caret, c)?;
            self.set_selection_raw(Selection::caret_only(caret + 1));
            self.history.record(
                UndoEntry::replace(caret, vec![old], vec![c], false, false),
                Merge::Overtype,
            )?;
        } else {
            self.replace_selection(&[c], Merge::Typing)?;
        }
        self.after_edit()
    }

    /// Inserts `text` verbatim at the caret, replacing any selection.
    pub fn insert_str(&mut self, text: &[u8]) -> Result<()> {
        self.cancel_drag();
        self.replace_selection(text, Merge::Never)?;
        self.after_edit()
    }

    /// Deletes the bytes between `p1` and `p2`, in either order.
    ///
    /// Selection ends past the range shift left with the text; ends inside
    /// it collapse to its start.
    ///
    /// # Panics
    ///
    /// Panics if either bound is past the end of the text.
    pub fn delete_range(&mut self, p1: usize, p2: usize) -> Result<()> {
        self.cancel_drag();
        let range = p1.min(p2)..p1.max(p2);
        assert!(
            range.end <= self.buffer.len(),
            "delete range {}..{} out of bounds (buffer has {} bytes)",
            range.start,
            range.end,
            self.buffer.len()
        );
        if range.is_empty() {
            return self.after_edit();
        }
        let before = self.selection();
        let after = Selection::new(
            shift_past_delete(before.anchor, &range),
            shift_past_delete(before.caret, &range),
        );
        self.history.reserve()?;
        let start = range.start;
        let removed = self.splice_out(range)?;
        self.set_selection_raw(after);
        let entry = UndoEntry::delete(start, removed, false, before.is_active())
            .with_carets((before.anchor, before.caret), (after.anchor, after.caret));
        self.history.record(entry, Merge::Never)?;
        self.after_edit()
    }

    /// Deletes the selection. Returns whether there was one.
    pub fn delete_selection(&mut self) -> Result<bool> {
        self.cancel_drag();
        let removed = self.remove_selection()?;
        if removed {
            self.after_edit()?;
        }
        Ok(removed)
    }

    /// Deletes the selection or the byte before the caret.
    pub fn backspace(&mut self) -> Result<()> {
        self.cancel_drag();
        if !self.remove_selection()? {
            let caret = self.buffer.caret();
            if caret > 0 {
                self.delete_span(caret - 1..caret, false, Merge::Backspace)?;
            }
        }
        self.after_edit()
    }

    /// Deletes the selection or the byte after the caret.
    pub fn delete_forward(&mut self) -> Result<()> {
        self.cancel_drag();
        if !self.remove_selection()? {
            let caret = self.buffer.caret();
            if caret < self.buffer.len() {
                self.delete_span(caret..caret + 1, true, Merge::DeleteForward)?;
            }
        }
        self.after_edit()
    }

    /// Deletes the selection or back to the previous word start.
    pub fn delete_word_back(&mut self) -> Result<()> {
        self.cancel_drag();
        if !self.remove_selection()? {
            let caret = self.buffer.caret();
            let target = caret::skip_word(self.buffer.as_bytes(), caret, false);
            self.delete_span(target..caret, false, Merge::Never)?;
        }
        self.after_edit()
    }

    /// Deletes the selection or up to the next word start.
    pub fn delete_word_forward(&mut self) -> Result<()> {
        self.cancel_drag();
        if !self.remove_selection()? {
            let caret = self.buffer.caret();
            let target = caret::skip_word(self.buffer.as_bytes(), caret, true);
            self.delete_span(caret..target, true, Merge::Never)?;
        }
        self.after_edit()
    }

    // ── Clipboard ──────────────────────────────────────────────────

    /// Copies the selection with `\r\n` line endings. Returns whether
    /// anything reached the clipboard.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        let Some(selected) = self.selected_bytes() else {
            return false;
        };
        let text = clipboard::to_crlf(selected);
        match clipboard.set_text(&text) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Clipboard unavailable: {err:#}");
                false
            }
        }
    }

    /// Copies then deletes the selection. Nothing is deleted when the copy
    /// fails.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool> {
        if !self.copy(clipboard) {
            return Ok(false);
        }
        self.delete_selection()
    }

    /// Inserts external text with `\r\n` and `\r` turned into `\n`,
    /// replacing any selection. Empty text is ignored.
    pub fn paste(&mut self, text: &[u8]) -> Result<()> {
        let text = clipboard::normalize_newlines(text);
        if text.is_empty() {
            return Ok(());
        }
        self.cancel_drag();
        self.replace_selection(&text, Merge::Never)?;
        self.after_edit()
    }

    /// Pastes a NUL-terminated block of reported length `size`. A block
    /// without the terminator is ignored.
    pub fn paste_raw(&mut self, block: &[u8], size: usize) -> Result<()> {
        self.paste(clipboard::terminated_text(block, size))
    }

    /// Pastes from `clipboard`. An unavailable or empty clipboard is a
    /// no-op.
    pub fn paste_from(&mut self, clipboard: &mut dyn Clipboard) -> Result<()> {
        match clipboard.get_text() {
            Ok(Some(text)) => self.paste(&text),
            Ok(None) => Ok(()),
            Err(err) => {
                tracing::warn!("Clipboard unavailable: {err:#}");
                Ok(())
            }
        }
    }

    // ── History ────────────────────────────────────────────────────

    /// Reverts the last recorded edit. Returns false when there is none.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(entry) = self.history.last_applied().cloned() else {
            return Ok(false);
        };
        self.cancel_drag();
        self.history.pause_recording();
        let applied = self.apply_inverse(&entry);
        self.history.resume_recording();
        applied?;
        self.history.undo();
        self.set_selection_raw(selection_after_undo(&entry));
        self.after_edit()?;
        Ok(true)
    }

    /// Re-applies the last undone edit. Returns false when there is none.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(entry) = self.history.next_undone().cloned() else {
            return Ok(false);
        };
        self.cancel_drag();
        self.history.pause_recording();
        let applied = self.apply_forward(&entry);
        self.history.resume_recording();
        applied?;
        self.history.redo();
        self.set_selection_raw(selection_after_redo(&entry));
        self.after_edit()?;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    fn apply_inverse(&mut self, e: &UndoEntry) -> Result<()> {
        let pos = e.position;
        match e.kind {
            EditKind::Insert => {
                self.splice_out(pos..pos + e.data.len())?;
            }
            EditKind::Delete => self.splice_in(pos, &e.data)?,
            EditKind::Replace => {
                self.splice_replace(pos..pos + e.data.len(), &e.old_data)?;
            }
        }
        Ok(())
    }

    fn apply_forward(&mut self, e: &UndoEntry) -> Result<()> {
        let pos = e.position;
        match e.kind {
            EditKind::Insert => self.splice_in(pos, &e.data)?,
            EditKind::Delete => {
                self.splice_out(pos..pos + e.data.len())?;
            }
            EditKind::Replace => {
                self.splice_replace(pos..pos + e.old_data.len(), &e.data)?;
            }
        }
        Ok(())
    }

    // ── Events ─────────────────────────────────────────────────────

    /// Takes the queued notifications.
    pub fn drain_events(&mut self) -> impl Iterator<Item = EditorEvent> + '_ {
        self.events.drain(..)
    }

    fn notify(&mut self) {
        let active = self.selection().is_active();
        if active != self.reported_selection {
            self.reported_selection = active;
            self.events.push_back(EditorEvent::SelectionChanged(active));
        }
        let undo = (self.history.can_undo(), self.history.can_redo());
        if undo != self.reported_undo {
            self.reported_undo = undo;
            self.events.push_back(EditorEvent::UndoAvailabilityChanged {
                can_undo: undo.0,
                can_redo: undo.1,
            });
        }
    }
}

/// Where offset `pos` lands once `range` is deleted.
fn shift_past_delete(pos: usize, range: &Range<usize>) -> usize {
    if pos <= range.start {
        pos
    } else if pos <= range.end {
        range.start
    } else {
        pos - range.len()
    }
}
