//! Caret motion, line scrolling, and mouse selection.

use anyhow::Result;

use super::Editor;
use crate::caret::{self, Selection};
use crate::metrics::Measurer;
use crate::viewport::{Axis, ScrollCommand};

/// Keyboard caret motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
    DocumentStart,
    DocumentEnd,
    WordLeft,
    WordRight,
    /// First fully visible line, at the caret's x.
    ViewTop,
    /// Last fully visible line, at the caret's x.
    ViewBottom,
}

/// Click multiplicity; sets the drag granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
    Triple,
}

/// A held left button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Drag {
    kind: ClickKind,
    x: i32,
    y: i32,
}

impl Editor {
    /// Moves the caret. With `extend` the anchor stays put and the
    /// selection grows; otherwise the selection collapses.
    pub fn move_caret(&mut self, motion: Motion, extend: bool) -> Result<()> {
        self.cancel_drag();
        self.history.break_session();
        let sel = self.selection();
        let target = self.motion_target(motion, sel, extend);
        match motion {
            Motion::PageUp => self.scroll_page(ScrollCommand::PageUp),
            Motion::PageDown => self.scroll_page(ScrollCommand::PageDown),
            _ => {}
        }
        let anchor = if extend { sel.anchor } else { target };
        self.set_selection_raw(Selection::new(anchor, target));
        self.follow_caret();
        self.refresh()
    }

    fn motion_target(&self, motion: Motion, sel: Selection, extend: bool) -> usize {
        let text = self.buffer.as_bytes();
        let index = self.layout.index();
        let caret = sel.caret;
        let line = index.line_of(caret);
        let last_line = index.line_count() - 1;
        match motion {
            Motion::Left => match sel.range() {
                Some(r) if !extend => r.start,
                _ => caret.saturating_sub(1),
            },
            Motion::Right => match sel.range() {
                Some(r) if !extend => r.end,
                _ => (caret + 1).min(text.len()),
            },
            Motion::Up if line > 0 => self.hit_at_caret_x(line - 1),
            Motion::Down if line < last_line => self.hit_at_caret_x(line + 1),
            Motion::Up | Motion::Down => caret,
            Motion::LineStart => index.start(line),
            Motion::LineEnd => caret::line_end(index, line),
            Motion::PageUp => index.start(line.saturating_sub(self.page_lines())),
            Motion::PageDown => index.start((line + self.page_lines()).min(last_line)),
            Motion::DocumentStart => 0,
            Motion::DocumentEnd => text.len(),
            Motion::WordLeft => caret::skip_word(text, caret, false),
            Motion::WordRight => caret::skip_word(text, caret, true),
            Motion::ViewTop => self.hit_at_caret_x(self.first_full_line()),
            Motion::ViewBottom => self.hit_at_caret_x(self.last_full_line()),
        }
    }

    /// Scrolls one line, moving the caret onto the screen if it left it.
    /// Any selection collapses when the caret has to move.
    pub fn scroll_line(&mut self, up: bool) -> Result<()> {
        self.cancel_drag();
        self.history.break_session();
        let cmd = if up {
            ScrollCommand::LineUp
        } else {
            ScrollCommand::LineDown
        };
        let limits = self.limits();
        self.viewport.scroll(Axis::Vertical, cmd, &limits);

        let line = self.layout.index().line_of(self.buffer.caret());
        let (top, bottom) = (self.first_full_line(), self.last_full_line());
        let target = if line < top {
            Some(self.hit_at_caret_x(top))
        } else if line > bottom {
            Some(self.hit_at_caret_x(bottom))
        } else {
            None
        };
        if let Some(pos) = target {
            self.set_selection_raw(Selection::caret_only(pos));
        }
        self.refresh()
    }

    fn scroll_page(&mut self, cmd: ScrollCommand) {
        let limits = self.limits();
        self.viewport.scroll(Axis::Vertical, cmd, &limits);
    }

    /// Whole lines per page, at least one.
    fn page_lines(&self) -> usize {
        (self.viewport.height() / self.metrics.line_height()).max(1) as usize
    }

    fn first_full_line(&self) -> usize {
        let lh = self.metrics.line_height();
        let top = self.viewport.top_line(lh) + usize::from(self.viewport.top_offset(lh) > 0);
        top.min(self.layout.line_count() - 1)
    }

    fn last_full_line(&self) -> usize {
        let lh = self.metrics.line_height() as i64;
        let bottom = (self.viewport.scroll_y() + self.viewport.height() as i64) / lh - 1;
        (bottom.max(0) as usize)
            .max(self.viewport.top_line(lh as i32))
            .min(self.layout.line_count() - 1)
    }

    /// Offset on `line` nearest to the caret's horizontal position.
    fn hit_at_caret_x(&self, line: usize) -> usize {
        let text = self.buffer.as_bytes();
        let index = self.layout.index();
        let caret = self.buffer.caret();
        let m = Measurer::new(&self.metrics, &self.tabs);
        let x = caret::x_of(text, index, index.line_of(caret), caret, &m);
        caret::hit_measured(text, index, line, x, &m)
    }

    // ── Mouse ──────────────────────────────────────────────────────

    /// Left button pressed at view point `(x, y)`.
    ///
    /// A double click moves the caret to the start of the word under the
    /// pointer, a triple click to the start of the line. With `shift` the
    /// selection extends from the existing anchor.
    pub fn mouse_down(&mut self, x: i32, y: i32, kind: ClickKind, shift: bool) -> Result<()> {
        self.history.break_session();
        self.viewport.cancel_pan();
        let hit = self.point_to_offset(x, y);
        let text = self.buffer.as_bytes();
        let target = match kind {
            ClickKind::Single => hit,
            ClickKind::Double => caret::word_start(text, hit),
            ClickKind::Triple => {
                let index = self.layout.index();
                index.start(index.line_of(hit))
            }
        };
        let anchor = if shift { self.anchor } else { target };
        self.set_selection_raw(Selection::new(anchor, target));
        self.drag = Some(Drag { kind, x, y });
        self.follow_caret();
        self.refresh()
    }

    /// Pointer moved with the left button held.
    pub fn mouse_drag(&mut self, x: i32, y: i32) -> Result<()> {
        let Some(drag) = self.drag.as_mut() else {
            return Ok(());
        };
        drag.x = x;
        drag.y = y;
        self.extend_drag()
    }

    /// Repeats the last drag step. The host calls this on a timer while
    /// the pointer is held outside the text area.
    pub fn drag_tick(&mut self) -> Result<()> {
        if self.drag.is_none() {
            return Ok(());
        }
        self.extend_drag()
    }

    pub fn mouse_up(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Ends a drag so a pending tick cannot act on a stale caret.
    pub(super) fn cancel_drag(&mut self) {
        self.drag = None;
    }

    fn extend_drag(&mut self) -> Result<()> {
        let Some(drag) = self.drag else {
            return Ok(());
        };
        let limits = self.limits();
        let (width, height) = (self.viewport.width(), self.viewport.height());
        if drag.y < 0 {
            self.viewport.scroll(Axis::Vertical, ScrollCommand::LineUp, &limits);
        } else if drag.y >= height {
            self.viewport.scroll(Axis::Vertical, ScrollCommand::LineDown, &limits);
        }
        if limits.longest_line > 0 {
            if drag.x < 0 {
                self.viewport.scroll(Axis::Horizontal, ScrollCommand::LineUp, &limits);
            } else if drag.x >= width {
                self.viewport.scroll(Axis::Horizontal, ScrollCommand::LineDown, &limits);
            }
        }
        self.refresh()?;

        let hit = self.point_to_offset(drag.x.clamp(0, width), drag.y.clamp(0, (height - 1).max(0)));
        let anchor = self.anchor;
        let text = self.buffer.as_bytes();
        let index = self.layout.index();
        let target = match drag.kind {
            ClickKind::Single => hit,
            _ if hit == anchor => hit,
            ClickKind::Double => caret::skip_word(text, hit, anchor < hit),
            ClickKind::Triple if anchor < hit => caret::line_end(index, index.line_of(hit)),
            ClickKind::Triple => index.start(index.line_of(hit)),
        };
        self.set_selection_raw(Selection::new(anchor, target));
        self.refresh()
    }
}
