//! Per-visible-line render info and selection geometry.
//!
//! The cache holds one slot per visible display line, indexed relative to
//! the top line. A slot stores offsets into the text rather than borrowed
//! slices, so a buffer reallocation never leaves it dangling. Slots are
//! cleared when invalidated or scrolled out, and `recompute` rebuilds the
//! cleared ones inside the dirty range.

use std::ops::Range;

use anyhow::{Context, Result};

use crate::line_index::LineIndex;
use crate::metrics::Measurer;

/// Screen-relative lines needing a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirtyLines {
    #[default]
    None,
    /// Visible lines `[from, to)`.
    Lines { from: usize, to: usize },
    All,
}

impl DirtyLines {
    pub fn is_none(&self) -> bool {
        matches!(self, DirtyLines::None)
    }

    pub fn line_range(from: usize, to: usize) -> Self {
        if from >= to {
            DirtyLines::None
        } else {
            DirtyLines::Lines { from, to }
        }
    }

    /// Smallest region covering both.
    pub fn merge(&mut self, other: DirtyLines) {
        *self = match (*self, other) {
            (DirtyLines::None, _) => other,
            (_, DirtyLines::None) => return,
            (DirtyLines::All, _) | (_, DirtyLines::All) => DirtyLines::All,
            (DirtyLines::Lines { from: a, to: b }, DirtyLines::Lines { from: c, to: d }) => {
                DirtyLines::Lines {
                    from: a.min(c),
                    to: b.max(d),
                }
            }
        };
    }

    /// The covered visible lines, clipped to `len`.
    pub fn to_range(self, len: usize) -> Range<usize> {
        match self {
            DirtyLines::None => 0..0,
            DirtyLines::Lines { from, to } => from.min(len)..to.min(len),
            DirtyLines::All => 0..len,
        }
    }
}

/// Layout of one visible display line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLine {
    /// Buffer-relative display line.
    pub line: usize,
    pub start: usize,
    /// Start of the following line; `start + len` plus one when the line
    /// ends in a newline.
    pub next_start: usize,
    /// Drawable bytes, excluding a trailing newline.
    pub len: usize,
    /// Bytes scrolled off the left edge. Always 0 in wrap mode.
    pub first_visible: usize,
    /// Pixels between the left edge of the view and the start of glyph
    /// `first_visible`, which is drawn at `-lead_offset`.
    pub lead_offset: i32,
    /// Advances of the drawn glyphs, starting at `first_visible`.
    pub advances: Vec<i32>,
}

impl RenderLine {
    /// Byte range of the drawn glyphs.
    pub fn drawn(&self) -> Range<usize> {
        let from = self.start + self.first_visible;
        from..from + self.advances.len()
    }

    /// View x of the boundary before line-relative byte `col`, if that
    /// boundary is on screen.
    pub fn x_at(&self, col: usize) -> Option<i32> {
        let k = col.checked_sub(self.first_visible)?;
        if k > self.advances.len() {
            return None;
        }
        Some(self.advances[..k].iter().sum::<i32>() - self.lead_offset)
    }

    /// Like `x_at`, clipped to `[0, text_width]`.
    pub fn clipped_x(&self, col: usize, text_width: i32) -> i32 {
        if col < self.first_visible {
            return 0;
        }
        match self.x_at(col) {
            Some(x) => x.clamp(0, text_width),
            None => text_width,
        }
    }

    /// Drawn `(byte, advance)` pairs.
    pub fn glyphs<'t>(&'t self, text: &'t [u8]) -> impl Iterator<Item = (u8, i32)> + 't {
        text[self.drawn()].iter().copied().zip(self.advances.iter().copied())
    }
}

/// A pixel rectangle in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Highlight rectangles for the active selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionGeometry {
    /// One rectangle per selected visible line, except the caret's line.
    pub rects: Vec<Rect>,
    /// The selected part of the caret's line, composited separately.
    pub caret_line: Option<Rect>,
}

impl SelectionGeometry {
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty() && self.caret_line.is_none()
    }
}

/// Everything a rebuild reads from the editor.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub text: &'a [u8],
    pub index: &'a LineIndex,
    pub measurer: Measurer<'a>,
    pub wrap: bool,
    pub scroll_x: i32,
    pub text_width: i32,
    pub line_height: i32,
    /// Pixels of the top line hidden above the view.
    pub top_offset: i32,
}

/// Measures `line` for display.
///
/// In wrap mode every glyph of the line is measured. Otherwise glyphs
/// that end at or before `scroll_x` are skipped and measurement stops at
/// the first glyph starting past the right edge.
pub fn build_line(ctx: &RenderContext<'_>, line: usize) -> Result<RenderLine> {
    let range = ctx.index.line_range(line);
    let bytes = &ctx.text[range.clone()];
    let len = match bytes.last() {
        Some(b'\n') => bytes.len() - 1,
        _ => bytes.len(),
    };
    let glyphs = &bytes[..len];
    let m = ctx.measurer;

    let mut x = 0;
    let mut k = 0;
    let mut lead_offset = 0;
    if !ctx.wrap {
        while k < len {
            let adv = m.advance(glyphs[k], x);
            if x + adv > ctx.scroll_x {
                break;
            }
            x += adv;
            k += 1;
        }
        lead_offset = ctx.scroll_x - x;
    }
    let first_visible = k;

    let mut advances = Vec::new();
    advances
        .try_reserve(len - k)
        .context("Failed to allocate render line")?;
    while k < len && (ctx.wrap || x - ctx.scroll_x < ctx.text_width) {
        let adv = m.advance(glyphs[k], x);
        advances.push(adv);
        x += adv;
        k += 1;
    }

    Ok(RenderLine {
        line,
        start: range.start,
        next_start: range.end,
        len,
        first_visible,
        lead_offset,
        advances,
    })
}

/// Cached layout of the visible lines.
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    top_line: usize,
    lines: Vec<Option<RenderLine>>,
    dirty: DirtyLines,
    selection: SelectionGeometry,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every slot from scratch.
    pub fn full(ctx: &RenderContext<'_>, top_line: usize, visible: usize) -> Result<Self> {
        let mut cache = Self::new();
        cache.reset(top_line, visible);
        cache.recompute(ctx)?;
        Ok(cache)
    }

    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Number of visible slots.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn dirty(&self) -> DirtyLines {
        self.dirty
    }

    /// Slot `visible`, if built.
    pub fn line(&self, visible: usize) -> Option<&RenderLine> {
        self.lines.get(visible).and_then(Option::as_ref)
    }

    /// Built slots in screen order.
    pub fn lines(&self) -> impl Iterator<Item = &RenderLine> {
        self.lines.iter().flatten()
    }

    /// Slot holding buffer line `line`, if it is visible and built.
    pub fn find(&self, line: usize) -> Option<&RenderLine> {
        line.checked_sub(self.top_line).and_then(|v| self.line(v))
    }

    pub fn selection(&self) -> &SelectionGeometry {
        &self.selection
    }

    /// Drops every slot and marks the whole view dirty.
    pub fn reset(&mut self, top_line: usize, visible: usize) {
        self.top_line = top_line;
        self.lines.clear();
        self.lines.resize(visible, None);
        self.dirty = DirtyLines::All;
    }

    pub fn invalidate_all(&mut self) {
        self.lines.iter_mut().for_each(|slot| *slot = None);
        self.dirty = DirtyLines::All;
    }

    /// Marks visible lines `range` for rebuild.
    pub fn invalidate(&mut self, range: Range<usize>) {
        let range = range.start.min(self.lines.len())..range.end.min(self.lines.len());
        for slot in &mut self.lines[range.clone()] {
            *slot = None;
        }
        self.dirty.merge(DirtyLines::line_range(range.start, range.end));
    }

    /// Marks buffer lines `lines` for rebuild where they are visible.
    pub fn invalidate_lines(&mut self, lines: Range<usize>) {
        let from = lines.start.saturating_sub(self.top_line);
        let to = lines.end.saturating_sub(self.top_line);
        self.invalidate(from..to);
    }

    /// Grows or shrinks the slot count. New slots are dirty.
    pub fn set_visible(&mut self, visible: usize) {
        let old = self.lines.len();
        self.lines.resize(visible, None);
        if visible > old {
            self.dirty.merge(DirtyLines::line_range(old, visible));
        }
    }

    /// Moves the top of the view to `top_line`, keeping slots that stay
    /// on screen.
    pub fn scroll_to(&mut self, top_line: usize) {
        let len = self.lines.len();
        let old = self.top_line;
        self.top_line = top_line;
        if top_line == old {
            return;
        }
        let delta = top_line.abs_diff(old);
        if delta >= len {
            self.invalidate_all();
            return;
        }
        if top_line > old {
            self.lines.rotate_left(delta);
            self.lines[len - delta..].iter_mut().for_each(|s| *s = None);
        } else {
            self.lines.rotate_right(delta);
            self.lines[..delta].iter_mut().for_each(|s| *s = None);
        }
        self.rescan_dirty();
    }

    /// Brings slots up to date after the line index was relaid from
    /// `first_line` through `last_line`.
    ///
    /// Lines past `last_line` kept their content. When the line count is
    /// unchanged they only moved by `delta` bytes; otherwise they moved to
    /// other slots and are rebuilt.
    pub fn apply_relayout(
        &mut self,
        first_line: usize,
        last_line: usize,
        count_changed: bool,
        delta: isize,
    ) {
        if count_changed {
            self.invalidate_lines(first_line..usize::MAX);
            return;
        }
        self.invalidate_lines(first_line..last_line + 1);
        for rl in self.lines.iter_mut().flatten() {
            if rl.line > last_line {
                rl.start = rl.start.wrapping_add_signed(delta);
                rl.next_start = rl.next_start.wrapping_add_signed(delta);
            }
        }
    }

    /// Rebuilds the dirty slots and returns the region that needs redraw.
    ///
    /// # Errors
    ///
    /// Returns an error if a line's advance array cannot be allocated. The
    /// failed slot stays dirty.
    pub fn recompute(&mut self, ctx: &RenderContext<'_>) -> Result<DirtyLines> {
        let dirty = self.dirty;
        let line_count = ctx.index.line_count();
        for visible in dirty.to_range(self.lines.len()) {
            let line = self.top_line + visible;
            self.lines[visible] = if line < line_count {
                Some(build_line(ctx, line)?)
            } else {
                None
            };
        }
        self.dirty = DirtyLines::None;
        tracing::trace!(top_line = self.top_line, ?dirty, "Render cache recomputed");
        Ok(dirty)
    }

    /// Recomputes the highlight rectangles for `selection` from the built
    /// slots. `None` or an empty range clears the geometry.
    pub fn recompute_selection_geometry(
        &mut self,
        ctx: &RenderContext<'_>,
        selection: Option<Range<usize>>,
        caret: usize,
    ) {
        self.selection = SelectionGeometry::default();
        let Some(sel) = selection.filter(|s| s.start < s.end) else {
            return;
        };
        let Some(visible) = self.resolve_line_range(ctx.index, &sel) else {
            return;
        };
        let caret_line = ctx.index.line_of(caret);
        let newline_mark = ctx.measurer.metrics.avg_char_width();

        for v in visible {
            let Some(rl) = self.line(v) else { continue };
            let a = sel.start.max(rl.start) - rl.start;
            let b = sel.end.min(rl.next_start) - rl.start;
            let left = rl.clipped_x(a, ctx.text_width);
            let mut right = rl.clipped_x(b.min(rl.len), ctx.text_width);
            if b > rl.len && (rl.first_visible + rl.advances.len() == rl.len) {
                right = (right + newline_mark).min(ctx.text_width);
            }
            if right <= left {
                continue;
            }
            let rect = Rect {
                x: left,
                y: v as i32 * ctx.line_height - ctx.top_offset,
                width: right - left,
                height: ctx.line_height,
            };
            if rl.line == caret_line {
                self.selection.caret_line = Some(rect);
            } else {
                self.selection.rects.push(rect);
            }
        }
    }

    /// Visible lines intersecting the non-empty byte range `sel`.
    fn resolve_line_range(&self, index: &LineIndex, sel: &Range<usize>) -> Option<Range<usize>> {
        let first = index.line_of(sel.start);
        let last = index.line_of(sel.end - 1);
        let from = first.max(self.top_line);
        let to = (last + 1).min(self.top_line + self.lines.len());
        (from < to).then(|| from - self.top_line..to - self.top_line)
    }

    fn rescan_dirty(&mut self) {
        let mut empty = self.lines.iter().enumerate().filter(|(_, s)| s.is_none());
        self.dirty = match empty.next() {
            None => DirtyLines::None,
            Some((first, _)) => {
                let last = empty.last().map_or(first, |(i, _)| i);
                DirtyLines::line_range(first, last + 1)
            }
        };
    }
}
