//! Layout parameters, scrolling, and the render cache refresh.

use anyhow::Result;

use super::Editor;
use crate::caret;
use crate::layout::{TextEdit, WrapMode};
use crate::line_index::LineIndex;
use crate::metrics::{FontMetrics, Measurer, TabStops};
use crate::render_cache::{RenderCache, RenderContext, RenderLine, SelectionGeometry};
use crate::viewport::{Axis, ScrollCommand, ScrollInfo, ScrollLimits, Viewport};

/// Text area width for a requested pane width: at least one glyph wide.
fn text_area_width(requested: i32, metrics: &FontMetrics) -> i32 {
    requested.max(metrics.max_char_width() + 1)
}

fn render_context<'a>(
    editor_text: &'a [u8],
    index: &'a LineIndex,
    metrics: &'a FontMetrics,
    tabs: &'a TabStops,
    viewport: &Viewport,
    wrap: bool,
) -> RenderContext<'a> {
    let lh = metrics.line_height();
    RenderContext {
        text: editor_text,
        index,
        measurer: Measurer::new(metrics, tabs),
        wrap,
        scroll_x: viewport.scroll_x(),
        text_width: viewport.width(),
        line_height: lh,
        top_offset: viewport.top_offset(lh),
    }
}

impl Editor {
    // ── Layout parameters ──────────────────────────────────────────

    /// Resizes the text area and lays everything out again.
    pub fn on_resize(&mut self, width: i32, height: i32) -> Result<()> {
        self.cancel_drag();
        self.requested_width = width;
        self.viewport.resize(width, height);
        self.apply_text_area();
        self.relayout_full()?;
        self.refresh()
    }

    /// Switches fonts. The pixel scroll position is kept.
    pub fn on_font_change(&mut self, metrics: FontMetrics) -> Result<()> {
        self.cancel_drag();
        self.metrics = metrics;
        self.apply_text_area();
        self.relayout_full()?;
        self.refresh()
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) -> Result<()> {
        if mode == self.layout.mode() {
            return Ok(());
        }
        self.cancel_drag();
        self.options.wrap_mode = mode;
        self.relayout_full()?;
        self.follow_caret();
        self.refresh()
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.layout.mode()
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn tab_stops(&self) -> &TabStops {
        &self.tabs
    }

    pub fn line_count(&self) -> usize {
        self.layout.line_count()
    }

    pub fn line_index(&self) -> &LineIndex {
        self.layout.index()
    }

    /// Display line holding `pos`, clamped to the text.
    pub fn offset_to_line(&self, pos: usize) -> usize {
        self.layout.index().line_of(pos.min(self.buffer.len()))
    }

    /// Widest line in pixels, in truncation mode.
    pub fn longest_line(&self) -> i32 {
        self.layout.longest_line()
    }

    pub(super) fn apply_text_area(&mut self) {
        let width = text_area_width(self.requested_width, &self.metrics);
        self.viewport.resize(width, self.viewport.height());
    }

    fn tab_interval(&self) -> i32 {
        self.options.tab_width_chars.max(1) * self.metrics.avg_char_width()
    }

    /// Regenerates tab stops for the current tab area. Returns whether
    /// they changed.
    fn update_tab_stops(&mut self) -> bool {
        let width = self.viewport.width();
        let area = match self.layout.mode() {
            WrapMode::WordWrap => width,
            WrapMode::Truncate => width.max(self.layout.longest_line()),
        };
        let tabs = TabStops::generate(self.tab_interval(), area);
        if tabs == self.tabs {
            return false;
        }
        self.tabs = tabs;
        true
    }

    /// Rebuilds the line index and drops every cache slot.
    pub(super) fn relayout_full(&mut self) -> Result<()> {
        self.layout.configure(
            self.options.wrap_mode,
            self.options.max_line_len,
            self.viewport.width(),
        );
        // Wrapping depends on tab stops; truncation does not, but its tab
        // area depends on the longest line.
        if self.layout.mode() == WrapMode::WordWrap {
            self.update_tab_stops();
        }
        let m = Measurer::new(&self.metrics, &self.tabs);
        self.layout.rebuild(self.buffer.as_bytes(), &m)?;
        self.update_tab_stops();

        let limits = self.limits();
        self.viewport.clamp(&limits);
        let lh = self.metrics.line_height();
        let top = self.viewport.top_line(lh);
        let visible = self.viewport.visible_lines(lh, self.layout.line_count());
        self.cache.reset(top, visible);
        self.cache_scroll_x = self.viewport.scroll_x();
        Ok(())
    }

    /// Updates the line index and cache slots after `edit` was applied to
    /// the buffer. Falls back to a full relayout if the incremental pass
    /// cannot allocate.
    pub(super) fn relayout(&mut self, edit: TextEdit, delta: isize) -> Result<()> {
        let longest = self.layout.longest_line();
        let m = Measurer::new(&self.metrics, &self.tabs);
        let r = match self.layout.apply_edit(self.buffer.as_bytes(), edit, &m) {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("Incremental relayout failed, rebuilding: {err:#}");
                return self.relayout_full();
            }
        };
        if self.layout.longest_line() != longest && self.update_tab_stops() {
            self.cache.invalidate_all();
        } else {
            self.cache
                .apply_relayout(r.first_line, r.last_line, r.count_changed(), delta);
        }
        Ok(())
    }

    pub(super) fn limits(&self) -> ScrollLimits {
        ScrollLimits {
            line_count: self.layout.line_count(),
            line_height: self.metrics.line_height(),
            longest_line: match self.layout.mode() {
                WrapMode::Truncate => self.layout.longest_line(),
                WrapMode::WordWrap => 0,
            },
            char_width: self.metrics.avg_char_width(),
        }
    }

    // ── Cache refresh ──────────────────────────────────────────────

    /// Moves the cache window to the viewport and drops slots measured at
    /// a stale horizontal scroll.
    fn sync_view(&mut self) {
        let limits = self.limits();
        self.viewport.clamp(&limits);
        let lh = self.metrics.line_height();
        self.cache.scroll_to(self.viewport.top_line(lh));
        self.cache
            .set_visible(self.viewport.visible_lines(lh, self.layout.line_count()));
        if self.viewport.scroll_x() != self.cache_scroll_x {
            self.cache_scroll_x = self.viewport.scroll_x();
            if self.layout.mode() == WrapMode::Truncate {
                self.cache.invalidate_all();
            }
        }
    }

    /// Brings the render cache and selection geometry up to date and
    /// queues notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache line cannot be allocated.
    pub(super) fn refresh(&mut self) -> Result<()> {
        self.sync_view();
        let ctx = render_context(
            self.buffer.as_bytes(),
            self.layout.index(),
            &self.metrics,
            &self.tabs,
            &self.viewport,
            self.layout.mode() == WrapMode::WordWrap,
        );
        self.cache.recompute(&ctx)?;
        let selection = self.selection().range();
        self.cache
            .recompute_selection_geometry(&ctx, selection, self.buffer.caret());
        self.notify();
        Ok(())
    }

    /// A cache built from scratch for the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache line cannot be allocated.
    pub fn full_render_cache(&self) -> Result<RenderCache> {
        let ctx = render_context(
            self.buffer.as_bytes(),
            self.layout.index(),
            &self.metrics,
            &self.tabs,
            &self.viewport,
            self.layout.mode() == WrapMode::WordWrap,
        );
        let lh = self.metrics.line_height();
        RenderCache::full(
            &ctx,
            self.viewport.top_line(lh),
            self.viewport.visible_lines(lh, self.layout.line_count()),
        )
    }

    pub fn render_cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Visible lines in screen order.
    pub fn render_lines(&self) -> impl Iterator<Item = &RenderLine> {
        self.cache.lines()
    }

    pub fn selection_geometry(&self) -> &SelectionGeometry {
        self.cache.selection()
    }

    // ── Scrolling ──────────────────────────────────────────────────

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll(&mut self, axis: Axis, cmd: ScrollCommand) -> Result<()> {
        if axis == Axis::Horizontal && self.layout.mode() == WrapMode::WordWrap {
            return Ok(());
        }
        let limits = self.limits();
        self.viewport.scroll(axis, cmd, &limits);
        self.refresh()
    }

    /// Scrolls by a wheel delta in platform units.
    pub fn wheel(&mut self, delta: i32) -> Result<()> {
        let step = match self.options.wheel_lines {
            n if n > 0 => n * self.metrics.line_height(),
            _ => self.viewport.height(),
        };
        let limits = self.limits();
        self.viewport.wheel(delta, step, &limits);
        self.refresh()
    }

    /// Scrolls by the pointer's offset from the pan anchor.
    pub fn pan(&mut self, dx: i32, dy: i32) -> Result<()> {
        let vertical_only = self.layout.mode() == WrapMode::WordWrap;
        let limits = self.limits();
        self.viewport.pan(dx, dy, vertical_only, &limits);
        self.refresh()
    }

    pub fn cancel_pan(&mut self) {
        self.viewport.cancel_pan();
    }

    pub fn scroll_info(&self, axis: Axis) -> ScrollInfo {
        self.viewport.scroll_info(axis, &self.limits())
    }

    /// Scrolls the least amount that brings the caret into view.
    pub fn scroll_to_caret(&mut self) -> Result<()> {
        self.follow_caret();
        self.refresh()
    }

    pub(super) fn follow_caret(&mut self) {
        let limits = self.limits();
        let caret = self.buffer.caret();
        let line = self.layout.index().line_of(caret);
        self.viewport.scroll_to_line(line, &limits);
        if self.layout.mode() == WrapMode::Truncate {
            let m = Measurer::new(&self.metrics, &self.tabs);
            let x = caret::x_of(self.buffer.as_bytes(), self.layout.index(), line, caret, &m);
            self.viewport
                .scroll_to_x(x, self.metrics.max_char_width(), &limits);
        }
    }

    // ── Geometry ───────────────────────────────────────────────────

    /// Whether the cache slots match the viewport.
    fn cache_is_current(&self) -> bool {
        let lh = self.metrics.line_height();
        self.cache.dirty().is_none()
            && self.cache.top_line() == self.viewport.top_line(lh)
            && self.cache_scroll_x == self.viewport.scroll_x()
    }

    /// View coordinates of the caret's top-left corner, or `None` when it
    /// is off screen. In wrap mode x is clamped to the text width.
    pub fn caret_point(&self) -> Option<(i32, i32)> {
        let caret = self.buffer.caret();
        let line = self.layout.index().line_of(caret);
        let rl = self.cache.find(line)?;
        let x = rl.x_at(caret - rl.start)?;
        let x = match self.layout.mode() {
            WrapMode::WordWrap => x.min(self.viewport.width()),
            WrapMode::Truncate => x,
        };
        let lh = self.metrics.line_height();
        let y = (line - self.cache.top_line()) as i32 * lh - self.viewport.top_offset(lh);
        Some((x, y))
    }

    /// Display line under view y `y`, clamped to the document.
    pub(super) fn line_at_y(&self, y: i32) -> usize {
        let lh = self.metrics.line_height() as i64;
        let abs = self.viewport.scroll_y() + y as i64;
        let line = if abs < 0 { 0 } else { (abs / lh) as usize };
        line.min(self.layout.line_count() - 1)
    }

    /// Offset nearest to view point `(x, y)`.
    ///
    /// The line comes from the vertical position; within it the nearest
    /// glyph boundary wins. A point past the end of a wrapped or newline
    /// terminated line stays on that line.
    pub fn point_to_offset(&self, x: i32, y: i32) -> usize {
        let line = self.line_at_y(y);
        let text = self.buffer.as_bytes();
        let index = self.layout.index();
        match self.cache.find(line) {
            Some(rl) if self.cache_is_current() => caret::hit_cached(rl, text, index, x),
            _ => {
                let m = Measurer::new(&self.metrics, &self.tabs);
                caret::hit_measured(text, index, line, x + self.viewport.scroll_x(), &m)
            }
        }
    }
}
