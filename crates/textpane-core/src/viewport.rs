//! Scroll position and the mapping between display lines and pixels.
//!
//! The vertical position is kept in pixels, so the top line can be
//! partially hidden. `top_line` and `top_offset` are derived from it.
//! Wheel and pan input carry fractional remainders across calls in
//! explicit fields.

/// Platform wheel units per notch.
pub const WHEEL_DELTA: i32 = 120;

/// Half-width of the pan dead zone around the anchor, in pixels.
pub const PAN_DEAD_ZONE: i32 = 16;

/// Pan distance is divided by this before scrolling.
pub const PAN_SPEED_DIVISOR: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Scrollbar-style commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    /// Absolute pixel position from a thumb drag.
    Thumb(i64),
}

/// Document extents a scroll is clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollLimits {
    pub line_count: usize,
    pub line_height: i32,
    /// Widest line in pixels; 0 disables horizontal scrolling.
    pub longest_line: i32,
    /// Horizontal distance of one line step.
    pub char_width: i32,
}

/// Range, page, and position of one scrollbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollInfo {
    pub range: i64,
    pub page: i64,
    pub pos: i64,
}

/// Remainders of pan distances that did not make a whole pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanState {
    pub mod_x: i32,
    pub mod_y: i32,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    width: i32,
    height: i32,
    scroll_y: i64,
    scroll_x: i32,
    wheel_remainder: i32,
    pan: PanState,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(0),
            scroll_y: 0,
            scroll_x: 0,
            wheel_remainder: 0,
            pan: PanState::default(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    pub fn scroll_x(&self) -> i32 {
        self.scroll_x
    }

    pub fn pan_state(&self) -> PanState {
        self.pan
    }

    pub fn wheel_remainder(&self) -> i32 {
        self.wheel_remainder
    }

    /// Sets the text area size. The scroll position is left for the
    /// caller to clamp once the layout matches the new width.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(1);
        self.height = height.max(0);
    }

    /// First display line at least partly on screen.
    pub fn top_line(&self, line_height: i32) -> usize {
        (self.scroll_y / line_height.max(1) as i64) as usize
    }

    /// Pixels of the top line hidden above the view.
    pub fn top_offset(&self, line_height: i32) -> i32 {
        (self.scroll_y % line_height.max(1) as i64) as i32
    }

    /// Number of display lines at least partly on screen.
    pub fn visible_lines(&self, line_height: i32, line_count: usize) -> usize {
        let lh = line_height.max(1);
        let fit = (self.height + self.top_offset(lh) + lh - 1) / lh;
        let remaining = line_count.saturating_sub(self.top_line(lh));
        (fit.max(0) as usize).min(remaining)
    }

    pub fn max_scroll_y(&self, limits: &ScrollLimits) -> i64 {
        let full = limits.line_count as i64 * limits.line_height as i64;
        (full - self.height as i64).max(0)
    }

    pub fn max_scroll_x(&self, limits: &ScrollLimits) -> i32 {
        (limits.longest_line - self.width).max(0)
    }

    /// Moves to vertical pixel `y`, clamped. Returns whether it moved.
    pub fn set_scroll_y(&mut self, y: i64, limits: &ScrollLimits) -> bool {
        let y = y.clamp(0, self.max_scroll_y(limits));
        let moved = y != self.scroll_y;
        self.scroll_y = y;
        moved
    }

    /// Moves to horizontal pixel `x`, clamped. Returns whether it moved.
    pub fn set_scroll_x(&mut self, x: i32, limits: &ScrollLimits) -> bool {
        let x = x.clamp(0, self.max_scroll_x(limits));
        let moved = x != self.scroll_x;
        self.scroll_x = x;
        moved
    }

    /// Re-applies the limits, e.g. after the document shrank.
    pub fn clamp(&mut self, limits: &ScrollLimits) -> bool {
        let y = self.set_scroll_y(self.scroll_y, limits);
        let x = self.set_scroll_x(self.scroll_x, limits);
        y || x
    }

    pub fn scroll(&mut self, axis: Axis, cmd: ScrollCommand, limits: &ScrollLimits) -> bool {
        match axis {
            Axis::Vertical => {
                let line = limits.line_height as i64;
                let page = self.height as i64;
                let y = match cmd {
                    ScrollCommand::LineUp => self.scroll_y - line,
                    ScrollCommand::LineDown => self.scroll_y + line,
                    ScrollCommand::PageUp => self.scroll_y - page,
                    ScrollCommand::PageDown => self.scroll_y + page,
                    ScrollCommand::Top => 0,
                    ScrollCommand::Bottom => self.max_scroll_y(limits),
                    ScrollCommand::Thumb(pos) => pos,
                };
                self.set_scroll_y(y, limits)
            }
            Axis::Horizontal => {
                let x = self.scroll_x as i64;
                let line = limits.char_width as i64;
                let page = self.width as i64;
                let x = match cmd {
                    ScrollCommand::LineUp => x - line,
                    ScrollCommand::LineDown => x + line,
                    ScrollCommand::PageUp => x - page,
                    ScrollCommand::PageDown => x + page,
                    ScrollCommand::Top => 0,
                    ScrollCommand::Bottom => self.max_scroll_x(limits) as i64,
                    ScrollCommand::Thumb(pos) => pos,
                };
                self.set_scroll_x(x.clamp(0, i32::MAX as i64) as i32, limits)
            }
        }
    }

    /// Scrolls by a wheel `delta` in platform units, where one notch of
    /// [`WHEEL_DELTA`] moves `step` pixels. Partial notches accumulate.
    /// A single call never moves more than one page.
    pub fn wheel(&mut self, delta: i32, step: i32, limits: &ScrollLimits) -> bool {
        let total = -(delta as i64) * step as i64 + self.wheel_remainder as i64;
        self.wheel_remainder = (total % WHEEL_DELTA as i64) as i32;
        let page = self.height as i64;
        let px = (total / WHEEL_DELTA as i64).clamp(-page, page);
        self.set_scroll_y(self.scroll_y + px, limits)
    }

    /// Scrolls by the pointer's distance from the pan anchor.
    ///
    /// Distances inside the dead zone are ignored. The rest is divided by
    /// [`PAN_SPEED_DIVISOR`], carrying the remainder to the next call. With
    /// `vertical_only` (word wrap) `dx` is ignored.
    pub fn pan(&mut self, dx: i32, dy: i32, vertical_only: bool, limits: &ScrollLimits) -> bool {
        let mut moved = false;
        if !vertical_only {
            let step = pan_step(dx, &mut self.pan.mod_x);
            if step != 0 {
                moved |= self.set_scroll_x(self.scroll_x.saturating_add(step), limits);
            }
        }
        let step = pan_step(dy, &mut self.pan.mod_y);
        if step != 0 {
            moved |= self.set_scroll_y(self.scroll_y + step as i64, limits);
        }
        moved
    }

    pub fn cancel_pan(&mut self) {
        self.pan = PanState::default();
    }

    /// Scrolls the least amount that puts all of `line` on screen.
    pub fn scroll_to_line(&mut self, line: usize, limits: &ScrollLimits) -> bool {
        let lh = limits.line_height as i64;
        let top = line as i64 * lh;
        let bottom = top + lh;
        if top < self.scroll_y {
            self.set_scroll_y(top, limits)
        } else if bottom > self.scroll_y + self.height as i64 {
            self.set_scroll_y(bottom - self.height as i64, limits)
        } else {
            false
        }
    }

    /// Scrolls horizontally so that pixel `x` (line-relative) and `margin`
    /// pixels after it are on screen.
    pub fn scroll_to_x(&mut self, x: i32, margin: i32, limits: &ScrollLimits) -> bool {
        if x < self.scroll_x {
            self.set_scroll_x(x, limits)
        } else if x + margin > self.scroll_x + self.width {
            self.set_scroll_x(x + margin - self.width, limits)
        } else {
            false
        }
    }

    pub fn scroll_info(&self, axis: Axis, limits: &ScrollLimits) -> ScrollInfo {
        match axis {
            Axis::Vertical => ScrollInfo {
                range: limits.line_count as i64 * limits.line_height as i64,
                page: self.height as i64,
                pos: self.scroll_y,
            },
            Axis::Horizontal => ScrollInfo {
                range: limits.longest_line as i64,
                page: self.width as i64,
                pos: self.scroll_x as i64,
            },
        }
    }
}

/// Pixels to scroll for a pan distance `d`, updating the remainder.
fn pan_step(d: i32, remainder: &mut i32) -> i32 {
    let d = if d.abs() <= PAN_DEAD_ZONE {
        return 0;
    } else {
        d - PAN_DEAD_ZONE * d.signum()
    };
    *remainder += d % PAN_SPEED_DIVISOR;
    let mut step = d / PAN_SPEED_DIVISOR;
    if *remainder >= PAN_SPEED_DIVISOR {
        *remainder -= PAN_SPEED_DIVISOR;
        step += 1;
    } else if *remainder <= -PAN_SPEED_DIVISOR {
        *remainder += PAN_SPEED_DIVISOR;
        step -= 1;
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(lines: usize) -> ScrollLimits {
        ScrollLimits {
            line_count: lines,
            line_height: 16,
            longest_line: 500,
            char_width: 8,
        }
    }

    #[test]
    fn test_top_line_and_offset() {
        let mut vp = Viewport::new(200, 100);
        vp.set_scroll_y(40, &limits(100));
        assert_eq!(vp.top_line(16), 2);
        assert_eq!(vp.top_offset(16), 8);
        // 100px + 8px hidden needs 7 lines.
        assert_eq!(vp.visible_lines(16, 100), 7);
        assert_eq!(vp.visible_lines(16, 5), 3);
    }

    #[test]
    fn test_scroll_commands_clamp() {
        let l = limits(20);
        let mut vp = Viewport::new(200, 100);
        assert!(!vp.scroll(Axis::Vertical, ScrollCommand::LineUp, &l));
        assert!(vp.scroll(Axis::Vertical, ScrollCommand::PageDown, &l));
        assert_eq!(vp.scroll_y(), 100);
        vp.scroll(Axis::Vertical, ScrollCommand::Bottom, &l);
        assert_eq!(vp.scroll_y(), 20 * 16 - 100);
        vp.scroll(Axis::Vertical, ScrollCommand::Thumb(10_000), &l);
        assert_eq!(vp.scroll_y(), 220);
        vp.scroll(Axis::Vertical, ScrollCommand::Top, &l);
        assert_eq!(vp.scroll_y(), 0);
    }

    #[test]
    fn test_short_document_does_not_scroll() {
        let mut vp = Viewport::new(200, 100);
        assert!(!vp.scroll(Axis::Vertical, ScrollCommand::PageDown, &limits(3)));
        assert_eq!(vp.scroll_y(), 0);
    }

    #[test]
    fn test_horizontal_scroll_uses_char_width() {
        let l = limits(1);
        let mut vp = Viewport::new(200, 100);
        vp.scroll(Axis::Horizontal, ScrollCommand::LineDown, &l);
        assert_eq!(vp.scroll_x(), 8);
        vp.scroll(Axis::Horizontal, ScrollCommand::Bottom, &l);
        assert_eq!(vp.scroll_x(), 300);
    }

    #[test]
    fn test_wheel_accumulates_partial_notches() {
        let l = limits(100);
        let mut vp = Viewport::new(200, 100);
        // Three lines per notch: 48px. Half a notch scrolls 24px.
        vp.wheel(-60, 48, &l);
        assert_eq!(vp.scroll_y(), 24);
        vp.wheel(-1, 48, &l);
        assert_eq!(vp.scroll_y(), 24);
        assert_eq!(vp.wheel_remainder(), 48);
        vp.wheel(-2, 48, &l);
        assert_eq!(vp.scroll_y(), 25);
    }

    #[test]
    fn test_wheel_clamped_to_one_page() {
        let l = limits(1000);
        let mut vp = Viewport::new(200, 100);
        vp.wheel(-1200, 48, &l);
        assert_eq!(vp.scroll_y(), 100);
    }

    #[test]
    fn test_pan_dead_zone_and_divisor() {
        let l = limits(1000);
        let mut vp = Viewport::new(200, 100);
        assert!(!vp.pan(10, 16, false, &l));
        // 23 - 16 = 7: one pixel, remainder 3.
        vp.pan(0, 23, false, &l);
        assert_eq!(vp.scroll_y(), 1);
        assert_eq!(vp.pan_state().mod_y, 3);
        // Another 7: remainder reaches 6, carries one.
        vp.pan(0, 23, false, &l);
        assert_eq!(vp.scroll_y(), 3);
        assert_eq!(vp.pan_state().mod_y, 2);
        vp.cancel_pan();
        assert_eq!(vp.pan_state(), PanState::default());
    }

    #[test]
    fn test_pan_vertical_only_ignores_x() {
        let l = limits(1000);
        let mut vp = Viewport::new(200, 100);
        vp.pan(100, 0, true, &l);
        assert_eq!(vp.scroll_x(), 0);
        vp.pan(100, 0, false, &l);
        assert_eq!(vp.scroll_x(), 21);
    }

    #[test]
    fn test_scroll_to_line_is_minimal() {
        let l = limits(100);
        let mut vp = Viewport::new(200, 100);
        assert!(!vp.scroll_to_line(5, &l));
        assert!(vp.scroll_to_line(6, &l));
        assert_eq!(vp.scroll_y(), 7 * 16 - 100);
        assert!(vp.scroll_to_line(0, &l));
        assert_eq!(vp.scroll_y(), 0);
    }

    #[test]
    fn test_scroll_info() {
        let l = limits(10);
        let vp = Viewport::new(200, 100);
        assert_eq!(
            vp.scroll_info(Axis::Vertical, &l),
            ScrollInfo { range: 160, page: 100, pos: 0 }
        );
        assert_eq!(vp.scroll_info(Axis::Horizontal, &l).range, 500);
    }
}
