//! Font metrics, tab stops, and byte-run measurement.
//!
//! Every pixel width in the engine comes from a per-byte advance table,
//! so a glyph's width never depends on its neighbours. Newlines have no
//! width; tabs advance to the next tab stop.

/// Per-byte advance widths and vertical metrics for the active font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetrics {
    advances: [i32; 256],
    line_height: i32,
    max_char_width: i32,
    avg_char_width: i32,
}

impl FontMetrics {
    /// Every byte `char_width` pixels wide.
    pub fn monospace(char_width: i32, line_height: i32) -> Self {
        Self::from_table([char_width.max(1); 256], line_height)
    }

    /// Builds metrics from an explicit advance table.
    pub fn from_table(advances: [i32; 256], line_height: i32) -> Self {
        let advances = advances.map(|a| a.max(0));
        let max_char_width = advances.iter().copied().max().unwrap_or(0).max(1);
        let printable = &advances[0x20..0x7f];
        let avg = printable.iter().sum::<i32>() / printable.len() as i32;
        Self {
            advances,
            line_height: line_height.max(1),
            max_char_width,
            avg_char_width: avg.max(1),
        }
    }

    pub fn advance(&self, byte: u8) -> i32 {
        self.advances[byte as usize]
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    pub fn max_char_width(&self) -> i32 {
        self.max_char_width
    }

    /// Mean width of printable ASCII, used for the tab interval and
    /// horizontal line scrolling.
    pub fn avg_char_width(&self) -> i32 {
        self.avg_char_width
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::monospace(8, 16)
    }
}

/// Tab stop positions for one tab area.
///
/// Stops sit at multiples of `interval` below the area width, with one
/// final stop at the area width itself. Past the last stop, tabs advance
/// to the next multiple of `interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStops {
    stops: Vec<i32>,
    interval: i32,
}

impl TabStops {
    pub fn generate(interval: i32, area_width: i32) -> Self {
        let interval = interval.max(1);
        let mut stops = Vec::new();
        let mut dist = interval;
        while dist < area_width {
            stops.push(dist);
            dist += interval;
        }
        if area_width > 0 {
            stops.push(area_width);
        }
        Self { stops, interval }
    }

    /// Plain multiples of `interval` with no area stop.
    pub fn uniform(interval: i32) -> Self {
        Self {
            stops: Vec::new(),
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> i32 {
        self.interval
    }

    pub fn stops(&self) -> &[i32] {
        &self.stops
    }

    /// First stop strictly greater than `x`.
    pub fn next_stop(&self, x: i32) -> i32 {
        let i = self.stops.partition_point(|&s| s <= x);
        match self.stops.get(i) {
            Some(&s) => s,
            None => (x / self.interval + 1) * self.interval,
        }
    }
}

/// Measures runs of bytes against a font and a set of tab stops.
#[derive(Debug, Clone, Copy)]
pub struct Measurer<'a> {
    pub metrics: &'a FontMetrics,
    pub tabs: &'a TabStops,
}

impl<'a> Measurer<'a> {
    pub fn new(metrics: &'a FontMetrics, tabs: &'a TabStops) -> Self {
        Self { metrics, tabs }
    }

    /// Advance of `byte` when drawn at line-relative position `x`.
    pub fn advance(&self, byte: u8, x: i32) -> i32 {
        match byte {
            b'\n' => 0,
            b'\t' => self.tabs.next_stop(x) - x,
            b => self.metrics.advance(b),
        }
    }

    /// Width of `bytes` drawn from the start of a line.
    pub fn width(&self, bytes: &[u8]) -> i32 {
        bytes.iter().fold(0, |x, &b| x + self.advance(b, x))
    }

    /// Per-byte advances of `bytes` drawn from the start of a line.
    pub fn advances(&self, bytes: &[u8]) -> Vec<i32> {
        let mut x = 0;
        bytes
            .iter()
            .map(|&b| {
                let a = self.advance(b, x);
                x += a;
                a
            })
            .collect()
    }
}

/// Maps a line-relative x coordinate to the nearest glyph boundary.
///
/// Walks `(byte, advance)` pairs starting at `origin` and returns how many
/// bytes lie before the hit. A point past a glyph's midpoint lands after
/// it. Stops before a newline.
pub fn hit_boundary(glyphs: impl Iterator<Item = (u8, i32)>, origin: i32, target: i32) -> usize {
    let mut x = origin;
    let mut count = 0;
    for (byte, adv) in glyphs {
        if byte == b'\n' {
            return count;
        }
        if x + adv >= target {
            return if target - x > adv / 2 { count + 1 } else { count };
        }
        x += adv;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── FontMetrics ────────────────────────────────────────────────

    #[test]
    fn test_monospace_metrics() {
        let m = FontMetrics::monospace(7, 14);
        assert_eq!(m.advance(b'a'), 7);
        assert_eq!(m.max_char_width(), 7);
        assert_eq!(m.avg_char_width(), 7);
        assert_eq!(m.line_height(), 14);
    }

    #[test]
    fn test_table_metrics_max_and_avg() {
        let mut table = [10; 256];
        table[b'W' as usize] = 20;
        let m = FontMetrics::from_table(table, 16);
        assert_eq!(m.max_char_width(), 20);
        assert_eq!(m.advance(b'W'), 20);
        assert_eq!(m.avg_char_width(), 10);
    }

    // ── TabStops ───────────────────────────────────────────────────

    #[test]
    fn test_generate_ends_with_area_width() {
        let tabs = TabStops::generate(64, 150);
        assert_eq!(tabs.stops(), &[64, 128, 150]);
    }

    #[test]
    fn test_generate_area_on_multiple() {
        let tabs = TabStops::generate(50, 100);
        assert_eq!(tabs.stops(), &[50, 100]);
    }

    #[test]
    fn test_next_stop_past_last_uses_interval() {
        let tabs = TabStops::generate(64, 150);
        assert_eq!(tabs.next_stop(0), 64);
        assert_eq!(tabs.next_stop(64), 128);
        assert_eq!(tabs.next_stop(130), 150);
        assert_eq!(tabs.next_stop(150), 192);
        assert_eq!(tabs.next_stop(200), 256);
    }

    // ── Measurer ───────────────────────────────────────────────────

    #[test]
    fn test_width_resolves_tabs() {
        let metrics = FontMetrics::monospace(8, 16);
        let tabs = TabStops::uniform(64);
        let m = Measurer::new(&metrics, &tabs);
        assert_eq!(m.width(b"ab\tc"), 64 + 8);
        assert_eq!(m.advances(b"ab\tc"), vec![8, 8, 48, 8]);
    }

    #[test]
    fn test_newline_has_no_width() {
        let metrics = FontMetrics::monospace(8, 16);
        let tabs = TabStops::uniform(64);
        let m = Measurer::new(&metrics, &tabs);
        assert_eq!(m.width(b"ab\n"), 16);
    }

    // ── hit_boundary ───────────────────────────────────────────────

    fn glyphs(text: &[u8]) -> impl Iterator<Item = (u8, i32)> + '_ {
        text.iter().map(|&b| (b, 10))
    }

    #[test]
    fn test_hit_rounds_to_nearest_boundary() {
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 0), 0);
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 4), 0);
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 5), 0);
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 6), 1);
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 14), 1);
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 16), 2);
    }

    #[test]
    fn test_hit_past_end_and_newline() {
        assert_eq!(hit_boundary(glyphs(b"abcd"), 0, 500), 4);
        assert_eq!(hit_boundary(glyphs(b"ab\ncd"), 0, 500), 2);
    }

    #[test]
    fn test_hit_with_negative_origin() {
        // First drawn glyph starts 4px left of the view.
        assert_eq!(hit_boundary(glyphs(b"abcd"), -4, 0), 0);
        assert_eq!(hit_boundary(glyphs(b"abcd"), -4, 2), 1);
    }
}
