/// Caret and selection state, word boundaries, and hit-testing.
use std::ops::Range;

use crate::line_index::LineIndex;
use crate::metrics::{hit_boundary, Measurer};
use crate::render_cache::RenderLine;

/// Anchor and caret of the selection. Equal offsets mean no selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub caret: usize,
}

impl Selection {
    pub fn new(anchor: usize, caret: usize) -> Self {
        Self { anchor, caret }
    }

    pub fn caret_only(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_active(&self) -> bool {
        self.anchor != self.caret
    }

    /// Sorted bounds, or `None` without a selection.
    pub fn range(&self) -> Option<Range<usize>> {
        self.is_active()
            .then(|| self.anchor.min(self.caret)..self.anchor.max(self.caret))
    }

    /// Whether the caret sits before the anchor.
    pub fn caret_first(&self) -> bool {
        self.caret < self.anchor
    }

    /// Clamps both ends to `len`.
    pub fn clamped(self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.caret.min(len))
    }
}

/// Word separators.
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

/// Next word start after `pos` (forward) or the start of the word at or
/// before `pos` (backward).
///
/// Forward skips the rest of the current word and then every separator
/// after it. Backward skips separators before `pos` and then the word.
pub fn skip_word(text: &[u8], pos: usize, forward: bool) -> usize {
    let mut p = pos.min(text.len());
    if forward {
        while p < text.len() && !is_space(text[p]) {
            p += 1;
        }
        while p < text.len() && is_space(text[p]) {
            p += 1;
        }
    } else {
        while p > 0 && is_space(text[p - 1]) {
            p -= 1;
        }
        while p > 0 && !is_space(text[p - 1]) {
            p -= 1;
        }
    }
    p
}

/// Start of the word containing `pos`. A position on a separator stays
/// where it is.
pub fn word_start(text: &[u8], pos: usize) -> usize {
    let mut p = pos.min(text.len());
    if p < text.len() && is_space(text[p]) {
        return p;
    }
    while p > 0 && !is_space(text[p - 1]) {
        p -= 1;
    }
    p
}

/// Offset the End key moves to on `line`: before the newline or wrap
/// point of a non-last line, or the end of the text.
pub fn line_end(index: &LineIndex, line: usize) -> usize {
    if line + 1 < index.line_count() {
        let range = index.line_range(line);
        (range.end - 1).max(range.start)
    } else {
        index.text_len()
    }
}

/// Keeps a hit on `line` from landing on the next line's first offset.
fn clamp_to_line(index: &LineIndex, line: usize, pos: usize) -> usize {
    pos.min(line_end(index, line))
}

/// Offset nearest to view x `x` on a cached line.
pub fn hit_cached(rl: &RenderLine, text: &[u8], index: &LineIndex, x: i32) -> usize {
    let col = if x < 0 && rl.first_visible > 0 {
        rl.first_visible
    } else {
        rl.first_visible + hit_boundary(rl.glyphs(text), -rl.lead_offset, x)
    };
    clamp_to_line(index, rl.line, rl.start + col)
}

/// Offset nearest to line-relative x `x` on `line`, measured afresh.
pub fn hit_measured(
    text: &[u8],
    index: &LineIndex,
    line: usize,
    x: i32,
    measurer: &Measurer<'_>,
) -> usize {
    let range = index.line_range(line);
    let bytes = &text[range.clone()];
    let glyphs = bytes.iter().copied().zip(measurer.advances(bytes));
    clamp_to_line(index, line, range.start + hit_boundary(glyphs, 0, x))
}

/// Line-relative x of `pos` on `line`, measured afresh.
pub fn x_of(text: &[u8], index: &LineIndex, line: usize, pos: usize, measurer: &Measurer<'_>) -> i32 {
    let start = index.start(line);
    measurer.width(&text[start..pos])
}
