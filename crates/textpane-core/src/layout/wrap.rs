//! Greedy word wrap within a pixel budget.

use super::LineBreak;
use crate::metrics::Measurer;

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Finds where the wrapped line starting at `start` ends.
///
/// Glyphs are measured until one would end past `width`. The line then
/// breaks after the last blank run before that glyph; if the overflowing
/// glyph is itself blank, the whole blank run stays on this line. A word
/// with no blank before the overflow is split after the last glyph that
/// fits. A newline always ends the line, and so does reaching `cap`
/// bytes.
pub fn line_end(
    text: &[u8],
    start: usize,
    cap: usize,
    width: i32,
    measurer: &Measurer<'_>,
) -> LineBreak {
    let limit = text.len().min(start + cap);
    let mut x = 0;
    let mut last_blank = None;
    let mut i = start;

    while i < limit {
        let b = text[i];
        if b == b'\n' {
            return LineBreak {
                end: i + 1,
                hard: true,
            };
        }
        let adv = measurer.advance(b, x);
        if x + adv > width {
            if is_blank(b) {
                return after_blank_run(text, i, limit);
            }
            let end = match last_blank {
                Some(w) => w + 1,
                None => i.max(start + 1),
            };
            return LineBreak { end, hard: false };
        }
        x += adv;
        if is_blank(b) {
            last_blank = Some(i);
        }
        i += 1;
    }

    LineBreak {
        end: limit,
        hard: limit - start == cap,
    }
}

/// Skips the blank run starting at `i`, folding a following newline into
/// the same line.
fn after_blank_run(text: &[u8], mut i: usize, limit: usize) -> LineBreak {
    while i < limit && is_blank(text[i]) {
        i += 1;
    }
    if i < limit && text[i] == b'\n' {
        return LineBreak {
            end: i + 1,
            hard: true,
        };
    }
    LineBreak {
        end: i,
        hard: false,
    }
}
