//! Hard truncation: lines end at a newline or after a fixed byte count.

use super::LineBreak;

/// Finds where the line starting at `start` ends.
///
/// The break lands after the first newline within `cap` bytes, or after
/// exactly `cap` bytes. A line reaching the end of the text without
/// either is a soft end.
pub fn line_end(text: &[u8], start: usize, cap: usize) -> LineBreak {
    let limit = text.len().min(start + cap);
    if let Some(nl) = text[start..limit].iter().position(|&b| b == b'\n') {
        return LineBreak {
            end: start + nl + 1,
            hard: true,
        };
    }
    if limit - start == cap {
        LineBreak {
            end: limit,
            hard: true,
        }
    } else {
        LineBreak {
            end: limit,
            hard: false,
        }
    }
}
