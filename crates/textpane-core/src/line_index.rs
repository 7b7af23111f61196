/// Display line starts with a trailing sentinel.
///
/// `starts[0] == 0` and the last entry always equals the text length, so a
/// buffer of `n` display lines stores `n + 1` offsets. An empty buffer has
/// one empty line: `[0, 0]`.
use std::ops::Range;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LineIndex {
    /// Index of an empty buffer.
    pub fn new() -> Self {
        Self { starts: vec![0, 0] }
    }

    /// Wraps a precomputed start list.
    ///
    /// # Panics
    ///
    /// Panics if `starts` has fewer than two entries or does not begin at 0.
    pub fn from_starts(starts: Vec<usize>) -> Self {
        assert!(
            starts.len() >= 2 && starts[0] == 0,
            "line index needs a leading 0 and a sentinel, got {starts:?}"
        );
        Self { starts }
    }

    /// Number of display lines (always at least one).
    pub fn line_count(&self) -> usize {
        self.starts.len() - 1
    }

    /// All starts, sentinel included.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Text length recorded in the sentinel.
    pub fn text_len(&self) -> usize {
        self.starts[self.starts.len() - 1]
    }

    /// Byte offset where `line` begins.
    ///
    /// # Panics
    ///
    /// Panics if `line > line_count()`.
    pub fn start(&self, line: usize) -> usize {
        assert!(
            line < self.starts.len(),
            "line {line} out of bounds (index has {} lines)",
            self.line_count()
        );
        self.starts[line]
    }

    /// Byte range covered by `line`, including any trailing newline.
    pub fn line_range(&self, line: usize) -> Range<usize> {
        assert!(
            line < self.line_count(),
            "line {line} out of bounds (index has {} lines)",
            self.line_count()
        );
        self.starts[line]..self.starts[line + 1]
    }

    /// Last line whose start is `<= pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the sentinel.
    pub fn line_of(&self, pos: usize) -> usize {
        assert!(
            pos <= self.text_len(),
            "offset {pos} out of bounds (text has {} bytes)",
            self.text_len()
        );
        let line = self.starts.partition_point(|&s| s <= pos) - 1;
        line.min(self.line_count() - 1)
    }

    /// Shifts starts after an insertion of `len` bytes at `pos`.
    ///
    /// Starts strictly after `pos` move right; a start at `pos` keeps
    /// its place so inserted text joins the line beginning there.
    pub fn shift_for_insert(&mut self, pos: usize, len: usize) {
        let last = self.starts.len() - 1;
        let first = self.starts[..last].partition_point(|&s| s <= pos);
        for s in &mut self.starts[first..last] {
            *s += len;
        }
        self.starts[last] += len;
    }

    /// Drops starts inside `(pos, pos + len]` and shifts later ones left
    /// after `len` bytes were deleted at `pos`.
    pub fn shift_for_delete(&mut self, pos: usize, len: usize) {
        let last = self.starts.len() - 1;
        let first = self.starts[..last].partition_point(|&s| s <= pos);
        let past = self.starts[..last].partition_point(|&s| s <= pos + len);
        self.starts.drain(first..past);
        let last = self.starts.len() - 1;
        for s in &mut self.starts[first..last] {
            *s -= len;
        }
        self.starts[last] -= len;
    }

    /// Replaces the starts at `range` with `replacement`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot grow.
    pub fn splice(&mut self, range: Range<usize>, replacement: &[usize]) -> Result<()> {
        let removed = range.end - range.start;
        if replacement.len() > removed {
            self.starts
                .try_reserve(replacement.len() - removed)
                .context("Failed to grow line index")?;
        }
        self.starts.splice(range, replacement.iter().copied());
        Ok(())
    }

    /// Whether the index is well-formed for a text of `len` bytes: leading
    /// zero, sentinel equal to `len`, strictly increasing starts except
    /// that the last line may be empty.
    pub fn is_valid_for(&self, len: usize) -> bool {
        if self.starts.len() < 2 || self.starts[0] != 0 || self.text_len() != len {
            return false;
        }
        let n = self.starts.len();
        self.starts[..n - 1].windows(2).all(|w| w[0] < w[1]) && self.starts[n - 2] <= len
    }
}
