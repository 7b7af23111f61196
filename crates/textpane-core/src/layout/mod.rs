//! Line breaking: maintains the line index under edits.
//!
//! Two interchangeable strategies produce display lines: hard truncation
//! (`truncate`) and word wrap (`wrap`). Both are expressed as a single
//! `line_end` step, so the full rebuild and the incremental relayout share
//! one loop. After an edit only the lines from just before the edit up to
//! the first break that lands on an unchanged old line start are relaid.

pub mod truncate;
pub mod wrap;

use anyhow::{Context, Result};

use crate::line_index::LineIndex;
use crate::metrics::{Measurer, TabStops};

/// Default byte cap for a single display line.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Global line-breaking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Truncate,
    WordWrap,
}

/// End of one display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBreak {
    /// Offset where the next line would start.
    pub end: usize,
    /// Whether the line ended at a newline or the byte cap rather than by
    /// running out of text or width. A hard break at the end of the text
    /// leaves an empty last line.
    pub hard: bool,
}

/// A text mutation, in post-edit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert { pos: usize, len: usize },
    Delete { pos: usize, len: usize },
    /// `len` bytes at `pos` were overwritten in place.
    Replace { pos: usize, len: usize },
}

/// Outcome of an incremental relayout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relayout {
    /// First line whose content may have changed.
    pub first_line: usize,
    /// Last relaid line, in the new numbering.
    pub last_line: usize,
    pub old_line_count: usize,
    pub new_line_count: usize,
}

impl Relayout {
    pub fn count_changed(&self) -> bool {
        self.old_line_count != self.new_line_count
    }
}

/// Owns the line index together with the parameters that shape it.
#[derive(Debug, Clone)]
pub struct Layout {
    mode: WrapMode,
    max_line_len: usize,
    wrap_width: i32,
    index: LineIndex,
    /// Natural pixel width of each line; kept in truncation mode only.
    widths: Vec<i32>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(WrapMode::Truncate, DEFAULT_MAX_LINE_LEN, 1)
    }
}

fn push_start(starts: &mut Vec<usize>, start: usize) -> Result<()> {
    starts.try_reserve(1).context("Failed to grow line index")?;
    starts.push(start);
    Ok(())
}

/// Whether the line ending at `start` was split inside a word.
fn ends_mid_word(text: &[u8], start: usize) -> bool {
    !matches!(text[start - 1], b' ' | b'\t' | b'\n')
}

impl Layout {
    pub fn new(mode: WrapMode, max_line_len: usize, wrap_width: i32) -> Self {
        Self {
            mode,
            max_line_len: max_line_len.max(1),
            wrap_width: wrap_width.max(1),
            index: LineIndex::new(),
            widths: vec![0],
        }
    }

    pub fn mode(&self) -> WrapMode {
        self.mode
    }

    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    pub fn wrap_width(&self) -> i32 {
        self.wrap_width
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// Updates the breaking parameters. Returns true when the existing
    /// index no longer matches them and a full rebuild is required.
    pub fn configure(&mut self, mode: WrapMode, max_line_len: usize, wrap_width: i32) -> bool {
        let max_line_len = max_line_len.max(1);
        let wrap_width = wrap_width.max(1);
        let changed = mode != self.mode
            || max_line_len != self.max_line_len
            || (mode == WrapMode::WordWrap && wrap_width != self.wrap_width);
        self.mode = mode;
        self.max_line_len = max_line_len;
        self.wrap_width = wrap_width;
        changed
    }

    /// Widest line measured with uniform tab stops, in truncation mode.
    /// Always 0 in word-wrap mode.
    pub fn longest_line(&self) -> i32 {
        self.widths.iter().copied().max().unwrap_or(0)
    }

    /// Ends the line starting at `start` using the current strategy.
    pub fn line_end(&self, text: &[u8], start: usize, measurer: &Measurer<'_>) -> LineBreak {
        match self.mode {
            WrapMode::Truncate => truncate::line_end(text, start, self.max_line_len),
            WrapMode::WordWrap => {
                wrap::line_end(text, start, self.max_line_len, self.wrap_width, measurer)
            }
        }
    }

    /// Recomputes the whole index from scratch.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be allocated; the previous
    /// index is kept.
    pub fn rebuild(&mut self, text: &[u8], measurer: &Measurer<'_>) -> Result<()> {
        let size = text.len();
        let mut starts = vec![0];
        let mut cur = 0;
        while cur < size {
            let brk = self.line_end(text, cur, measurer);
            if brk.end == size && !brk.hard {
                break;
            }
            push_start(&mut starts, brk.end)?;
            cur = brk.end;
        }
        push_start(&mut starts, size)?;
        let index = LineIndex::from_starts(starts);
        let widths = self.measure_lines(text, &index, 0..index.line_count(), measurer)?;
        self.index = index;
        self.widths = widths;
        tracing::debug!(
            mode = ?self.mode,
            lines = self.index.line_count(),
            "Full relayout"
        );
        Ok(())
    }

    /// Brings the index up to date after `edit` has been applied to `text`.
    ///
    /// Line starts after the edit are shifted by the byte delta first. The
    /// scan then restarts at the line containing the edit (one line earlier
    /// in word-wrap mode, since an edit can pull a word back onto the
    /// previous line, and two lines earlier when that line was split
    /// mid-word) and stops as soon as a produced break coincides with
    /// a shifted start past the edit: from there on the old layout holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot grow. The index is then stale
    /// and the caller must rebuild it.
    pub fn apply_edit(
        &mut self,
        text: &[u8],
        edit: TextEdit,
        measurer: &Measurer<'_>,
    ) -> Result<Relayout> {
        let old_line_count = self.index.line_count();
        let (pos, edit_end) = match edit {
            TextEdit::Insert { pos, len } => {
                self.index.shift_for_insert(pos, len);
                (pos, pos + len)
            }
            TextEdit::Delete { pos, len } => {
                self.index.shift_for_delete(pos, len);
                (pos, pos)
            }
            TextEdit::Replace { pos, len } => (pos, pos + len),
        };
        debug_assert_eq!(self.index.text_len(), text.len());

        let edit_line = self.index.line_of(pos);
        let starts = self.index.starts();
        let first_line = match self.mode {
            WrapMode::Truncate => edit_line,
            WrapMode::WordWrap if edit_line >= 2 && ends_mid_word(text, starts[edit_line]) => {
                // The line two above overflowed on the first glyph of the
                // edit line.
                edit_line - 2
            }
            WrapMode::WordWrap => edit_line.saturating_sub(1),
        };

        let size = text.len();
        let sentinel = starts.len() - 1;
        let mut cur = starts[first_line];
        let mut produced = Vec::new();
        let mut j = first_line + 1;
        let mut resync = None;
        while cur < size {
            let brk = self.line_end(text, cur, measurer);
            if brk.end == size && !brk.hard {
                break;
            }
            while j < sentinel && starts[j] < brk.end {
                j += 1;
            }
            if j < sentinel && starts[j] == brk.end && brk.end > edit_end {
                resync = Some(j);
                break;
            }
            push_start(&mut produced, brk.end)?;
            cur = brk.end;
        }

        let (splice_end, tail_lines) = match resync {
            Some(j) => (j, sentinel - j),
            None => {
                push_start(&mut produced, size)?;
                (sentinel + 1, 0)
            }
        };
        self.index.splice(first_line + 1..splice_end, &produced)?;

        let new_line_count = self.index.line_count();
        let last_line = new_line_count - 1 - tail_lines;
        let widths = self.measure_lines(text, &self.index, first_line..last_line + 1, measurer)?;
        let old_tail_start = old_line_count - tail_lines;
        if self.mode == WrapMode::Truncate {
            self.widths.splice(first_line..old_tail_start, widths);
        }

        tracing::trace!(
            first_line,
            last_line,
            old_line_count,
            new_line_count,
            "Incremental relayout"
        );
        Ok(Relayout {
            first_line,
            last_line,
            old_line_count,
            new_line_count,
        })
    }

    /// Natural widths of `lines`, in truncation mode; empty otherwise.
    fn measure_lines(
        &self,
        text: &[u8],
        index: &LineIndex,
        lines: std::ops::Range<usize>,
        measurer: &Measurer<'_>,
    ) -> Result<Vec<i32>> {
        if self.mode != WrapMode::Truncate {
            return Ok(Vec::new());
        }
        let tabs = TabStops::uniform(measurer.tabs.interval());
        let natural = Measurer::new(measurer.metrics, &tabs);
        let mut widths = Vec::new();
        widths
            .try_reserve(lines.len())
            .context("Failed to grow line widths")?;
        for line in lines {
            let range = index.line_range(line);
            widths.push(natural.width(&text[range]));
        }
        Ok(widths)
    }
}
