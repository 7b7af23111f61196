/// Flat byte buffer with a caret, grown in fixed increments.
use std::fmt;

use anyhow::{Context, Result};

/// Default capacity increment in bytes.
pub const DEFAULT_GROWTH: usize = 1000;

/// A contiguous, gap-free text buffer.
///
/// Invariant: `caret <= len <= capacity`.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    bytes: Vec<u8>,
    caret: usize,
    growth: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_GROWTH)
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec(), DEFAULT_GROWTH)
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

impl TextBuffer {
    /// Creates an empty buffer growing by `growth` bytes at a time.
    pub fn new(growth: usize) -> Self {
        Self {
            bytes: Vec::new(),
            caret: 0,
            growth: growth.max(1),
        }
    }

    /// Takes ownership of caller-supplied bytes. The caret starts at 0.
    pub fn from_bytes(bytes: Vec<u8>, growth: usize) -> Self {
        Self {
            bytes,
            caret: 0,
            growth: growth.max(1),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn growth(&self) -> usize {
        self.growth
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Moves the caret.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the end of the text.
    pub fn set_caret(&mut self, pos: usize) {
        assert!(
            pos <= self.bytes.len(),
            "caret {pos} out of bounds (buffer has {} bytes)",
            self.bytes.len()
        );
        self.caret = pos;
    }

    /// Returns the byte at `pos`, or `None` at or past the end.
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    /// Returns the bytes in `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        assert!(
            start <= end && end <= self.bytes.len(),
            "range {start}..{end} out of bounds (buffer has {} bytes)",
            self.bytes.len()
        );
        &self.bytes[start..end]
    }

    /// Ensures room for `additional` more bytes, growing to the next
    /// multiple of the growth increment.
    fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.bytes.len() + additional;
        if needed <= self.bytes.capacity() {
            return Ok(());
        }
        let target = (needed / self.growth + 1) * self.growth;
        self.bytes
            .try_reserve_exact(target - self.bytes.len())
            .with_context(|| format!("Failed to grow text buffer to {target} bytes"))?;
        tracing::debug!("Text buffer grown to {} bytes", self.bytes.capacity());
        Ok(())
    }

    /// Inserts `data` at `pos`, shifting trailing bytes right.
    ///
    /// A caret at or after `pos` moves right by `data.len()`, so inserting
    /// at the caret advances it past the new text.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot grow; the buffer is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the end of the text.
    pub fn insert(&mut self, pos: usize, data: &[u8]) -> Result<()> {
        assert!(
            pos <= self.bytes.len(),
            "insert position {pos} out of bounds (buffer has {} bytes)",
            self.bytes.len()
        );
        if data.is_empty() {
            return Ok(());
        }
        self.reserve(data.len())?;
        self.bytes.splice(pos..pos, data.iter().copied());
        if self.caret >= pos {
            self.caret += data.len();
        }
        Ok(())
    }

    /// Replaces the byte at `pos` in place and returns the old byte.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not inside the text.
    pub fn overwrite(&mut self, pos: usize, byte: u8) -> u8 {
        assert!(
            pos < self.bytes.len(),
            "overwrite position {pos} out of bounds (buffer has {} bytes)",
            self.bytes.len()
        );
        std::mem::replace(&mut self.bytes[pos], byte)
    }

    /// Removes the bytes between `p1` and `p2` (in either order) and
    /// returns them.
    ///
    /// A caret inside the range moves to its start; a caret after it
    /// shifts left by the removed length.
    ///
    /// # Panics
    ///
    /// Panics if either bound is past the end of the text.
    pub fn remove(&mut self, p1: usize, p2: usize) -> Vec<u8> {
        let (start, end) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        assert!(
            end <= self.bytes.len(),
            "remove range {start}..{end} out of bounds (buffer has {} bytes)",
            self.bytes.len()
        );
        let removed: Vec<u8> = self.bytes.drain(start..end).collect();
        if self.caret >= end {
            self.caret -= end - start;
        } else if self.caret > start {
            self.caret = start;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buf = TextBuffer::default();
        assert!(buf.is_empty());
        assert_eq!(buf.caret(), 0);
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn test_insert_at_caret_advances_caret() {
        let mut buf = TextBuffer::from("hello");
        buf.set_caret(5);
        buf.insert(5, b" world").unwrap();
        assert_eq!(buf.to_string(), "hello world");
        assert_eq!(buf.caret(), 11);
    }

    #[test]
    fn test_insert_after_caret_leaves_caret() {
        let mut buf = TextBuffer::from("abc");
        buf.set_caret(1);
        buf.insert(2, b"XY").unwrap();
        assert_eq!(buf.to_string(), "abXYc");
        assert_eq!(buf.caret(), 1);
    }

    #[test]
    fn test_capacity_grows_in_increments() {
        let mut buf = TextBuffer::new(16);
        buf.insert(0, b"a").unwrap();
        assert_eq!(buf.capacity(), 16);
        buf.insert(1, &[b'b'; 15]).unwrap();
        assert_eq!(buf.capacity(), 16);
        buf.insert(16, b"c").unwrap();
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.len(), 17);
    }

    #[test]
    fn test_remove_unordered_bounds() {
        let mut buf = TextBuffer::from("abc\ndef\nghi");
        let removed = buf.remove(9, 2);
        assert_eq!(removed, b"c\ndef\ng");
        assert_eq!(buf.to_string(), "abhi");
    }

    #[test]
    fn test_remove_clamps_caret_inside_range() {
        let mut buf = TextBuffer::from("0123456789");
        buf.set_caret(5);
        buf.remove(3, 7);
        assert_eq!(buf.caret(), 3);
    }

    #[test]
    fn test_remove_shifts_caret_after_range() {
        let mut buf = TextBuffer::from("0123456789");
        buf.set_caret(9);
        buf.remove(3, 7);
        assert_eq!(buf.caret(), 5);
        assert_eq!(buf.to_string(), "012789");
    }

    #[test]
    fn test_overwrite_returns_old_byte() {
        let mut buf = TextBuffer::from("abc");
        assert_eq!(buf.overwrite(1, b'X'), b'b');
        assert_eq!(buf.to_string(), "aXc");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_insert_past_end_panics() {
        let mut buf = TextBuffer::from("abc");
        let _ = buf.insert(4, b"x");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_remove_past_end_panics() {
        let mut buf = TextBuffer::from("abc");
        buf.remove(1, 10);
    }

    #[test]
    fn test_byte_at_end_is_none() {
        let buf = TextBuffer::from("ab");
        assert_eq!(buf.byte_at(1), Some(b'b'));
        assert_eq!(buf.byte_at(2), None);
    }
}
