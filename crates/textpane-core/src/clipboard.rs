//! Clipboard sink and newline conversion.
//!
//! Text leaves the editor with `\r\n` line endings and enters it with
//! `\n` only. The host supplies the actual clipboard through the
//! [`Clipboard`] trait.

use anyhow::Result;

/// An external clipboard holding bytes.
pub trait Clipboard {
    fn set_text(&mut self, text: &[u8]) -> Result<()>;

    /// Current contents, or `None` when the clipboard holds no text.
    fn get_text(&mut self) -> Result<Option<Vec<u8>>>;
}

/// In-process clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<Vec<u8>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &[u8]) -> Result<()> {
        self.contents = Some(text.to_vec());
        Ok(())
    }

    fn get_text(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents.clone())
    }
}

/// Expands every `\n` to `\r\n`.
pub fn to_crlf(text: &[u8]) -> Vec<u8> {
    let newlines = text.iter().filter(|&&b| b == b'\n').count();
    let mut out = Vec::with_capacity(text.len() + newlines);
    for &b in text {
        if b == b'\n' {
            out.push(b'\r');
        }
        out.push(b);
    }
    out
}

/// Turns `\r\n` and lone `\r` into `\n`.
pub fn normalize_newlines(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut bytes = text.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' {
            bytes.next_if_eq(&b'\n');
            out.push(b'\n');
        } else {
            out.push(b);
        }
    }
    out
}

/// Text of a NUL-terminated clipboard block whose reported length is
/// `size`. A block without the terminator at `size` is malformed and
/// reads as empty.
pub fn terminated_text(block: &[u8], size: usize) -> &[u8] {
    match block.get(size) {
        Some(0) => &block[..size],
        _ => {
            tracing::warn!(size, len = block.len(), "Clipboard text is not terminated; ignoring");
            &[]
        }
    }
}
