//! System clipboard backed by arboard.

use anyhow::{Context, Result};
use textpane_core::Clipboard;

pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().context("Failed to open the system clipboard")?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(text).into_owned();
        self.inner
            .set_text(text)
            .context("Failed to write the system clipboard")
    }

    fn get_text(&mut self) -> Result<Option<Vec<u8>>> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(text.into_bytes())),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e).context("Failed to read the system clipboard"),
        }
    }
}
