/// Linear undo/redo log with a cursor.
///
/// Entries `[0, current)` are undoable, entries `[current, len)` are
/// redoable. Recording a new entry discards everything past the cursor.
use anyhow::{Context, Result};

use crate::config::HistoryConfig;
use crate::operation::{Merge, UndoEntry};

/// Manages undo/redo history for a single editor.
pub struct UndoManager {
    entries: Vec<UndoEntry>,
    /// Number of applied entries; the next undo targets `entries[current - 1]`.
    current: usize,
    /// Merge kind of the last recorded entry while its session is open.
    session: Option<Merge>,
    /// Whether recording is active (false while undo/redo replay).
    recording: bool,
    config: HistoryConfig,
}

impl std::fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("len", &self.entries.len())
            .field("current", &self.current)
            .field("session", &self.session)
            .field("recording", &self.recording)
            .finish()
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoManager {
    /// Creates an empty manager.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            session: None,
            recording: true,
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Records an edit.
    ///
    /// Drops any redoable entries first. While the session opened by the
    /// previous entry has the same `merge` kind and `entry` is adjacent in
    /// the right direction, the edit is folded into that entry instead.
    ///
    /// # Errors
    ///
    /// Returns an error if growing the entry storage fails; the log is left
    /// unchanged in that case.
    pub fn record(&mut self, entry: UndoEntry, merge: Merge) -> Result<()> {
        if !self.recording {
            return Ok(());
        }

        if self.current == self.entries.len() && self.session == Some(merge) {
            if let Some(last) = self.entries.last_mut() {
                if last.absorb(&entry, merge) {
                    return Ok(());
                }
            }
        }

        self.reserve()?;
        self.truncate_redo();
        self.entries.push(entry);
        self.current = self.entries.len();
        self.session = match merge {
            Merge::Never => None,
            m => Some(m),
        };

        let depth = self.config.max_history_depth;
        if depth > 0 && self.entries.len() > depth {
            let excess = self.entries.len() - depth;
            self.entries.drain(..excess);
            self.current -= excess;
            tracing::debug!("Evicted {excess} oldest undo entries");
        }
        Ok(())
    }

    /// Makes room for one more entry, growing by a whole block, so that
    /// the next `record` cannot fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot grow.
    pub fn reserve(&mut self) -> Result<()> {
        if self.entries.len() == self.entries.capacity() {
            self.entries
                .try_reserve_exact(self.config.block_size)
                .context("Failed to grow undo log")?;
        }
        Ok(())
    }

    /// Ends the coalescing session so the next edit starts a new entry.
    pub fn break_session(&mut self) {
        self.session = None;
    }

    /// Steps the cursor back and returns the entry whose inverse should be
    /// applied. Returns `None` if there's nothing to undo.
    pub fn undo(&mut self) -> Option<&UndoEntry> {
        if self.current == 0 {
            return None;
        }
        self.session = None;
        self.current -= 1;
        self.entries.get(self.current)
    }

    /// Steps the cursor forward and returns the entry to re-apply.
    /// Returns `None` if there's nothing to redo.
    pub fn redo(&mut self) -> Option<&UndoEntry> {
        let entry = self.entries.get(self.current)?;
        self.session = None;
        self.current += 1;
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current < self.entries.len()
    }

    /// Number of entries, undoable or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position in the log.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the entry that the next undo would revert.
    pub fn last_applied(&self) -> Option<&UndoEntry> {
        self.current.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Returns the entry that the next redo would re-apply.
    pub fn next_undone(&self) -> Option<&UndoEntry> {
        self.entries.get(self.current)
    }

    /// Temporarily disables recording (used during undo/redo replay).
    pub fn pause_recording(&mut self) {
        self.recording = false;
    }

    /// Re-enables recording after a pause.
    pub fn resume_recording(&mut self) {
        self.recording = true;
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.entries = Vec::new();
        self.current = 0;
        self.session = None;
    }

    /// Frees entries past the cursor.
    fn truncate_redo(&mut self) {
        if self.current < self.entries.len() {
            let dropped = self.entries.len() - self.current;
            self.entries.truncate(self.current);
            tracing::debug!("Discarded {dropped} redo entries");
        }
    }
}
