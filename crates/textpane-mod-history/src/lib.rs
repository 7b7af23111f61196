/// Linear undo/redo history for a flat byte buffer.
///
/// Provides an `UndoManager` that records insert, delete and replace
/// entries, merges runs of single-byte typing or deleting into one entry,
/// and discards the redo branch whenever a new edit is recorded.
pub mod config;
pub mod manager;
pub mod operation;

pub use config::HistoryConfig;
pub use manager::UndoManager;
pub use operation::{Carets, EditKind, Merge, UndoEntry};
