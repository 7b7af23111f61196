/// Text editing engine over a flat byte buffer.
///
/// The [`Editor`] owns the buffer, a display line index kept current by
/// incremental word wrap or truncation, a coalescing undo log, and a
/// cache of render info for the visible lines. Hosts feed it input
/// events and read back render lines, selection geometry, and scroll
/// state.
pub mod buffer;
pub mod caret;
pub mod clipboard;
pub mod editor;
pub mod history;
pub mod layout;
pub mod line_index;
pub mod metrics;
pub mod render_cache;
pub mod viewport;

pub use buffer::TextBuffer;
pub use caret::Selection;
pub use clipboard::{Clipboard, MemoryClipboard};
pub use editor::{ClickKind, Editor, EditorEvent, EditorOptions, Motion};
pub use layout::WrapMode;
pub use line_index::LineIndex;
pub use metrics::{FontMetrics, TabStops};
pub use render_cache::{DirtyLines, Rect, RenderCache, RenderLine, SelectionGeometry};
pub use viewport::{Axis, ScrollCommand, ScrollInfo, Viewport};
