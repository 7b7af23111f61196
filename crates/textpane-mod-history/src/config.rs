/// Configuration constants for the history system.

/// Number of entry slots reserved each time the log runs out of capacity.
const DEFAULT_BLOCK_SIZE: usize = 20;

/// Maximum number of entries kept per editor.
/// Oldest entries are evicted when this limit is exceeded.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 10_000;

/// Configuration for the history system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Growth increment of the entry storage.
    pub block_size: usize,
    /// Max entries retained; `0` disables the limit.
    pub max_history_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Returns a copy with values clamped to usable ranges.
    pub fn sanitized(mut self) -> Self {
        self.block_size = self.block_size.max(1);
        self
    }
}
