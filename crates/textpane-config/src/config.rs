/// Editor configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "textpane.json";

/// Longest allowed truncation cap, in bytes.
const MAX_LINE_LEN_LIMIT: usize = 1 << 20;

/// Monospace font metrics for hosts that do not measure a real font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub char_width: i32,
    pub line_height: i32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            char_width: 8,
            line_height: 16,
        }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub word_wrap: bool,
    /// Byte cap for one display line in truncation mode.
    pub max_line_len: usize,
    /// Buffer capacity increment, in bytes.
    pub buffer_growth: usize,
    /// Undo log capacity increment, in entries.
    pub undo_block_size: usize,
    /// Oldest undo entries are evicted past this depth. `0` = unlimited.
    pub max_undo_depth: usize,
    /// Tab stop interval in average character widths.
    pub tab_width_chars: i32,
    /// Lines per wheel notch. `0` scrolls a page.
    pub wheel_lines: i32,
    pub overwrite: bool,
    pub font: FontConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            word_wrap: false,
            max_line_len: 8192,
            buffer_growth: 1000,
            undo_block_size: 20,
            max_undo_depth: 10_000,
            tab_width_chars: 8,
            wheel_lines: 3,
            overwrite: false,
            font: FontConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Returns the config file path: exe directory + `textpane.json`,
    /// falling back to the user config directory.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME)))
            .or_else(|| dirs::config_dir().map(|d| d.join("textpane").join(CONFIG_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            return config;
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                // Keep the broken file for the user to fix.
                tracing::warn!("{e:#}; using defaults");
                Self::default()
            }
        }
    }

    /// Reads and sanitizes the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Clamps values to valid ranges.
    pub fn sanitize(&mut self) {
        self.max_line_len = self.max_line_len.clamp(1, MAX_LINE_LEN_LIMIT);
        self.buffer_growth = self.buffer_growth.max(1);
        self.undo_block_size = self.undo_block_size.max(1);
        self.tab_width_chars = self.tab_width_chars.clamp(1, 64);
        self.wheel_lines = self.wheel_lines.clamp(0, 100);
        self.font.char_width = self.font.char_width.clamp(1, 256);
        self.font.line_height = self.font.line_height.clamp(1, 512);
    }
}
