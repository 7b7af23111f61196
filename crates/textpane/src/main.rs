mod clipboard;
mod script;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use textpane_config::EditorConfig;
use textpane_core::history::HistoryConfig;
use textpane_core::{Clipboard, Editor, EditorOptions, FontMetrics, MemoryClipboard, WrapMode};

use crate::clipboard::SystemClipboard;

/// Drives a text pane from a command script and prints its layout.
#[derive(Parser, Debug)]
#[command(name = "textpane", version, about)]
struct Cli {
    /// File to load into the buffer.
    file: Option<PathBuf>,

    /// Command script to replay. Without one the layout is dumped as is.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Text area width in pixels.
    #[arg(long, default_value_t = 640)]
    width: i32,

    /// Text area height in pixels.
    #[arg(long, default_value_t = 480)]
    height: i32,

    /// Start in word-wrap mode regardless of the config.
    #[arg(long)]
    wrap: bool,

    /// Config file. Defaults to `textpane.json` next to the executable.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the system clipboard instead of an in-process one.
    #[arg(long)]
    system_clipboard: bool,

    /// Write the final buffer to this file.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn editor_options(config: &EditorConfig, force_wrap: bool) -> EditorOptions {
    EditorOptions {
        wrap_mode: if force_wrap || config.word_wrap {
            WrapMode::WordWrap
        } else {
            WrapMode::Truncate
        },
        max_line_len: config.max_line_len,
        buffer_growth: config.buffer_growth,
        history: HistoryConfig {
            block_size: config.undo_block_size,
            max_history_depth: config.max_undo_depth,
        },
        tab_width_chars: config.tab_width_chars,
        wheel_lines: config.wheel_lines,
        overwrite: config.overwrite,
    }
}

fn open_clipboard(system: bool) -> Box<dyn Clipboard> {
    if system {
        match SystemClipboard::new() {
            Ok(cb) => return Box::new(cb),
            Err(e) => tracing::warn!("{e:#}; using an in-process clipboard"),
        }
    }
    Box::new(MemoryClipboard::new())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(EditorConfig::config_path);
    let config = EditorConfig::load_or_create(&config_path);
    tracing::debug!(path = %config_path.display(), ?config, "Loaded config");

    let metrics = FontMetrics::monospace(config.font.char_width, config.font.line_height);
    let mut editor = Editor::new(editor_options(&config, cli.wrap), metrics, cli.width, cli.height)?;

    if let Some(path) = &cli.file {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        editor.set_buffer_handle(bytes)?;
        tracing::info!("Loaded {}", path.display());
    }

    let commands = match &cli.script {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            script::parse(&source)
                .with_context(|| format!("Invalid script {}", path.display()))?
        }
        None => vec![script::Command::Dump],
    };

    let mut clipboard = open_clipboard(cli.system_clipboard);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for cmd in &commands {
        script::execute(&mut editor, cmd, clipboard.as_mut(), &mut out)
            .with_context(|| format!("Command {cmd:?} failed"))?;
    }
    out.flush()?;

    if let Some(path) = &cli.output {
        std::fs::write(path, editor.buffer_handle())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
