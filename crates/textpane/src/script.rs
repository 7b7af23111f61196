//! Command scripts: one editor command per line.
//!
//! Blank lines and lines starting with `#` are skipped. Text arguments
//! take the rest of the line and understand the escapes `\n`, `\r`, `\t`
//! and `\\`.

use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use textpane_core::{
    Axis, ClickKind, Clipboard, Editor, Motion, ScrollCommand, WrapMode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Types each byte as a key press.
    Type(Vec<u8>),
    Insert(Vec<u8>),
    Delete(usize, usize),
    DeleteForward,
    Backspace,
    Select(usize, usize),
    SelectAll,
    Move { motion: Motion, extend: bool },
    Undo,
    Redo,
    Cut,
    Copy,
    /// Pastes the given text, or the clipboard when `None`.
    Paste(Option<Vec<u8>>),
    Overwrite,
    Resize(i32, i32),
    Wrap(WrapMode),
    Scroll(Axis, ScrollCommand),
    Wheel(i32),
    Click { x: i32, y: i32, kind: ClickKind, shift: bool },
    Drag(i32, i32),
    Release,
    Dump,
}

/// Expands `\n`, `\r`, `\t` and `\\`. Other backslashes are kept.
pub fn unescape(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes().peekable();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.peek() {
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b't') => out.push(b'\t'),
            Some(b'\\') => out.push(b'\\'),
            _ => {
                out.push(b'\\');
                continue;
            }
        }
        bytes.next();
    }
    out
}

fn parse_motion(name: &str) -> Result<Motion> {
    Ok(match name {
        "left" => Motion::Left,
        "right" => Motion::Right,
        "up" => Motion::Up,
        "down" => Motion::Down,
        "home" => Motion::LineStart,
        "end" => Motion::LineEnd,
        "pageup" => Motion::PageUp,
        "pagedown" => Motion::PageDown,
        "docstart" => Motion::DocumentStart,
        "docend" => Motion::DocumentEnd,
        "wordleft" => Motion::WordLeft,
        "wordright" => Motion::WordRight,
        "viewtop" => Motion::ViewTop,
        "viewbottom" => Motion::ViewBottom,
        other => bail!("unknown motion '{other}'"),
    })
}

fn parse_scroll(axis: &str, cmd: &str) -> Result<(Axis, ScrollCommand)> {
    let axis = match axis {
        "v" | "vertical" => Axis::Vertical,
        "h" | "horizontal" => Axis::Horizontal,
        other => bail!("unknown axis '{other}'"),
    };
    let cmd = match cmd {
        "lineup" => ScrollCommand::LineUp,
        "linedown" => ScrollCommand::LineDown,
        "pageup" => ScrollCommand::PageUp,
        "pagedown" => ScrollCommand::PageDown,
        "top" => ScrollCommand::Top,
        "bottom" => ScrollCommand::Bottom,
        pos => ScrollCommand::Thumb(
            pos.parse()
                .with_context(|| format!("unknown scroll command '{pos}'"))?,
        ),
    };
    Ok((axis, cmd))
}

fn number<T: FromStr>(arg: Option<&str>, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let arg = arg.with_context(|| format!("missing {what}"))?;
    arg.parse()
        .with_context(|| format!("invalid {what} '{arg}'"))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim_start();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let mut args = rest.split_whitespace();
        let cmd = match name {
            "type" => Command::Type(unescape(rest)),
            "insert" => Command::Insert(unescape(rest)),
            "delete" if rest.trim().is_empty() => Command::DeleteForward,
            "delete" => Command::Delete(
                number(args.next(), "start offset")?,
                number(args.next(), "end offset")?,
            ),
            "backspace" => Command::Backspace,
            "select" if rest.trim() == "all" => Command::SelectAll,
            "select" => Command::Select(
                number(args.next(), "anchor")?,
                number(args.next(), "caret")?,
            ),
            "move" => {
                let motion = parse_motion(args.next().context("missing motion")?)?;
                let extend = match args.next() {
                    None => false,
                    Some("extend") => true,
                    Some(other) => bail!("unexpected '{other}'"),
                };
                Command::Move { motion, extend }
            }
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "cut" => Command::Cut,
            "copy" => Command::Copy,
            "paste" if rest.is_empty() => Command::Paste(None),
            "paste" => Command::Paste(Some(unescape(rest))),
            "overwrite" => Command::Overwrite,
            "resize" => Command::Resize(
                number(args.next(), "width")?,
                number(args.next(), "height")?,
            ),
            "wrap" => match args.next() {
                Some("on") => Command::Wrap(WrapMode::WordWrap),
                Some("off") => Command::Wrap(WrapMode::Truncate),
                other => bail!("expected 'on' or 'off', got {other:?}"),
            },
            "scroll" => {
                let axis = args.next().context("missing axis")?;
                let cmd = args.next().context("missing scroll command")?;
                let (axis, cmd) = parse_scroll(axis, cmd)?;
                Command::Scroll(axis, cmd)
            }
            "wheel" => Command::Wheel(number(args.next(), "wheel delta")?),
            "click" => {
                let x = number(args.next(), "x")?;
                let y = number(args.next(), "y")?;
                let mut kind = ClickKind::Single;
                let mut shift = false;
                for flag in args.by_ref() {
                    match flag {
                        "double" => kind = ClickKind::Double,
                        "triple" => kind = ClickKind::Triple,
                        "shift" => shift = true,
                        other => bail!("unknown click flag '{other}'"),
                    }
                }
                Command::Click { x, y, kind, shift }
            }
            "drag" => Command::Drag(number(args.next(), "x")?, number(args.next(), "y")?),
            "release" => Command::Release,
            "dump" => Command::Dump,
            other => bail!("unknown command '{other}'"),
        };
        if !matches!(
            cmd,
            Command::Type(_)
                | Command::Insert(_)
                | Command::Paste(_)
                | Command::SelectAll
                | Command::Click { .. }
        ) {
            if let Some(extra) = args.next() {
                bail!("unexpected '{extra}'");
            }
        }
        Ok(cmd)
    }
}

/// Parses a whole script, skipping blanks and `#` comments.
pub fn parse(script: &str) -> Result<Vec<Command>> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            line.parse()
                .with_context(|| format!("script line {}", i + 1))
        })
        .collect()
}

/// Applies `cmd` to `editor`, writing any dump to `out`.
pub fn execute(
    editor: &mut Editor,
    cmd: &Command,
    clipboard: &mut dyn Clipboard,
    out: &mut dyn Write,
) -> Result<()> {
    match cmd {
        Command::Type(text) => {
            for &b in text {
                editor.insert_char(b)?;
            }
        }
        Command::Insert(text) => editor.insert_str(text)?,
        Command::Delete(p1, p2) => {
            let len = editor.len();
            if *p1 > len || *p2 > len {
                bail!("delete {p1} {p2} is past the end ({len} bytes)");
            }
            editor.delete_range(*p1, *p2)?;
        }
        Command::DeleteForward => editor.delete_forward()?,
        Command::Backspace => editor.backspace()?,
        Command::Select(anchor, caret) => editor.set_selection(*anchor, *caret)?,
        Command::SelectAll => editor.select_all()?,
        Command::Move { motion, extend } => editor.move_caret(*motion, *extend)?,
        Command::Undo => {
            editor.undo()?;
        }
        Command::Redo => {
            editor.redo()?;
        }
        Command::Cut => {
            editor.cut(clipboard)?;
        }
        Command::Copy => {
            editor.copy(clipboard);
        }
        Command::Paste(Some(text)) => editor.paste(text)?,
        Command::Paste(None) => editor.paste_from(clipboard)?,
        Command::Overwrite => {
            editor.toggle_overwrite();
        }
        Command::Resize(w, h) => editor.on_resize(*w, *h)?,
        Command::Wrap(mode) => editor.set_wrap_mode(*mode)?,
        Command::Scroll(axis, sc) => editor.scroll(*axis, *sc)?,
        Command::Wheel(delta) => editor.wheel(*delta)?,
        Command::Click { x, y, kind, shift } => {
            editor.mouse_up();
            editor.mouse_down(*x, *y, *kind, *shift)?;
        }
        Command::Drag(x, y) => editor.mouse_drag(*x, *y)?,
        Command::Release => editor.mouse_up(),
        Command::Dump => dump(editor, out)?,
    }
    for event in editor.drain_events() {
        tracing::debug!(?event, "Editor event");
    }
    Ok(())
}

fn escape(bytes: &[u8]) -> String {
    bytes.iter().flat_map(|b| std::ascii::escape_default(*b)).map(char::from).collect()
}

/// Writes the editor state and every display line. Visible lines are
/// marked with `*`.
pub fn dump(editor: &Editor, out: &mut dyn Write) -> Result<()> {
    let sel = editor.selection();
    let vp = editor.viewport();
    writeln!(
        out,
        "len={} lines={} anchor={} caret={} scroll=({}, {}) mode={:?}",
        editor.len(),
        editor.line_count(),
        sel.anchor,
        sel.caret,
        vp.scroll_x(),
        vp.scroll_y(),
        editor.wrap_mode(),
    )?;
    let cache = editor.render_cache();
    let visible = cache.top_line()..cache.top_line() + cache.len();
    let index = editor.line_index();
    let text = editor.buffer_handle();
    for line in 0..editor.line_count() {
        let range = index.line_range(line);
        let start = range.start;
        let shown = escape(&text[range]);
        let mark = if visible.contains(&line) { '*' } else { ' ' };
        writeln!(out, "{mark}{line:>5} {start:>7} |{shown}|")?;
    }
    Ok(())
}
