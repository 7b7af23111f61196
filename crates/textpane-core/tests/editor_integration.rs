// Integration tests for the editor instance.
//
// These drive an `Editor` through its public surface only: edits, undo,
// scrolling, keyboard motion, and mouse selection. After every step the
// incrementally maintained state is checked against a from-scratch
// rebuild.

use textpane_core::{
    Axis, ClickKind, Editor, EditorOptions, FontMetrics, Motion, Rect, ScrollCommand,
    Selection, WrapMode,
};

/// Ten 10px glyphs per 100px line, 16px lines, ten lines per page.
fn editor_with(text: &str, mode: WrapMode) -> Editor {
    let options = EditorOptions {
        wrap_mode: mode,
        ..EditorOptions::default()
    };
    let mut ed = Editor::new(options, FontMetrics::monospace(10, 16), 100, 160).unwrap();
    ed.set_buffer_handle(text.as_bytes().to_vec()).unwrap();
    ed
}

/// Narrow `i` and space, wide `m` and `W`, 10px otherwise.
fn proportional() -> FontMetrics {
    let mut advances = [10; 256];
    advances[b'i' as usize] = 4;
    advances[b' ' as usize] = 6;
    advances[b'm' as usize] = 25;
    advances[b'W' as usize] = 60;
    FontMetrics::from_table(advances, 16)
}

fn proportional_editor(text: &str, mode: WrapMode) -> Editor {
    let options = EditorOptions {
        wrap_mode: mode,
        ..EditorOptions::default()
    };
    let mut ed = Editor::new(options, proportional(), 100, 160).unwrap();
    ed.set_buffer_handle(text.as_bytes().to_vec()).unwrap();
    ed
}

fn editor(text: &str) -> Editor {
    editor_with(text, WrapMode::Truncate)
}

fn text(ed: &Editor) -> String {
    String::from_utf8_lossy(ed.buffer_handle()).into_owned()
}

fn numbered_lines(n: usize) -> String {
    (0..n).map(|i| format!("line {i:02}\n")).collect()
}

/// The cached lines and line index must match a rebuild from scratch.
fn assert_consistent(ed: &Editor) {
    let index = ed.line_index();
    assert_eq!(index.starts().last().copied(), Some(ed.len()));
    assert!(index.starts().windows(2).all(|w| w[0] <= w[1]));

    let mut fresh = Editor::new(
        EditorOptions {
            wrap_mode: ed.wrap_mode(),
            ..EditorOptions::default()
        },
        ed.metrics().clone(),
        ed.viewport().width(),
        ed.viewport().height(),
    )
    .unwrap();
    fresh.set_buffer_handle(ed.buffer_handle().to_vec()).unwrap();
    assert_eq!(fresh.line_index().starts(), index.starts());

    assert!(ed.render_cache().dirty().is_none());
    let full = ed.full_render_cache().unwrap();
    let cached: Vec<_> = ed.render_lines().collect();
    let rebuilt: Vec<_> = full.lines().collect();
    assert_eq!(cached, rebuilt);
}

// ── Scenarios ──────────────────────────────────────────────────────

#[test]
fn test_truncation_boundary() {
    let ed = editor(&"a".repeat(8192));
    assert_eq!(ed.line_count(), 2);
    assert_eq!(ed.line_index().starts(), &[0, 8192, 8192]);
}

#[test]
fn test_word_wrap_basic() {
    let ed = editor_with("aaaaaaaaaa bbbbbbbbbb", WrapMode::WordWrap);
    assert_eq!(ed.line_index().starts(), &[0, 11, 21]);
    assert_consistent(&ed);
}

#[test]
fn test_crlf_paste_normalized() {
    let mut ed = editor("");
    ed.paste(b"line1\r\nline2\r\nline3").unwrap();
    assert_eq!(text(&ed), "line1\nline2\nline3");
    assert!(!ed.buffer_handle().contains(&b'\r'));
    assert_eq!(ed.line_count(), 3);
}

#[test]
fn test_delete_spanning_lines() {
    let mut ed = editor("abc\ndef\nghi");
    assert_eq!(ed.line_count(), 3);
    ed.delete_range(2, 9).unwrap();
    assert_eq!(text(&ed), "abhi");
    assert_eq!(ed.line_count(), 1);
    assert_consistent(&ed);
}

// ── Undo / redo ────────────────────────────────────────────────────

type Op = fn(&mut Editor);

#[test]
fn test_undo_redo_inverse_law() {
    let cases: &[(&str, Selection, Op)] = &[
        ("type", Selection::caret_only(3), |ed| ed.insert_char(b'x').unwrap()),
        ("newline", Selection::caret_only(10), |ed| ed.insert_char(b'\r').unwrap()),
        ("backspace", Selection::caret_only(5), |ed| ed.backspace().unwrap()),
        ("backspace newline", Selection::caret_only(11), |ed| ed.backspace().unwrap()),
        ("delete", Selection::caret_only(5), |ed| ed.delete_forward().unwrap()),
        ("type over", Selection::new(8, 2), |ed| ed.insert_char(b'x').unwrap()),
        ("delete selection", Selection::new(2, 14), |ed| {
            ed.delete_selection().unwrap();
        }),
        ("word back", Selection::caret_only(6), |ed| ed.delete_word_back().unwrap()),
        ("word forward", Selection::caret_only(0), |ed| {
            ed.delete_word_forward().unwrap()
        }),
        ("insert str", Selection::caret_only(11), |ed| {
            ed.insert_str(b"new\nlines\n").unwrap()
        }),
        ("paste over", Selection::new(4, 17), |ed| ed.paste(b"p\r\nq").unwrap()),
        ("delete range", Selection::caret_only(3), |ed| ed.delete_range(3, 15).unwrap()),
        ("delete range after caret", Selection::caret_only(0), |ed| {
            ed.delete_range(6, 11).unwrap()
        }),
        ("delete range before caret", Selection::caret_only(20), |ed| {
            ed.delete_range(3, 15).unwrap()
        }),
        ("delete range in selection", Selection::new(0, 16), |ed| {
            ed.delete_range(6, 11).unwrap()
        }),
        ("delete range across selection", Selection::new(20, 8), |ed| {
            ed.delete_range(6, 11).unwrap()
        }),
    ];

    for mode in [WrapMode::Truncate, WrapMode::WordWrap] {
        for (name, sel, op) in cases {
            let mut ed = editor_with("alpha beta\ngamma delta\nepsilon", mode);
            ed.set_selection(sel.anchor, sel.caret).unwrap();
            let before = (text(&ed), ed.selection());

            op(&mut ed);
            let after = (text(&ed), ed.selection());
            assert_ne!(before.0, after.0, "{name}: edit had no effect");
            assert_consistent(&ed);

            assert!(ed.undo().unwrap(), "{name}: nothing to undo");
            assert_eq!((text(&ed), ed.selection()), before, "{name}: undo");
            assert_consistent(&ed);

            assert!(ed.redo().unwrap(), "{name}: nothing to redo");
            assert_eq!((text(&ed), ed.selection()), after, "{name}: redo");
            assert_consistent(&ed);
        }
    }
}

#[test]
fn test_delete_range_moves_selection_like_the_text() {
    let mut ed = editor("alpha beta\ngamma delta\nepsilon");

    // Before the range: stays put.
    ed.set_selection(0, 0).unwrap();
    ed.delete_range(6, 11).unwrap();
    assert_eq!(ed.selection(), Selection::caret_only(0));
    ed.undo().unwrap();
    assert_eq!(ed.selection(), Selection::caret_only(0));

    // After the range: shifts left.
    ed.set_selection(20, 20).unwrap();
    ed.delete_range(6, 11).unwrap();
    assert_eq!(ed.selection(), Selection::caret_only(15));

    // Inside the range: clamps to its start.
    ed.set_selection(3, 9).unwrap();
    ed.delete_range(2, 6).unwrap();
    assert_eq!(ed.selection(), Selection::new(2, 5));
    ed.undo().unwrap();
    assert_eq!(ed.selection(), Selection::new(3, 9));
    ed.redo().unwrap();
    assert_eq!(ed.selection(), Selection::new(2, 5));
    assert_consistent(&ed);
}

#[test]
fn test_overwrite_inverse_law() {
    let mut ed = editor("abc");
    ed.set_overwrite(true);
    ed.set_selection(1, 1).unwrap();
    ed.insert_char(b'X').unwrap();
    assert_eq!(text(&ed), "aXc");
    ed.undo().unwrap();
    assert_eq!((text(&ed), ed.selection()), ("abc".to_string(), Selection::caret_only(1)));
    ed.redo().unwrap();
    assert_eq!((text(&ed), ed.selection()), ("aXc".to_string(), Selection::caret_only(2)));
}

#[test]
fn test_typing_run_is_one_entry() {
    let mut ed = editor("start ");
    ed.set_selection(6, 6).unwrap();
    for b in b"hello world" {
        ed.insert_char(*b).unwrap();
    }
    assert_eq!(ed.history().len(), 1);
    assert_eq!(ed.history().last_applied().unwrap().data, b"hello world");
    ed.undo().unwrap();
    assert_eq!(text(&ed), "start ");
    assert!(!ed.can_undo());
}

#[test]
fn test_new_edit_discards_redo() {
    let mut ed = editor("");
    ed.insert_str(b"one").unwrap();
    ed.insert_str(b"two").unwrap();
    ed.undo().unwrap();
    assert!(ed.can_redo());
    ed.insert_char(b'!').unwrap();
    assert!(!ed.can_redo());
    assert_eq!(text(&ed), "one!");
}

// ── Render cache ───────────────────────────────────────────────────

#[test]
fn test_cache_tracks_edits_and_scrolls() {
    for mode in [WrapMode::Truncate, WrapMode::WordWrap] {
        let mut ed = editor_with(&numbered_lines(40), mode);
        assert_consistent(&ed);

        ed.scroll(Axis::Vertical, ScrollCommand::LineDown).unwrap();
        assert_consistent(&ed);
        ed.wheel(-120).unwrap();
        assert_consistent(&ed);

        // Edits inside the view: same line count, then a new line.
        ed.set_selection(80, 80).unwrap();
        ed.insert_char(b'z').unwrap();
        assert_consistent(&ed);
        ed.insert_char(b'\r').unwrap();
        assert_consistent(&ed);

        // A line wider than the view.
        ed.insert_str("x".repeat(30).as_bytes()).unwrap();
        assert_consistent(&ed);

        ed.scroll(Axis::Horizontal, ScrollCommand::LineDown).unwrap();
        assert_consistent(&ed);

        // Edits above the view shift every cached line.
        ed.delete_range(0, 8).unwrap();
        assert_consistent(&ed);
        ed.scroll(Axis::Vertical, ScrollCommand::Bottom).unwrap();
        assert_consistent(&ed);
        ed.set_selection(3, 3).unwrap();
        ed.insert_str(b"\t").unwrap();
        assert_consistent(&ed);

        ed.select_all().unwrap();
        ed.backspace().unwrap();
        assert_consistent(&ed);
        assert_eq!(ed.line_count(), 1);
    }
}

#[test]
fn test_cache_tracks_resize_and_font_change() {
    let mut ed = editor_with(&numbered_lines(20), WrapMode::WordWrap);
    ed.on_resize(50, 80).unwrap();
    assert_consistent(&ed);
    assert!(ed.line_count() > 21);
    ed.on_font_change(FontMetrics::monospace(5, 8)).unwrap();
    assert_consistent(&ed);
    ed.set_wrap_mode(WrapMode::Truncate).unwrap();
    assert_eq!(ed.line_count(), 21);
    assert_consistent(&ed);
}

#[test]
fn test_proportional_wrap_matches_rebuild_after_every_edit() {
    let mut ed = proportional_editor("  yWW\nab", WrapMode::WordWrap);
    assert_eq!(ed.line_index().starts(), &[0, 2, 4, 6, 8]);
    ed.delete_range(4, 5).unwrap();
    assert_eq!(ed.line_index().starts(), &[0, 5, 7]);
    assert_consistent(&ed);

    let base = "WWW iWmW mmmm WWiiW\tW  Wm iiiiiiiiii W\nmi Wm";
    for mode in [WrapMode::Truncate, WrapMode::WordWrap] {
        for pos in 0..=base.len() {
            let mut ed = proportional_editor(base, mode);
            ed.set_selection(pos, pos).unwrap();
            ed.insert_char(b'W').unwrap();
            assert_consistent(&ed);
            ed.backspace().unwrap();
            assert_consistent(&ed);
            if pos < base.len() {
                ed.delete_forward().unwrap();
                assert_consistent(&ed);
                ed.undo().unwrap();
                assert_consistent(&ed);
            }
            assert_eq!(text(&ed), base);
        }
    }
}

#[test]
fn test_text_area_never_narrower_than_a_glyph() {
    let mut ed = editor_with("abc", WrapMode::WordWrap);
    ed.on_resize(0, 160).unwrap();
    assert_eq!(ed.viewport().width(), 11);
    // One glyph per line.
    assert_eq!(ed.line_index().starts(), &[0, 1, 2, 3]);
}

#[test]
fn test_selection_geometry_follows_selection() {
    let mut ed = editor("abc\ndef\nghi");
    ed.set_selection(1, 6).unwrap();
    let geometry = ed.selection_geometry();
    // The first line's highlight covers its newline with one extra glyph.
    assert_eq!(
        geometry.rects,
        vec![Rect { x: 10, y: 0, width: 30, height: 16 }]
    );
    assert_eq!(
        geometry.caret_line,
        Some(Rect { x: 0, y: 16, width: 20, height: 16 })
    );
    ed.set_selection(4, 4).unwrap();
    assert!(ed.selection_geometry().is_empty());
}

#[test]
fn test_caret_point() {
    let mut ed = editor("abc\ndef");
    ed.set_selection(6, 6).unwrap();
    assert_eq!(ed.caret_point(), Some((20, 16)));
}

// ── Keyboard ───────────────────────────────────────────────────────

#[test]
fn test_up_down_keep_horizontal_position() {
    let mut ed = editor("abcdef\nab\nabcdef");
    ed.set_selection(5, 5).unwrap();
    ed.move_caret(Motion::Down, false).unwrap();
    assert_eq!(ed.caret(), 9);
    ed.move_caret(Motion::Down, false).unwrap();
    assert_eq!(ed.caret(), 12);
    ed.move_caret(Motion::Down, false).unwrap();
    assert_eq!(ed.caret(), 12);
    ed.move_caret(Motion::Up, true).unwrap();
    assert_eq!(ed.selection(), Selection::new(12, 9));
}

#[test]
fn test_left_right_collapse_selection() {
    let mut ed = editor("abcdef");
    ed.set_selection(1, 4).unwrap();
    ed.move_caret(Motion::Left, false).unwrap();
    assert_eq!(ed.selection(), Selection::caret_only(1));
    ed.move_caret(Motion::Right, true).unwrap();
    ed.move_caret(Motion::Right, true).unwrap();
    assert_eq!(ed.selection(), Selection::new(1, 3));
    ed.move_caret(Motion::Right, false).unwrap();
    assert_eq!(ed.selection(), Selection::caret_only(3));
}

#[test]
fn test_home_end_and_document_motions() {
    let mut ed = editor("one two\nthree");
    ed.set_selection(2, 2).unwrap();
    ed.move_caret(Motion::LineEnd, false).unwrap();
    assert_eq!(ed.caret(), 7);
    ed.move_caret(Motion::LineStart, false).unwrap();
    assert_eq!(ed.caret(), 0);
    ed.move_caret(Motion::WordRight, false).unwrap();
    assert_eq!(ed.caret(), 4);
    ed.move_caret(Motion::DocumentEnd, true).unwrap();
    assert_eq!(ed.selection(), Selection::new(4, 13));
    ed.move_caret(Motion::WordLeft, false).unwrap();
    assert_eq!(ed.caret(), 8);
    ed.move_caret(Motion::DocumentStart, false).unwrap();
    assert_eq!(ed.caret(), 0);
}

#[test]
fn test_end_stops_before_folded_wrap_blanks() {
    let mut ed = editor_with("aaaaaaaaaa    bbb", WrapMode::WordWrap);
    assert_eq!(ed.line_index().starts(), &[0, 14, 17]);
    ed.set_selection(3, 3).unwrap();
    ed.move_caret(Motion::LineEnd, false).unwrap();
    assert_eq!(ed.caret(), 13);

    // The blanks hang past the right edge; a click there stays before them.
    ed.mouse_down(99, 5, ClickKind::Single, false).unwrap();
    ed.mouse_up();
    assert_eq!(ed.caret(), 10);

    // Offset 14 belongs to the next line.
    ed.move_caret(Motion::Right, false).unwrap();
    ed.move_caret(Motion::LineEnd, false).unwrap();
    assert_eq!(ed.caret(), 13);
    ed.move_caret(Motion::Right, false).unwrap();
    assert_eq!(ed.offset_to_line(ed.caret()), 1);
}

#[test]
fn test_page_down_scrolls_a_page() {
    let mut ed = editor(&numbered_lines(30));
    ed.move_caret(Motion::PageDown, false).unwrap();
    assert_eq!(ed.caret(), 80);
    assert_eq!(ed.viewport().scroll_y(), 160);
    ed.move_caret(Motion::ViewBottom, false).unwrap();
    assert_eq!(ed.offset_to_line(ed.caret()), 19);
    ed.move_caret(Motion::ViewTop, false).unwrap();
    assert_eq!(ed.offset_to_line(ed.caret()), 10);
    ed.move_caret(Motion::PageUp, false).unwrap();
    assert_eq!(ed.caret(), 0);
    assert_eq!(ed.viewport().scroll_y(), 0);
}

#[test]
fn test_scroll_line_keeps_caret_on_screen() {
    let mut ed = editor(&numbered_lines(30));
    ed.scroll_line(false).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 16);
    assert_eq!(ed.caret(), 8);
    ed.scroll_line(true).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 0);
    assert_eq!(ed.caret(), 8);
}

#[test]
fn test_caret_follow_scrolls_horizontally() {
    let mut ed = editor(&"a".repeat(50));
    ed.set_selection(50, 50).unwrap();
    // The caret plus a glyph of margin would need 410px; the line is 500px.
    assert_eq!(ed.viewport().scroll_x(), 400);
    ed.move_caret(Motion::LineStart, false).unwrap();
    assert_eq!(ed.viewport().scroll_x(), 0);
    assert_consistent(&ed);
}

// ── Mouse ──────────────────────────────────────────────────────────

fn mouse_editor() -> Editor {
    let mut ed = editor("hello world\nsecond line");
    ed.on_resize(200, 160).unwrap();
    ed
}

#[test]
fn test_click_and_shift_click() {
    let mut ed = mouse_editor();
    ed.mouse_down(32, 5, ClickKind::Single, false).unwrap();
    ed.mouse_up();
    assert_eq!(ed.selection(), Selection::caret_only(3));
    ed.mouse_down(72, 20, ClickKind::Single, true).unwrap();
    ed.mouse_up();
    assert_eq!(ed.selection(), Selection::new(3, 19));
}

#[test]
fn test_click_past_line_end_stays_on_line() {
    let mut ed = mouse_editor();
    ed.mouse_down(190, 5, ClickKind::Single, false).unwrap();
    assert_eq!(ed.caret(), 11);
}

#[test]
fn test_double_click_drags_by_word() {
    let mut ed = mouse_editor();
    ed.mouse_down(72, 5, ClickKind::Double, false).unwrap();
    assert_eq!(ed.selection(), Selection::caret_only(6));
    ed.mouse_drag(12, 20).unwrap();
    assert_eq!(ed.selection(), Selection::new(6, 19));
    ed.mouse_up();
    assert!(!ed.is_dragging());
}

#[test]
fn test_triple_click_drags_by_line() {
    let mut ed = mouse_editor();
    ed.mouse_down(0, 20, ClickKind::Triple, false).unwrap();
    assert_eq!(ed.caret(), 12);
    ed.mouse_drag(2, 5).unwrap();
    assert_eq!(ed.selection(), Selection::new(12, 0));
    ed.mouse_drag(50, 20).unwrap();
    assert_eq!(ed.selection(), Selection::new(12, 23));
}

#[test]
fn test_drag_below_view_scrolls() {
    let mut ed = editor(&numbered_lines(30));
    ed.mouse_down(0, 0, ClickKind::Single, false).unwrap();
    ed.mouse_drag(0, 200).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 16);
    assert_eq!(ed.offset_to_line(ed.caret()), 10);
    ed.drag_tick().unwrap();
    assert_eq!(ed.viewport().scroll_y(), 32);
    assert_eq!(ed.offset_to_line(ed.caret()), 11);
    assert_eq!(ed.selection().anchor, 0);
    ed.mouse_up();
    ed.drag_tick().unwrap();
    assert_eq!(ed.viewport().scroll_y(), 32);
    assert_consistent(&ed);
}

#[test]
fn test_editing_cancels_drag() {
    let mut ed = mouse_editor();
    ed.mouse_down(0, 0, ClickKind::Single, false).unwrap();
    ed.insert_char(b'x').unwrap();
    assert!(!ed.is_dragging());
}

// ── Scrolling ──────────────────────────────────────────────────────

#[test]
fn test_scroll_info_and_clamp() {
    let mut ed = editor(&numbered_lines(30));
    let info = ed.scroll_info(Axis::Vertical);
    assert_eq!((info.range, info.page, info.pos), (31 * 16, 160, 0));
    ed.scroll(Axis::Vertical, ScrollCommand::Thumb(10_000)).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 31 * 16 - 160);
    ed.scroll(Axis::Vertical, ScrollCommand::Thumb(-5)).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 0);
}

#[test]
fn test_partial_wheel_deltas_accumulate() {
    let mut ed = editor(&numbered_lines(30));
    ed.wheel(-60).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 24);
    ed.wheel(-60).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 48);
    ed.wheel(120).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 0);
}

#[test]
fn test_pan_is_vertical_only_when_wrapping() {
    let mut ed = editor_with(&numbered_lines(30), WrapMode::WordWrap);
    ed.pan(100, 10).unwrap();
    assert_eq!(ed.viewport().scroll_y(), 0);
    ed.pan(100, 56).unwrap();
    assert_eq!(ed.viewport().scroll_x(), 0);
    assert_eq!(ed.viewport().scroll_y(), 10);
    assert_consistent(&ed);
}
