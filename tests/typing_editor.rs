use kidbox::typing::layout::{self, Token};
use kidbox::typing::{
    Cursor, FixedMetrics, GlyphStyle, RichDocument, TEXT_UNDO_MAX_DEPTH, TextEditor, VerticalDirection,
};

fn editor_with(text: &str) -> TextEditor {
    let mut editor = TextEditor::new(10);
    text.chars().for_each(|ch| editor.insert(ch));
    editor
}

fn spans(doc: &RichDocument, width: f32) -> Vec<(usize, usize, usize)> {
    layout::build_visual_lines(doc, &FixedMetrics::new(1.0), width)
        .iter()
        .map(|line| (line.row, line.start_col, line.end_col))
        .collect()
}

#[test]
fn test_words_wrap_at_token_boundaries() {
    let editor = editor_with("hello world");
    assert_eq!(spans(editor.document(), 7.0), vec![(0, 0, 6), (0, 6, 11)]);
    assert_eq!(spans(editor.document(), 20.0), vec![(0, 0, 11)]);
}

#[test]
fn test_long_word_is_split_after_flushing_line() {
    let editor = editor_with("hi abcdefghij");
    assert_eq!(
        spans(editor.document(), 4.0),
        vec![(0, 0, 3), (0, 3, 7), (0, 7, 11), (0, 11, 13)]
    );
}

#[test]
fn test_layout_is_stable_across_calls() {
    let editor = editor_with("the quick brown fox\n\njumps over the lazy dog");
    let metrics = FixedMetrics::new(1.0);
    let first = editor.visual_lines(&metrics, 9.0);
    let second = editor.visual_lines(&metrics, 9.0);
    assert_eq!(first, second);
    // the empty middle row still gets a line
    assert!(first.iter().any(|line| line.row == 1 && line.is_empty()));
}

#[test]
fn test_wrap_preserves_every_column() {
    let editor = editor_with("aa bbbbbbbbb  c dddd");
    let glyphs = editor.document().row(0);
    let widths = vec![1.0; glyphs.len()];
    let tokens: Vec<Token<'_>> = layout::tokenize_row(glyphs, &widths);
    let ranges = layout::wrap_tokens(&tokens, 5.0);
    assert_eq!(ranges.first().map(|r| r.0), Some(0));
    assert_eq!(ranges.last().map(|r| r.1), Some(glyphs.len()));
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
}

#[test]
fn test_sticky_column_survives_short_row() {
    let mut editor = editor_with("0123456789\nabc\n0123456789");
    let metrics = FixedMetrics::new(1.0);
    let lines = editor.visual_lines(&metrics, 100.0);
    editor.set_cursor(Cursor::new(0, 8));

    editor.move_cursor_vertical(&lines, VerticalDirection::Down);
    assert_eq!(editor.cursor(), Cursor::new(1, 3));
    editor.move_cursor_vertical(&lines, VerticalDirection::Down);
    assert_eq!(editor.cursor(), Cursor::new(2, 8));
    editor.move_cursor_vertical(&lines, VerticalDirection::Up);
    editor.move_cursor_vertical(&lines, VerticalDirection::Up);
    assert_eq!(editor.cursor(), Cursor::new(0, 8));
}

#[test]
fn test_horizontal_move_resets_sticky_column() {
    let mut editor = editor_with("0123456789\nabc\n0123456789");
    let metrics = FixedMetrics::new(1.0);
    let lines = editor.visual_lines(&metrics, 100.0);
    editor.set_cursor(Cursor::new(0, 8));
    editor.move_cursor_vertical(&lines, VerticalDirection::Down);
    editor.move_left();
    assert!(editor.is_x_target_dirty());

    editor.move_cursor_vertical(&lines, VerticalDirection::Down);
    assert_eq!(editor.cursor(), Cursor::new(2, 2));
}

#[test]
fn test_undo_history_is_capped() {
    let mut editor = editor_with(&"x".repeat(TEXT_UNDO_MAX_DEPTH + 5));
    assert_eq!(editor.document().undo_len(), TEXT_UNDO_MAX_DEPTH);
    for _ in 0..TEXT_UNDO_MAX_DEPTH {
        editor.undo();
    }
    assert!(!editor.document().can_undo());
    assert_eq!(editor.document().text(), "xxxxx");
}

#[test]
fn test_undo_rejoins_split_row() {
    let mut editor = editor_with("ab\nc");
    editor.undo();
    assert_eq!(editor.document().text(), "ab\n");
    assert_eq!(editor.cursor(), Cursor::new(1, 0));
    editor.undo();
    assert_eq!(editor.document().text(), "ab");
    assert_eq!(editor.cursor(), Cursor::new(0, 2));
}

#[test]
fn test_selected_style_applies_to_new_glyphs_only() {
    let mut editor = editor_with("a");
    editor.select_style(GlyphStyle::Bold);
    editor.select_size(40);
    editor.insert('b');
    let row = editor.document().row(0);
    assert_eq!((row[0].size, row[0].style), (10, GlyphStyle::Plain));
    assert_eq!((row[1].size, row[1].style), (40, GlyphStyle::Bold));
}

#[test]
fn test_loaded_rows_park_cursor_at_end() {
    let mut editor = TextEditor::new(10);
    let rows = editor_with("one\ntwo!").document().rows().to_vec();
    editor.load_rows(rows);
    assert_eq!(editor.cursor(), Cursor::new(1, 4));
    assert!(!editor.document().can_undo());
    assert_eq!(editor.scroll(), 0.0);
}

#[test]
fn test_wrapped_lines_wrap_to_themselves() {
    let editor = editor_with("hi abcdefghij  the quick\n\nbrown fox jumps");
    let metrics = FixedMetrics::new(1.0);
    let lines = editor.visual_lines(&metrics, 6.0);

    let mut rewrapped = TextEditor::new(10);
    rewrapped.load_rows(lines.iter().map(|line| line.glyphs.clone()).collect());
    let again = rewrapped.visual_lines(&metrics, 6.0);

    assert_eq!(again.len(), lines.len());
    for (row, (line, wrapped)) in lines.iter().zip(&again).enumerate() {
        assert_eq!(wrapped.row, row);
        assert_eq!(wrapped.glyphs, line.glyphs);
        assert_eq!(wrapped.widths, line.widths);
    }
}
