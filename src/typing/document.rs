use std::collections::VecDeque;

use super::glyph::{Glyph, GlyphStyle, LineStyle};

/// Undo depth for text edits
pub const TEXT_UNDO_MAX_DEPTH: usize = 20;

/// Logical cursor: `col` is an insertion index in `0..=row.len()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Exact inverse record of one edit; `cursor` is where the cursor was
/// before the edit happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    InsertGlyph {
        row: usize,
        col: usize,
        glyph: Glyph,
        cursor: Cursor,
    },
    InsertNewline {
        row: usize,
        col: usize,
        cursor: Cursor,
    },
    DeleteGlyph {
        row: usize,
        col: usize,
        glyph: Glyph,
        cursor: Cursor,
    },
    /// Row `row` was joined with the row below at column `col`;
    /// `below_style` is the style memory the lower row had
    DeleteNewline {
        row: usize,
        col: usize,
        below_style: LineStyle,
        cursor: Cursor,
    },
}

impl EditOp {
    pub fn cursor_before(&self) -> Cursor {
        match self {
            Self::InsertGlyph { cursor, .. }
            | Self::InsertNewline { cursor, .. }
            | Self::DeleteGlyph { cursor, .. }
            | Self::DeleteNewline { cursor, .. } => *cursor,
        }
    }
}

/// Rows of styled glyphs plus the logical cursor and text undo history.
///
/// There is always at least one row. `line_styles` runs parallel to `rows`
/// and remembers the size/style a row was last typed in, so empty rows keep
/// a sensible height.
#[derive(Debug, Clone)]
pub struct RichDocument {
    rows: Vec<Vec<Glyph>>,
    line_styles: Vec<LineStyle>,
    default_style: LineStyle,
    selected: LineStyle,
    cursor: Cursor,
    undo_stack: VecDeque<EditOp>,
}

impl RichDocument {
    pub fn new(default_size: u32) -> Self {
        let default_style = LineStyle::new(default_size.max(1), GlyphStyle::Plain);
        Self {
            rows: vec![Vec::new()],
            line_styles: vec![default_style],
            default_style,
            selected: default_style,
            cursor: Cursor::default(),
            undo_stack: VecDeque::with_capacity(TEXT_UNDO_MAX_DEPTH + 1),
        }
    }

    pub fn rows(&self) -> &[Vec<Glyph>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[Glyph] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.row(row).len()
    }

    pub fn line_style(&self, row: usize) -> LineStyle {
        self.line_styles.get(row).copied().unwrap_or(self.default_style)
    }

    pub fn default_style(&self) -> LineStyle {
        self.default_style
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Moves the cursor, clamping it into the document
    pub fn set_cursor(&mut self, cursor: Cursor) {
        let row = cursor.row.min(self.rows.len() - 1);
        self.cursor = Cursor::new(row, cursor.col.min(self.row_len(row)));
    }

    /// Size and style applied to the next typed glyph
    pub fn selected(&self) -> LineStyle {
        self.selected
    }

    pub fn select_size(&mut self, size: u32) {
        self.selected.size = size.max(1);
    }

    pub fn select_style(&mut self, style: GlyphStyle) {
        self.selected.style = style;
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Plain text with rows joined by newlines
    pub fn text(&self) -> String {
        rows_to_text(&self.rows)
    }

    fn push_undo(&mut self, op: EditOp) {
        self.undo_stack.push_back(op);
        while self.undo_stack.len() > TEXT_UNDO_MAX_DEPTH {
            self.undo_stack.pop_front();
        }
    }

    /// Types `ch` at the cursor using the selected size/style; `'\n'` splits
    /// the row
    pub fn insert(&mut self, ch: char) {
        let cursor = self.cursor;
        if ch == '\n' {
            self.insert_newline_at(cursor.row, cursor.col, self.selected);
            self.cursor = Cursor::new(cursor.row + 1, 0);
            self.push_undo(EditOp::InsertNewline {
                row: cursor.row,
                col: cursor.col,
                cursor,
            });
            return;
        }

        let glyph = self.selected.glyph(ch);
        self.insert_glyph_at(cursor.row, cursor.col, glyph);
        self.cursor.col += 1;
        self.push_undo(EditOp::InsertGlyph {
            row: cursor.row,
            col: cursor.col,
            glyph,
            cursor,
        });
    }

    /// Backspace. Returns false at the start of the document.
    pub fn delete_backward(&mut self) -> bool {
        let cursor = self.cursor;
        if cursor.col > 0 {
            let Some(glyph) = self.remove_glyph_at(cursor.row, cursor.col - 1) else {
                return false;
            };
            self.cursor.col -= 1;
            self.push_undo(EditOp::DeleteGlyph {
                row: cursor.row,
                col: cursor.col - 1,
                glyph,
                cursor,
            });
            return true;
        }
        if cursor.row == 0 {
            return false;
        }

        let prev_row = cursor.row - 1;
        let join_col = self.row_len(prev_row);
        let below_style = self.line_style(cursor.row);
        self.remove_newline_at(prev_row);
        self.cursor = Cursor::new(prev_row, join_col);
        self.push_undo(EditOp::DeleteNewline {
            row: prev_row,
            col: join_col,
            below_style,
            cursor,
        });
        true
    }

    /// Reverts the most recent edit and restores the cursor it recorded
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.undo_stack.pop_back() else {
            return false;
        };
        match op {
            EditOp::InsertGlyph { row, col, .. } => {
                self.remove_glyph_at(row, col);
            }
            EditOp::InsertNewline { row, .. } => self.remove_newline_at(row),
            EditOp::DeleteGlyph { row, col, glyph, .. } => self.insert_glyph_at(row, col, glyph),
            EditOp::DeleteNewline {
                row, col, below_style, ..
            } => self.insert_newline_at(row, col, below_style),
        }
        self.set_cursor(op.cursor_before());
        true
    }

    /// Left arrow; wraps to the end of the previous row
    pub fn move_left(&mut self) -> bool {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
            return true;
        }
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.row_len(self.cursor.row);
            return true;
        }
        false
    }

    /// Right arrow; wraps to the start of the next row
    pub fn move_right(&mut self) -> bool {
        if self.cursor.col < self.row_len(self.cursor.row) {
            self.cursor.col += 1;
            return true;
        }
        if self.cursor.row + 1 < self.rows.len() {
            self.cursor.row += 1;
            self.cursor.col = 0;
            return true;
        }
        false
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = self.row_len(self.cursor.row);
    }

    /// Moves by whole logical rows, keeping the column where it fits
    pub fn move_rows(&mut self, delta: isize) {
        let last = self.rows.len() - 1;
        let row = self.cursor.row.saturating_add_signed(delta).min(last);
        if row == self.cursor.row {
            return;
        }
        self.set_cursor(Cursor::new(row, self.cursor.col));
    }

    /// Empties the document and its history; the size/style selection stays
    pub fn clear(&mut self) {
        self.rows = vec![Vec::new()];
        self.line_styles = vec![self.default_style];
        self.undo_stack.clear();
        self.cursor = Cursor::default();
    }

    /// Swaps in recalled rows, dropping history and parking the cursor at the
    /// end of the last row
    pub fn replace_rows(&mut self, rows: Vec<Vec<Glyph>>) {
        let rows = if rows.is_empty() { vec![Vec::new()] } else { rows };
        self.line_styles = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| match row.last() {
                Some(glyph) => glyph.line_style(),
                None => self.line_styles.get(idx).copied().unwrap_or(self.default_style),
            })
            .collect();
        self.rows = rows;
        self.undo_stack.clear();
        let last = self.rows.len() - 1;
        self.cursor = Cursor::new(last, self.row_len(last));
    }

    fn insert_glyph_at(&mut self, row: usize, col: usize, glyph: Glyph) {
        let Some(line) = self.rows.get_mut(row) else {
            return;
        };
        line.insert(col.min(line.len()), glyph);
        self.line_styles[row] = glyph.line_style();
    }

    fn remove_glyph_at(&mut self, row: usize, col: usize) -> Option<Glyph> {
        let line = self.rows.get_mut(row)?;
        (col < line.len()).then(|| line.remove(col))
    }

    /// Splits `row` at `col`; an empty right half remembers `empty_style`
    fn insert_newline_at(&mut self, row: usize, col: usize, empty_style: LineStyle) {
        let Some(line) = self.rows.get_mut(row) else {
            return;
        };
        let right = line.split_off(col.min(line.len()));
        if let Some(last) = line.last() {
            self.line_styles[row] = last.line_style();
        }
        let right_style = right.last().map(Glyph::line_style).unwrap_or(empty_style);
        self.rows.insert(row + 1, right);
        self.line_styles.insert(row + 1, right_style);
    }

    fn remove_newline_at(&mut self, row: usize) {
        if row + 1 >= self.rows.len() {
            return;
        }
        let next = self.rows.remove(row + 1);
        self.line_styles.remove(row + 1);
        self.rows[row].extend(next);
        if let Some(last) = self.rows[row].last() {
            self.line_styles[row] = last.line_style();
        }
    }
}

pub fn rows_to_text(rows: &[Vec<Glyph>]) -> String {
    rows.iter()
        .map(|row| row.iter().map(|glyph| glyph.ch).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
