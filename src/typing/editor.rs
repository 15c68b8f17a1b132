use super::document::{Cursor, RichDocument};
use super::glyph::{Glyph, GlyphStyle};
use super::layout::{self, GlyphMetrics, LINE_GAP, VisualLine};

/// Where the cursor sits in the wrapped layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPlacement {
    /// Index into the visual line list
    pub line: usize,
    /// Top of that line in content coordinates
    pub top: f32,
    pub height: f32,
    /// Offset from the left edge of the line
    pub x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// A [`RichDocument`] bound to a viewport: sticky column and scroll offset.
///
/// The sticky column is the horizontal pixel target reused by consecutive
/// vertical moves. Edits, horizontal moves, home and end mark it dirty; it
/// is re-read from the cursor the next time it is needed.
#[derive(Debug, Clone)]
pub struct TextEditor {
    doc: RichDocument,
    x_target: Option<f32>,
    x_target_dirty: bool,
    scroll: f32,
}

impl TextEditor {
    pub fn new(default_size: u32) -> Self {
        Self {
            doc: RichDocument::new(default_size),
            x_target: None,
            x_target_dirty: false,
            scroll: 0.0,
        }
    }

    pub fn document(&self) -> &RichDocument {
        &self.doc
    }

    pub fn cursor(&self) -> Cursor {
        self.doc.cursor()
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn x_target(&self) -> Option<f32> {
        self.x_target
    }

    pub fn is_x_target_dirty(&self) -> bool {
        self.x_target_dirty
    }

    fn mark_x_target_dirty(&mut self) {
        self.x_target_dirty = true;
    }

    pub fn insert(&mut self, ch: char) {
        self.doc.insert(ch);
        self.mark_x_target_dirty();
    }

    pub fn delete_backward(&mut self) {
        if self.doc.delete_backward() {
            self.mark_x_target_dirty();
        }
    }

    pub fn undo(&mut self) {
        if self.doc.undo() {
            self.mark_x_target_dirty();
        }
    }

    pub fn move_left(&mut self) {
        if self.doc.move_left() {
            self.mark_x_target_dirty();
        }
    }

    pub fn move_right(&mut self) {
        if self.doc.move_right() {
            self.mark_x_target_dirty();
        }
    }

    pub fn move_home(&mut self) {
        self.doc.move_home();
        self.mark_x_target_dirty();
    }

    pub fn move_end(&mut self) {
        self.doc.move_end();
        self.mark_x_target_dirty();
    }

    /// Places the cursor directly, e.g. from a tap
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.doc.set_cursor(cursor);
        self.mark_x_target_dirty();
    }

    pub fn select_size(&mut self, size: u32) {
        self.doc.select_size(size);
    }

    pub fn select_style(&mut self, style: GlyphStyle) {
        self.doc.select_style(style);
    }

    /// Logical rows moved by one page for a viewport of `view_height`
    pub fn lines_per_page(&self, view_height: f32) -> usize {
        let step = self.doc.selected().size as f32 + LINE_GAP;
        ((view_height / step).floor() as usize).max(1)
    }

    pub fn page_up(&mut self, view_height: f32) {
        let rows = self.lines_per_page(view_height) as isize;
        self.doc.move_rows(-rows);
    }

    pub fn page_down(&mut self, view_height: f32) {
        let rows = self.lines_per_page(view_height) as isize;
        self.doc.move_rows(rows);
    }

    /// Empties the document; the next vertical move starts from column 0
    pub fn clear(&mut self) {
        self.doc.clear();
        self.x_target = Some(0.0);
        self.x_target_dirty = false;
        self.scroll = 0.0;
    }

    /// Replaces the document with recalled rows
    pub fn load_rows(&mut self, rows: Vec<Vec<Glyph>>) {
        self.doc.replace_rows(rows);
        self.x_target = None;
        self.x_target_dirty = true;
        self.scroll = 0.0;
    }

    pub fn visual_lines(&self, metrics: &dyn GlyphMetrics, max_width: f32) -> Vec<VisualLine> {
        layout::build_visual_lines(&self.doc, metrics, max_width)
    }

    /// Locates the cursor in `lines`.
    ///
    /// At a soft-wrap break the cursor belongs to the following line when
    /// that line starts exactly at the cursor column.
    pub fn cursor_visual_position(&self, lines: &[VisualLine]) -> CursorPlacement {
        let cursor = self.doc.cursor();
        let mut top = 0.0;
        let mut fallback: Option<(usize, f32)> = None;

        for (idx, line) in lines.iter().enumerate() {
            if line.row == cursor.row {
                fallback.get_or_insert((idx, top));
                let within = (line.start_col..=line.end_col).contains(&cursor.col);
                let continues = cursor.col == line.end_col
                    && !line.is_empty()
                    && lines
                        .get(idx + 1)
                        .is_some_and(|next| next.row == cursor.row && next.start_col == cursor.col);
                if within && !continues {
                    return CursorPlacement {
                        line: idx,
                        top,
                        height: line.height,
                        x: line.x_for_col(cursor.col),
                    };
                }
            }
            top += line.height + LINE_GAP;
        }

        let (idx, top) = fallback.unwrap_or((0, 0.0));
        match lines.get(idx) {
            Some(line) => CursorPlacement {
                line: idx,
                top,
                height: line.height,
                x: line.x_for_col(cursor.col.min(line.end_col)),
            },
            None => CursorPlacement {
                line: 0,
                top: 0.0,
                height: 0.0,
                x: 0.0,
            },
        }
    }

    /// Re-reads the sticky column from the cursor if it is unset or stale
    pub fn refresh_x_target(&mut self, placement: &CursorPlacement) {
        if self.x_target.is_none() || self.x_target_dirty {
            self.x_target = Some(placement.x);
            self.x_target_dirty = false;
        }
    }

    /// Moves one visual line up or down, landing on the column nearest the
    /// sticky horizontal target
    pub fn move_cursor_vertical(&mut self, lines: &[VisualLine], direction: VerticalDirection) {
        if lines.is_empty() {
            return;
        }
        let placement = self.cursor_visual_position(lines);
        self.refresh_x_target(&placement);

        let target_idx = match direction {
            VerticalDirection::Up => placement.line.checked_sub(1),
            VerticalDirection::Down => Some(placement.line + 1).filter(|idx| *idx < lines.len()),
        };
        let Some(target) = target_idx.and_then(|idx| lines.get(idx)) else {
            return;
        };
        let col = target.col_for_x(self.x_target.unwrap_or(0.0));
        self.doc.set_cursor(Cursor::new(target.row, col));
    }

    /// Scrolls the minimum amount that brings the cursor's line fully into
    /// `[scroll, scroll + view_height)`
    pub fn ensure_cursor_visible(
        &mut self,
        lines: &[VisualLine],
        placement: &CursorPlacement,
        view_height: f32,
    ) {
        let content = layout::content_height(lines);
        if content <= view_height {
            self.scroll = 0.0;
            return;
        }
        let max_scroll = (content - view_height).max(0.0);
        let cursor_bottom = placement.top + placement.height;
        if cursor_bottom > self.scroll + view_height {
            self.scroll = cursor_bottom - view_height;
        } else if placement.top < self.scroll {
            self.scroll = placement.top;
        }
        self.scroll = self.scroll.clamp(0.0, max_scroll);
    }

    /// Lays out, refreshes the sticky column and scroll, and returns both
    /// for painting
    pub fn layout(
        &mut self,
        metrics: &dyn GlyphMetrics,
        max_width: f32,
        view_height: f32,
    ) -> (Vec<VisualLine>, CursorPlacement) {
        let lines = self.visual_lines(metrics, max_width);
        let placement = self.cursor_visual_position(&lines);
        self.refresh_x_target(&placement);
        self.ensure_cursor_visible(&lines, &placement, view_height);
        (lines, placement)
    }
}
