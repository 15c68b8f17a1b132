//! Soft-wrap layout: logical rows to visual lines.

use super::document::RichDocument;
use super::glyph::{Glyph, GlyphStyle};

/// Vertical space between visual lines, in pixels
pub const LINE_GAP: f32 = 6.0;

/// Measures glyphs for layout. The egui front-end measures through its font
/// atlas; tests use [`FixedMetrics`].
pub trait GlyphMetrics {
    fn glyph_width(&self, glyph: &Glyph) -> f32;

    fn line_height(&self, size: u32, style: GlyphStyle) -> f32;

    fn glyph_height(&self, glyph: &Glyph) -> f32 {
        self.line_height(glyph.size, glyph.style)
    }
}

/// Every glyph is `advance` wide and as tall as its point size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    pub advance: f32,
}

impl FixedMetrics {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl GlyphMetrics for FixedMetrics {
    fn glyph_width(&self, _glyph: &Glyph) -> f32 {
        self.advance
    }

    fn line_height(&self, size: u32, _style: GlyphStyle) -> f32 {
        size as f32
    }
}

/// Maximal run of glyphs sharing the same whitespace class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub start: usize,
    pub end: usize,
    pub widths: &'a [f32],
    pub is_space: bool,
}

impl Token<'_> {
    pub fn width(&self) -> f32 {
        self.widths.iter().sum()
    }
}

pub fn tokenize_row<'a>(glyphs: &[Glyph], widths: &'a [f32]) -> Vec<Token<'a>> {
    let Some(first) = glyphs.first() else {
        return Vec::new();
    };
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current_space = first.ch.is_whitespace();
    for (idx, glyph) in glyphs.iter().enumerate() {
        let is_space = glyph.ch.is_whitespace();
        if is_space != current_space {
            tokens.push(Token {
                start,
                end: idx,
                widths: &widths[start..idx],
                is_space: current_space,
            });
            start = idx;
            current_space = is_space;
        }
    }
    tokens.push(Token {
        start,
        end: glyphs.len(),
        widths: &widths[start..],
        is_space: current_space,
    });
    tokens
}

/// Greedy token packing into `[start, end)` column ranges no wider than
/// `max_width`.
///
/// A token wider than the whole line starts on a fresh line and is split
/// glyph by glyph; a single glyph wider than the line still gets a line of
/// its own. Whitespace tokens are kept, never trimmed.
pub fn wrap_tokens(tokens: &[Token<'_>], max_width: f32) -> Vec<(usize, usize)> {
    if max_width <= 0.0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    let mut line_width = 0.0;

    for token in tokens {
        let token_width = token.width();
        if token_width <= max_width {
            let joins = current.is_some() && line_width + token_width <= max_width;
            if let Some((_, end)) = current.as_mut().filter(|_| joins) {
                *end = token.end;
                line_width += token_width;
            } else {
                lines.extend(current.take());
                current = Some((token.start, token.end));
                line_width = token_width;
            }
            continue;
        }

        lines.extend(current.take());
        line_width = 0.0;

        let mut i = 0;
        while i < token.widths.len() {
            let mut acc = 0.0;
            let mut j = i;
            while j < token.widths.len() && (acc + token.widths[j] <= max_width || acc == 0.0) {
                acc += token.widths[j];
                j += 1;
            }
            lines.push((token.start + i, token.start + j));
            i = j;
        }
    }

    lines.extend(current);
    lines
}

/// One rendered line: columns `[start_col, end_col)` of logical `row`
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    pub row: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub glyphs: Vec<Glyph>,
    pub widths: Vec<f32>,
    pub height: f32,
}

impl VisualLine {
    pub fn width(&self) -> f32 {
        self.widths.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Pixel offset of `col` from the start of this line, clamped to its span
    pub fn x_for_col(&self, col: usize) -> f32 {
        if self.widths.is_empty() || col <= self.start_col {
            return 0.0;
        }
        let upto = (col - self.start_col).min(self.widths.len());
        self.widths[..upto].iter().sum()
    }

    /// Column nearest to `target_x`, splitting each glyph at its midpoint
    pub fn col_for_x(&self, target_x: f32) -> usize {
        let mut x = 0.0;
        for (idx, width) in self.widths.iter().enumerate() {
            if target_x <= x + width / 2.0 {
                return self.start_col + idx;
            }
            x += width;
        }
        self.end_col
    }
}

/// Wraps every row of `doc` at `max_width`.
///
/// Empty rows still produce one zero-width line whose height comes from the
/// row's remembered style, or from the selected style on the cursor's row.
pub fn build_visual_lines(
    doc: &RichDocument,
    metrics: &dyn GlyphMetrics,
    max_width: f32,
) -> Vec<VisualLine> {
    let max_width = max_width.max(1.0);
    let cursor_row = doc.cursor().row;
    let mut lines = Vec::new();

    for (row_idx, row) in doc.rows().iter().enumerate() {
        if row.is_empty() {
            let style = if row_idx == cursor_row {
                doc.selected()
            } else {
                doc.line_style(row_idx)
            };
            lines.push(VisualLine {
                row: row_idx,
                start_col: 0,
                end_col: 0,
                glyphs: Vec::new(),
                widths: Vec::new(),
                height: metrics.line_height(style.size, style.style),
            });
            continue;
        }

        let row_widths: Vec<f32> = row.iter().map(|glyph| metrics.glyph_width(glyph)).collect();
        let tokens = tokenize_row(row, &row_widths);
        for (start, end) in wrap_tokens(&tokens, max_width) {
            let glyphs = row[start..end].to_vec();
            let height = glyphs
                .iter()
                .map(|glyph| metrics.glyph_height(glyph))
                .fold(0.0, f32::max);
            lines.push(VisualLine {
                row: row_idx,
                start_col: start,
                end_col: end,
                glyphs,
                widths: row_widths[start..end].to_vec(),
                height,
            });
        }
    }
    lines
}

/// Total height of `lines` with gaps between, not after, them
pub fn content_height(lines: &[VisualLine]) -> f32 {
    if lines.is_empty() {
        return 0.0;
    }
    let total: f32 = lines.iter().map(|line| line.height + LINE_GAP).sum();
    (total - LINE_GAP).max(0.0)
}
