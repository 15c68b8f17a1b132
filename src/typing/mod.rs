//! Rich-text typing pad: styled glyph rows, soft-wrap layout, cursor
//! navigation and the session log.

pub mod document;
pub mod editor;
pub mod glyph;
pub mod layout;
pub mod sessions;

pub use document::{Cursor, EditOp, RichDocument, TEXT_UNDO_MAX_DEPTH};
pub use editor::{CursorPlacement, TextEditor, VerticalDirection};
pub use glyph::{Glyph, GlyphStyle, LineStyle};
pub use layout::{FixedMetrics, GlyphMetrics, LINE_GAP, VisualLine};
pub use sessions::{RecallSession, SessionLog};

/// The three size buttons: default, double and quadruple
pub fn size_values(default_size: u32) -> [u32; 3] {
    let base = default_size.max(1);
    [base, base * 2, base * 4]
}
