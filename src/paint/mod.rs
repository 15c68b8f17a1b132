//! Paint canvas: tools, strokes, bounded undo/redo and the on-disk archive.

pub mod archive;
pub mod history;
pub mod session;
pub mod stroke;
pub mod tool;

pub use archive::{ArchiveStore, LATEST_FILE};
pub use history::{SnapshotHistory, UNDO_MAX_DEPTH};
pub use session::{PaintSession, RecallItem, RecallSource};
pub use stroke::{FountainNib, Stroke};
pub use tool::ToolKind;
