//! egui front-end: the launcher and one view per mini-app.

pub mod launcher;
pub mod paint_view;
pub mod photos_view;
pub mod strip;
pub mod texture_cache;
pub mod typing_view;
pub mod widgets;

pub use launcher::{AppKind, launcher};
pub use paint_view::PaintView;
pub use photos_view::PhotosView;
pub use strip::ScrollStrip;
pub use texture_cache::{TextureCache, TextureKey};
pub use typing_view::{EguiGlyphMetrics, TypingView};
pub use widgets::{ButtonFace, KioskButton};
