//! Photo viewer: library listing, cached thumbnails and navigation.

pub mod library;
pub mod thumbs;
pub mod viewer;

pub use library::{PhotoLibrary, is_image, thumb_name};
pub use thumbs::{ThumbnailCache, fit_size, load_fitted};
pub use viewer::{PhotoViewer, SWIPE_THRESHOLD};
