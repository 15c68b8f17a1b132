use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{PersistenceError, PersistenceResult};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// True for the picture formats the viewer can decode
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Cached thumbnail file name: `<stem>_<ext>.png`, extension lowercased
pub fn thumb_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    format!("{stem}_{ext}.png")
}

/// Read-only view of the photo directory
#[derive(Debug, Clone)]
pub struct PhotoLibrary {
    dir: PathBuf,
}

impl PhotoLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pictures in the library, newest modification first; ties go by
    /// lowercase file name
    pub fn list_photos(&self) -> PersistenceResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|err| PersistenceError::io(&self.dir, err))?;
        let mut photos: Vec<(SystemTime, String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image(path))
            .map(|path| {
                let mtime = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                (mtime, name, path)
            })
            .collect();

        photos.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        Ok(photos.into_iter().map(|(_, _, path)| path).collect())
    }

    /// Like [`list_photos`](Self::list_photos), but a missing or unreadable
    /// library is simply empty
    pub fn photos_or_empty(&self) -> Vec<PathBuf> {
        self.list_photos().unwrap_or_else(|err| {
            log::warn!("Cannot list photos: {err}");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_ignores_case() {
        assert!(is_image(Path::new("a/B.JPG")));
        assert!(is_image(Path::new("x.gif")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("png")));
    }

    #[test]
    fn test_thumb_name() {
        assert_eq!(thumb_name(Path::new("/lib/Beach.JPG")), "Beach_jpg.png");
        assert_eq!(thumb_name(Path::new("cat.png")), "cat_png.png");
    }
}
