use image::{RgbaImage, imageops::FilterType};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::library::{is_image, thumb_name};
use crate::error::{PersistenceError, PersistenceResult};

/// Largest size that fits `(max_w, max_h)` with the same aspect ratio.
///
/// Images that already fit are left alone; nothing is upscaled.
pub fn fit_size(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_w && height <= max_h) {
        return (width, height);
    }
    let scale = (max_w as f32 / width as f32).min(max_h as f32 / height as f32);
    let w = ((width as f32 * scale) as u32).max(1);
    let h = ((height as f32 * scale) as u32).max(1);
    (w, h)
}

/// Decodes `path` as RGBA and shrinks it to fit the box
pub fn load_fitted(path: &Path, max_w: u32, max_h: u32) -> PersistenceResult<RgbaImage> {
    let decoded = image::open(path)
        .map_err(|err| PersistenceError::image(path, err))?
        .to_rgba8();
    Ok(fit_image(decoded, max_w, max_h))
}

fn fit_image(image: RgbaImage, max_w: u32, max_h: u32) -> RgbaImage {
    let (w, h) = fit_size(image.width(), image.height(), max_w, max_h);
    if (w, h) == image.dimensions() {
        return image;
    }
    image::imageops::resize(&image, w, h, FilterType::Triangle)
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// On-disk thumbnail cache beside the photo library
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn open(dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| PersistenceError::io(&dir, err))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn thumb_path(&self, source: &Path) -> PathBuf {
        self.dir.join(thumb_name(source))
    }

    /// Thumbnail of `source` no larger than the box.
    ///
    /// A cached file at least as new as the source is reused; otherwise the
    /// source is decoded, shrunk and written back to the cache. Failing to
    /// write the cache still returns the thumbnail.
    pub fn thumbnail(&self, source: &Path, max_w: u32, max_h: u32) -> PersistenceResult<RgbaImage> {
        let source_mtime = fs::metadata(source)
            .and_then(|meta| meta.modified())
            .map_err(|err| PersistenceError::io(source, err))?;
        let cached = self.thumb_path(source);

        if modified(&cached).is_some_and(|thumb_mtime| thumb_mtime >= source_mtime) {
            match load_fitted(&cached, max_w, max_h) {
                Ok(thumb) => return Ok(thumb),
                Err(err) => log::debug!("Regenerating thumbnail: {err}"),
            }
        }

        let thumb = load_fitted(source, max_w, max_h)?;
        if let Err(err) = thumb.save_with_format(&cached, image::ImageFormat::Png) {
            log::warn!("Failed to cache thumbnail {}: {}", cached.display(), err);
        }
        Ok(thumb)
    }

    /// Deletes cached thumbnails whose source picture is gone.
    ///
    /// Returns how many were removed; errors end the sweep early.
    pub fn cleanup(&self, library_dir: &Path) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Skipping thumbnail cleanup: {err}");
                return 0;
            }
        };

        let mut removed = 0;
        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let Some((source_stem, ext)) = stem.rsplit_once('_') else {
                continue;
            };
            if !is_png {
                continue;
            }
            let source = library_dir.join(format!("{source_stem}.{ext}"));
            if !is_image(&source) || source.exists() {
                continue;
            }
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("Failed to delete thumbnail {}: {}", path.display(), err);
                break;
            }
            removed += 1;
        }
        removed
    }
}
