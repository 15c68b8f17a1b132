use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::DEFAULT_MAX_ARCHIVES;
use crate::error::{PersistenceError, PersistenceResult};
use crate::raster::Canvas;
use crate::util::time;

/// File name of the in-progress working canvas
pub const LATEST_FILE: &str = "latest.png";

/// Stores finished canvases as timestamped PNGs next to the mutable
/// `latest.png` working copy
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
    max_archives: usize,
}

/// Writes `canvas` to a dot-prefixed temp file in the same directory, then
/// renames it over `path`, so readers never observe a partial PNG
pub fn save_atomic(canvas: &Canvas, path: &Path) -> PersistenceResult<()> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "canvas".to_owned());
    let tmp_path = path.with_file_name(format!(".{stem}.tmp.png"));

    if let Err(err) = canvas.save_png(&tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        PersistenceError::io(path, err)
    })
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

impl ArchiveStore {
    /// Opens (creating if needed) the archive directory
    pub fn open(dir: impl Into<PathBuf>, max_archives: usize) -> PersistenceResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| PersistenceError::io(&dir, err))?;
        Ok(Self { dir, max_archives })
    }

    pub fn with_default_limit(dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
        Self::open(dir, DEFAULT_MAX_ARCHIVES)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_archives(&self) -> usize {
        self.max_archives
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    /// Archived canvases, newest first by (mtime, name).
    ///
    /// `latest.png` and hidden temp files are never archives.
    pub fn list_archives(&self) -> PersistenceResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|err| PersistenceError::io(&self.dir, err))?;
        let mut archives: Vec<(SystemTime, String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_png = Path::new(&name)
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
                if !is_png || name == LATEST_FILE || name.starts_with('.') {
                    return None;
                }
                let path = entry.path();
                Some((modified_time(&path), name, path))
            })
            .collect();

        archives.sort_by(|a, b| (b.0, &b.1).cmp(&(a.0, &a.1)));
        Ok(archives.into_iter().map(|(_, _, path)| path).collect())
    }

    /// First free `YYYY-MM-DD_HHMMSS[_n].png` path for `now`
    pub fn next_archive_path(&self, now: NaiveDateTime) -> PathBuf {
        let stamp = time::archive_stamp(now);
        let mut path = self.dir.join(format!("{stamp}.png"));
        let mut counter = 1;
        while path.exists() {
            path = self.dir.join(format!("{stamp}_{counter}.png"));
            counter += 1;
        }
        path
    }

    /// Saves `canvas` as a new archive, then trims old archives
    pub fn archive(&self, canvas: &Canvas, now: NaiveDateTime) -> PersistenceResult<PathBuf> {
        let path = self.next_archive_path(now);
        save_atomic(canvas, &path)?;
        log::info!("Archived canvas to {}", path.display());
        self.enforce_retention();
        Ok(path)
    }

    /// Deletes the oldest archives beyond `max_archives`.
    ///
    /// Listing or deletion failures stop the sweep for this call. Returns the
    /// number of files removed.
    pub fn enforce_retention(&self) -> usize {
        let mut archives = match self.list_archives() {
            Ok(archives) => archives,
            Err(err) => {
                log::warn!("Skipping archive retention: {err}");
                return 0;
            }
        };

        let mut removed = 0;
        while archives.len() > self.max_archives {
            let Some(oldest) = archives.pop() else {
                break;
            };
            if let Err(err) = fs::remove_file(&oldest) {
                log::warn!("Failed to delete old archive {}: {}", oldest.display(), err);
                break;
            }
            removed += 1;
        }
        if removed > 0 {
            log::debug!("Removed {removed} old archives from {}", self.dir.display());
        }
        removed
    }

    /// Atomically overwrites `latest.png`
    pub fn autosave_latest(&self, canvas: &Canvas) -> PersistenceResult<()> {
        save_atomic(canvas, &self.latest_path())
    }

    /// Moves a `latest.png` left over from a previous session into a
    /// timestamped archive. Returns the archive path when one was created.
    pub fn rollover_latest(&self, now: NaiveDateTime) -> PersistenceResult<Option<PathBuf>> {
        let latest = self.latest_path();
        if !latest.exists() {
            return Ok(None);
        }
        let archive = self.next_archive_path(now);
        fs::rename(&latest, &archive).map_err(|err| PersistenceError::io(&latest, err))?;
        log::info!("Rolled previous canvas over to {}", archive.display());
        Ok(Some(archive))
    }

    /// Loads an archive scaled to the canvas size
    pub fn load_canvas(&self, path: &Path, width: u32, height: u32) -> PersistenceResult<Canvas> {
        Canvas::load_scaled(path, width, height)
    }

    /// Newest archive that still decodes, scaled to a preview size
    pub fn newest_preview(&self, width: u32, height: u32) -> Option<Canvas> {
        let archives = self.list_archives().ok()?;
        archives
            .iter()
            .find_map(|path| Canvas::load_scaled(path, width, height).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_archive_names_disambiguate() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_default_limit(dir.path()).unwrap();
        let canvas = Canvas::blank(4, 4);

        let first = store.archive(&canvas, at(12, 0, 0)).unwrap();
        let second = store.archive(&canvas, at(12, 0, 0)).unwrap();
        let third = store.archive(&canvas, at(12, 0, 0)).unwrap();
        assert_eq!(first.file_name().unwrap(), "2024-01-02_120000.png");
        assert_eq!(second.file_name().unwrap(), "2024-01-02_120000_1.png");
        assert_eq!(third.file_name().unwrap(), "2024-01-02_120000_2.png");
    }

    #[test]
    fn test_list_excludes_latest_and_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_default_limit(dir.path()).unwrap();
        fs::write(dir.path().join(LATEST_FILE), b"").unwrap();
        fs::write(dir.path().join(".latest.tmp.png"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("2024-01-01_120000.png"), b"").unwrap();

        let names: Vec<_> = store
            .list_archives()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["2024-01-01_120000.png"]);
    }

    #[test]
    fn test_autosave_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_default_limit(dir.path()).unwrap();
        store.autosave_latest(&Canvas::blank(4, 4)).unwrap();

        assert!(store.latest_path().exists());
        let hidden = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
            .count();
        assert_eq!(hidden, 0);
    }

    #[test]
    fn test_rollover_without_latest_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_default_limit(dir.path()).unwrap();
        assert_eq!(store.rollover_latest(at(8, 0, 0)).unwrap(), None);
    }

    #[test]
    fn test_newest_preview_skips_broken_archives() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::with_default_limit(dir.path()).unwrap();
        assert!(store.newest_preview(2, 2).is_none());

        store.archive(&Canvas::blank(4, 4), at(9, 0, 0)).unwrap();
        // written last, so it sorts first, but it cannot be decoded
        fs::write(dir.path().join("2024-01-02_090000_9.png"), b"junk").unwrap();
        let preview = store.newest_preview(2, 2).unwrap();
        assert_eq!(preview.size(), (2, 2));
    }
}
