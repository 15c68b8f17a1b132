use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PersistenceError, PersistenceResult};
use crate::raster::Rgb;

pub const DEFAULT_MAX_ARCHIVES: usize = 100;

/// Top-level kiosk configuration.
///
/// Every section carries `#[serde(default)]`, so a partial document only
/// overrides the keys it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub data_root: PathBuf,
    pub paint: PaintConfig,
    pub typing: TypingConfig,
    pub photos: PhotosConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub autosave_seconds: u64,
    #[serde(deserialize_with = "archive_limit")]
    pub max_archives: usize,
    pub palette: Vec<[u8; 3]>,
    /// Fixed canvas size; derived from the window when absent
    pub canvas_size: Option<[u32; 2]>,
    /// Picture offered by recall while there are no archives yet
    pub recall_demo: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub default_text_size: u32,
    pub recall_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    pub initial_thumbs: usize,
    pub thumb_batch: usize,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("/data/kidbox"),
            paint: PaintConfig::default(),
            typing: TypingConfig::default(),
            photos: PhotosConfig::default(),
        }
    }
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            autosave_seconds: 10,
            max_archives: DEFAULT_MAX_ARCHIVES,
            palette: vec![
                [0, 0, 0],
                [255, 255, 255],
                [220, 20, 60],
                [255, 127, 0],
                [255, 215, 0],
                [34, 139, 34],
                [0, 128, 128],
                [30, 144, 255],
                [65, 105, 225],
                [138, 43, 226],
                [255, 105, 180],
                [210, 105, 30],
                [105, 105, 105],
                [0, 191, 255],
                [154, 205, 50],
                [255, 99, 71],
            ],
            canvas_size: None,
            recall_demo: None,
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            default_text_size: 25,
            recall_limit: 200,
        }
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            initial_thumbs: 10,
            thumb_batch: 2,
        }
    }
}

/// Negative limits clamp to zero rather than failing the whole document
fn archive_limit<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.max(0) as usize)
}

impl PaintConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_seconds.max(1))
    }

    pub fn palette_colors(&self) -> Vec<Rgb> {
        self.palette.iter().map(|rgb| image::Rgb(*rgb)).collect()
    }
}

impl KioskConfig {
    pub fn from_json_str(json: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads the configuration at `path`, falling back to defaults when the
    /// file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(err) if err.is_not_found() => {
                log::info!("No configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring configuration {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> PersistenceResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| PersistenceError::io(path, err))?;
        Self::from_json_str(&json)
    }

    pub fn paint_dir(&self) -> PathBuf {
        self.data_root.join("paint")
    }

    pub fn typing_dir(&self) -> PathBuf {
        self.data_root.join("typing")
    }

    pub fn photos_library_dir(&self) -> PathBuf {
        self.data_root.join("photos").join("library")
    }

    pub fn photos_thumb_dir(&self) -> PathBuf {
        self.data_root.join("photos").join("thumbs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = KioskConfig::from_json_str(
            r#"{"data_root": "/tmp/data", "paint": {"autosave_seconds": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/tmp/data"));
        assert_eq!(config.paint.autosave_seconds, 5);
        assert_eq!(config.paint.max_archives, DEFAULT_MAX_ARCHIVES);
        assert_eq!(config.paint.palette.len(), 16);
        assert_eq!(config.typing.default_text_size, 25);
        assert_eq!(config.paint_dir(), PathBuf::from("/tmp/data/paint"));
    }

    #[test]
    fn test_negative_archive_limit_clamps() {
        let config = KioskConfig::from_json_str(r#"{"paint": {"max_archives": -3}}"#).unwrap();
        assert_eq!(config.paint.max_archives, 0);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = KioskConfig::load(&dir.path().join("missing.json"));
        assert_eq!(missing, KioskConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(KioskConfig::load(&broken), KioskConfig::default());
    }
}
