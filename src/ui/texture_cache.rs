use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use std::collections::HashMap;

use crate::error::PersistenceResult;
use crate::raster::Canvas;

/// What a cached texture shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Canvas,
    RecallButton,
    RecallThumb(usize),
    PhotoThumb(usize),
    Photo(usize),
}

/// GPU textures owned by the running app, keyed by (what, version).
///
/// Bumping the version for a key makes the next lookup upload fresh pixels
/// and release the previous upload. At most one version per key is held.
pub struct TextureCache {
    textures: HashMap<(TextureKey, u64), TextureHandle>,
    last_used: HashMap<(TextureKey, u64), u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureCache {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            textures: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Call once at the start of every frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Cached texture for `(key, version)`, uploading `generator`'s image on a
    /// miss
    pub fn get_or_create<F>(
        &mut self,
        ctx: &Context,
        key: TextureKey,
        version: u64,
        generator: F,
    ) -> PersistenceResult<TextureId>
    where
        F: FnOnce() -> PersistenceResult<ColorImage>,
    {
        let cache_key = (key, version);
        if let Some(handle) = self.textures.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        // a new version supersedes every older upload of the same key
        self.invalidate(key);
        let name = format!("{key:?}_v{version}");
        let handle = ctx.load_texture(name, image, TextureOptions::LINEAR);
        let id = handle.id();
        self.textures.insert(cache_key, handle);
        self.last_used.insert(cache_key, self.current_frame);
        self.prune_if_needed(cache_key);
        Ok(id)
    }

    /// Drops every version of `key`
    pub fn invalidate(&mut self, key: TextureKey) {
        self.textures.retain(|(k, _), _| *k != key);
        self.last_used.retain(|(k, _), _| *k != key);
    }

    /// Drops every key matching `pred`, e.g. all recall thumbnails
    pub fn invalidate_where(&mut self, pred: impl Fn(&TextureKey) -> bool) {
        self.textures.retain(|(k, _), _| !pred(k));
        self.last_used.retain(|(k, _), _| !pred(k));
    }

    /// Evicts least recently used entries, never `keep`
    fn prune_if_needed(&mut self, keep: (TextureKey, u64)) {
        if self.textures.len() <= self.max_cache_size {
            return;
        }
        let mut entries: Vec<_> = self
            .last_used
            .iter()
            .filter(|(k, _)| **k != keep)
            .map(|(k, v)| (*k, *v))
            .collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = (self.textures.len() - self.max_cache_size).min(entries.len());
        for (key, _) in entries.into_iter().take(to_remove) {
            self.textures.remove(&key);
            self.last_used.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.last_used.clear();
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn contains(&self, key: TextureKey, version: u64) -> bool {
        self.textures.contains_key(&(key, version))
    }
}

pub fn canvas_to_color_image(canvas: &Canvas) -> ColorImage {
    let (w, h) = canvas.size();
    ColorImage::from_rgb([w as usize, h as usize], canvas.as_rgb_bytes())
}

pub fn rgba_to_color_image(image: &RgbaImage) -> ColorImage {
    let (w, h) = image.dimensions();
    ColorImage::from_rgba_unmultiplied([w as usize, h as usize], image.as_raw())
}
