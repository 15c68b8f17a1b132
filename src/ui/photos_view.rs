use eframe::egui;
use image::RgbaImage;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::strip::ScrollStrip;
use super::texture_cache::{TextureCache, TextureKey, rgba_to_color_image};
use super::widgets::{PANEL_FILL, SELECTED_OUTLINE, fit_rect, home_button};
use crate::config::KioskConfig;
use crate::photos::{PhotoLibrary, PhotoViewer, ThumbnailCache, load_fitted};

const PANEL_PAD: f32 = 10.0;
const STRIP_WIDTH: f32 = 180.0;
const THUMB_HEIGHT: f32 = 120.0;
/// Input newer than this keeps background thumbnail loading to one per frame
const ACTIVE_WINDOW: Duration = Duration::from_millis(400);
const BACKDROP: egui::Color32 = egui::Color32::from_gray(16);

/// Photo viewer: thumbnail strip on the left, the selected photo filling the
/// rest of the screen
pub struct PhotosView {
    viewer: PhotoViewer,
    thumbs: Option<ThumbnailCache>,
    thumb_images: Vec<Option<RgbaImage>>,
    failed_photos: HashSet<usize>,
    strip: ScrollStrip,
    thumb_batch: usize,
    swipe: egui::Vec2,
    last_input: Instant,
}

impl PhotosView {
    pub fn new(config: &KioskConfig) -> Self {
        let library = PhotoLibrary::new(config.photos_library_dir());
        let thumbs = ThumbnailCache::open(config.photos_thumb_dir())
            .map_err(|err| log::warn!("Thumbnail cache unavailable: {err}"))
            .ok();
        if let Some(cache) = &thumbs {
            let removed = cache.cleanup(library.dir());
            if removed > 0 {
                log::info!("Removed {removed} stale thumbnails");
            }
        }

        let photos = library.photos_or_empty();
        log::info!("Found {} photos in {}", photos.len(), library.dir().display());
        let count = photos.len();
        let mut view = Self {
            viewer: PhotoViewer::new(photos),
            thumbs,
            thumb_images: vec![None; count],
            failed_photos: HashSet::new(),
            strip: ScrollStrip::new(THUMB_HEIGHT, 10.0, 0.0),
            thumb_batch: config.photos.thumb_batch.max(1),
            swipe: egui::Vec2::ZERO,
            last_input: Instant::now(),
        };
        let initial: Vec<usize> = (0..config.photos.initial_thumbs.min(count)).collect();
        view.load_thumbs(&initial, initial.len());
        view
    }

    pub fn viewer(&self) -> &PhotoViewer {
        &self.viewer
    }

    /// Loads up to `budget` pending thumbnails, visible ones first
    fn load_thumbs(&mut self, prefer: &[usize], budget: usize) {
        let Some(cache) = &self.thumbs else {
            return;
        };
        let max_w = STRIP_WIDTH as u32;
        let max_h = THUMB_HEIGHT as u32;
        for _ in 0..budget {
            let Some(idx) = self.viewer.next_pending_thumb(prefer) else {
                break;
            };
            let Some(path) = self.viewer.photos().get(idx) else {
                continue;
            };
            match cache.thumbnail(path, max_w, max_h) {
                Ok(thumb) => self.thumb_images[idx] = Some(thumb),
                Err(err) => log::warn!("No thumbnail for {}: {}", path.display(), err),
            }
        }
    }

    fn mark_input(&mut self) {
        self.last_input = Instant::now();
    }

    /// Draws one frame. Returns true when the child asked to go home.
    pub fn show(&mut self, ctx: &egui::Context, textures: &mut TextureCache) -> bool {
        if ctx.input(|i| i.pointer.any_down() || !i.events.is_empty()) {
            self.mark_input();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.viewer.next();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.viewer.previous();
        }

        let home = self.show_strip(ctx, textures);
        self.show_photo(ctx, textures);

        if self.viewer.has_pending_thumbs() {
            ctx.request_repaint();
        }
        home || ctx.input(|i| i.key_pressed(egui::Key::Escape))
    }

    fn show_strip(&mut self, ctx: &egui::Context, textures: &mut TextureCache) -> bool {
        let mut home = false;
        egui::SidePanel::left("photo_strip")
            .exact_width(STRIP_WIDTH + PANEL_PAD * 2.0)
            .resizable(false)
            .frame(egui::Frame::default().fill(PANEL_FILL).inner_margin(PANEL_PAD))
            .show(ctx, |ui| {
                home = home_button(ui, 52.0).clicked();
                ui.add_space(6.0);

                let strip_rect = ui.available_rect_before_wrap();
                let count = self.viewer.len();
                if let Some(idx) = self.strip.interact(ui, strip_rect, count, ui.id().with("photo_strip")) {
                    self.viewer.select(idx);
                }

                let visible = self.strip.visible(strip_rect, count);
                let budget = if self.last_input.elapsed() < ACTIVE_WINDOW {
                    1
                } else {
                    self.thumb_batch
                };
                self.load_thumbs(&visible, budget);

                let painter = ui.painter().with_clip_rect(strip_rect);
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                for idx in visible {
                    let slot = self.strip.item_rect(strip_rect, idx);
                    painter.rect_filled(slot, 6.0, egui::Color32::from_gray(200));
                    if let Some(thumb) = &self.thumb_images[idx] {
                        let size = egui::vec2(thumb.width() as f32, thumb.height() as f32);
                        let texture = textures.get_or_create(ctx, TextureKey::PhotoThumb(idx), 0, || {
                            Ok(rgba_to_color_image(thumb))
                        });
                        if let Ok(texture) = texture {
                            painter.image(texture, fit_rect(size, slot), uv, egui::Color32::WHITE);
                        }
                    }
                    if idx == self.viewer.current_index() {
                        painter.rect_stroke(slot, 6.0, egui::Stroke::new(3.0, SELECTED_OUTLINE));
                    }
                }
            });
        home
    }

    fn show_photo(&mut self, ctx: &egui::Context, textures: &mut TextureCache) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(BACKDROP))
            .show(ctx, |ui| {
                let bounds = ui.available_rect_before_wrap();
                let response = ui.interact(bounds, ui.id().with("photo_swipe"), egui::Sense::drag());
                if response.drag_started() {
                    self.swipe = egui::Vec2::ZERO;
                }
                if response.dragged() {
                    self.swipe += response.drag_delta();
                }
                if response.drag_stopped() {
                    self.viewer.swipe(self.swipe);
                    self.swipe = egui::Vec2::ZERO;
                }

                let Some(path) = self.viewer.current().map(|p| p.to_path_buf()) else {
                    ui.painter().text(
                        bounds.center(),
                        egui::Align2::CENTER_CENTER,
                        "No photos yet",
                        egui::FontId::proportional(32.0),
                        egui::Color32::from_gray(200),
                    );
                    return;
                };
                let idx = self.viewer.current_index();
                if self.failed_photos.contains(&idx) {
                    return;
                }

                let max_w = bounds.width().max(1.0) as u32;
                let max_h = bounds.height().max(1.0) as u32;
                let mut size = egui::Vec2::ZERO;
                let texture = textures.get_or_create(ctx, TextureKey::Photo(idx), 0, || {
                    let image = load_fitted(&path, max_w, max_h)?;
                    Ok(rgba_to_color_image(&image))
                });
                match texture {
                    Ok(texture) => {
                        if let Some(meta) = ctx.tex_manager().read().meta(texture) {
                            size = egui::vec2(meta.size[0] as f32, meta.size[1] as f32);
                        }
                        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        ui.painter().image(texture, fit_rect(size, bounds), uv, egui::Color32::WHITE);
                    }
                    Err(err) => {
                        log::warn!("Cannot show photo: {err}");
                        self.failed_photos.insert(idx);
                    }
                }
            });
    }
}
