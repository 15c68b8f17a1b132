use eframe::egui;
use std::time::{Duration, Instant};

use super::strip::ScrollStrip;
use super::texture_cache::{TextureCache, TextureKey, canvas_to_color_image};
use super::widgets::{ButtonFace, KioskButton, PANEL_FILL, home_button};
use crate::config::KioskConfig;
use crate::paint::{ArchiveStore, PaintSession, RecallItem, RecallSource, ToolKind};
use crate::raster::{Canvas, to_color32};
use crate::util::time;

const MARGIN: f32 = 16.0;
const PANEL_PAD: f32 = 10.0;
const GAP: f32 = 10.0;
const CANVAS_BACKDROP: egui::Color32 = egui::Color32::from_rgb(252, 248, 240);

/// Recall strip contents while it is open
struct RecallOverlay {
    items: Vec<RecallItem>,
    strip: ScrollStrip,
    /// Distinguishes thumbnail textures between openings
    generation: u64,
}

/// Paint app: control panel on the left, canvas on the right
pub struct PaintView {
    session: PaintSession,
    tool_size: f32,
    panel_rect: egui::Rect,
    recall: Option<RecallOverlay>,
    recall_generation: u64,
    recall_preview: Option<Canvas>,
    recall_preview_version: u64,
}

impl PaintView {
    pub fn new(config: &KioskConfig, screen: egui::Rect) -> Self {
        let tool_size = (screen.height() * 0.06).clamp(44.0, 56.0);
        let panel_width = tool_size * 2.0 + GAP + PANEL_PAD * 2.0;
        let canvas_size = match config.paint.canvas_size {
            Some([w, h]) => (w.max(1), h.max(1)),
            None => (
                (screen.width() - panel_width - 3.0 * MARGIN).max(1.0) as u32,
                (screen.height() - 2.0 * MARGIN).max(1.0) as u32,
            ),
        };

        let store = ArchiveStore::open(config.paint_dir(), config.paint.max_archives)
            .map_err(|err| log::warn!("Paint archive unavailable, drawing without saving: {err}"))
            .ok();
        let session = PaintSession::new(
            &config.paint,
            store,
            canvas_size,
            (screen.width(), screen.height()),
            Instant::now(),
        );

        let mut view = Self {
            session,
            tool_size,
            panel_rect: egui::Rect::NOTHING,
            recall: None,
            recall_generation: 0,
            recall_preview: None,
            recall_preview_version: 0,
        };
        view.refresh_recall_preview();
        view
    }

    pub fn session(&self) -> &PaintSession {
        &self.session
    }

    /// Persists the canvas before the view is dropped
    pub fn close(&self) {
        if let Err(err) = self.session.autosave() {
            log::warn!("Failed to save canvas on exit: {err}");
        }
    }

    fn refresh_recall_preview(&mut self) {
        let side = (self.tool_size * 2.0 + GAP - 6.0).max(1.0) as u32;
        self.recall_preview = self.session.recall_preview(side, side);
        self.recall_preview_version += 1;
    }

    fn open_recall(&mut self) {
        let width = (self.panel_rect.width() - 24.0).max(1.0);
        let (cw, ch) = self.session.canvas().size();
        let height = (width * ch as f32 / cw.max(1) as f32).max(1.0);
        let items = self.session.open_recall((width as u32, height as u32));
        self.recall_generation += 1;
        self.recall = Some(RecallOverlay {
            items,
            strip: ScrollStrip::new(height, 12.0, 12.0),
            generation: self.recall_generation,
        });
    }

    /// Applies recall entry `index`. Returns true when the overlay should
    /// close; an entry that no longer loads keeps it open.
    fn select_recall(&mut self, index: usize) -> bool {
        let Some(source) = self
            .recall
            .as_ref()
            .and_then(|overlay| overlay.items.get(index))
            .map(|item| item.source.clone())
        else {
            return false;
        };
        if !self.session.recall(&source, Instant::now()) {
            return false;
        }
        if source != RecallSource::Live {
            self.refresh_recall_preview();
        }
        true
    }

    /// Draws one frame. Returns true when the child asked to go home.
    pub fn show(&mut self, ctx: &egui::Context, textures: &mut TextureCache) -> bool {
        self.session.tick(Instant::now());
        ctx.request_repaint_after(Duration::from_secs(1));

        if self.recall.is_some() {
            self.show_panel(ctx, textures, false);
            self.show_canvas(ctx, textures, false);
            self.show_recall(ctx, textures);
            return false;
        }

        let home = self.show_panel(ctx, textures, true);
        self.show_canvas(ctx, textures, true);
        home || ctx.input(|i| i.key_pressed(egui::Key::Escape))
    }

    fn show_panel(&mut self, ctx: &egui::Context, textures: &mut TextureCache, enabled: bool) -> bool {
        let tool = egui::vec2(self.tool_size, self.tool_size);
        let wide = egui::vec2(self.tool_size * 2.0 + GAP, self.tool_size);
        let mut home = false;

        let panel = egui::SidePanel::left("paint_controls")
            .exact_width(self.tool_size * 2.0 + GAP + PANEL_PAD * 2.0)
            .resizable(false)
            .frame(egui::Frame::default().fill(PANEL_FILL).inner_margin(PANEL_PAD))
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(GAP, GAP);
                    home = home_button(ui, self.tool_size).clicked();

                    egui::Grid::new("paint_tools").spacing([GAP, GAP]).show(ui, |ui| {
                        for (idx, kind) in ToolKind::ALL.into_iter().enumerate() {
                            let button = KioskButton::new(ButtonFace::Icon(kind.icon(), kind.name()), tool)
                                .selected(self.session.tool() == kind);
                            if button.show(ui).clicked() {
                                self.session.set_tool(kind);
                            }
                            if idx % 2 == 1 {
                                ui.end_row();
                            }
                        }
                    });

                    ui.horizontal(|ui| {
                        let third = egui::vec2((wide.x - 2.0 * GAP) / 3.0, self.tool_size * 0.8);
                        for size in self.session.size_values() {
                            let button = KioskButton::new(ButtonFace::Dot(size as f32 * 1.5), third)
                                .selected(self.session.size() == size);
                            if button.show(ui).clicked() {
                                self.session.set_size(size);
                            }
                        }
                    });

                    let swatch = egui::vec2((wide.x - 3.0 * GAP) / 4.0, (wide.x - 3.0 * GAP) / 4.0);
                    egui::Grid::new("paint_palette").spacing([GAP, GAP]).show(ui, |ui| {
                        let palette = self.session.palette().to_vec();
                        for (idx, color) in palette.into_iter().enumerate() {
                            let button = KioskButton::new(ButtonFace::Color(to_color32(color)), swatch)
                                .selected(self.session.color() == color);
                            if button.show(ui).clicked() {
                                self.session.set_color(color);
                            }
                            if idx % 4 == 3 {
                                ui.end_row();
                            }
                        }
                    });

                    ui.horizontal(|ui| {
                        let undo = KioskButton::new(ButtonFace::Text("Undo"), tool).enabled(self.session.can_undo());
                        if undo.show(ui).clicked() {
                            self.session.undo();
                        }
                        let redo = KioskButton::new(ButtonFace::Text("Redo"), tool).enabled(self.session.can_redo());
                        if redo.show(ui).clicked() {
                            self.session.redo();
                        }
                    });

                    if KioskButton::new(ButtonFace::Text("New"), wide).show(ui).clicked() {
                        self.session.start_new_canvas(time::local_now());
                        self.refresh_recall_preview();
                    }

                    let preview = self.recall_preview.as_ref().and_then(|canvas| {
                        textures
                            .get_or_create(ctx, TextureKey::RecallButton, self.recall_preview_version, || {
                                Ok(canvas_to_color_image(canvas))
                            })
                            .map_err(|err| log::debug!("Recall preview unavailable: {err}"))
                            .ok()
                    });
                    let face = match preview {
                        Some(texture) => ButtonFace::Texture(texture),
                        None => ButtonFace::Text("Recall"),
                    };
                    if KioskButton::new(face, egui::vec2(wide.x, wide.x)).show(ui).clicked() {
                        self.open_recall();
                    }
                });
            });
        self.panel_rect = panel.response.rect;
        home
    }

    fn show_canvas(&mut self, ctx: &egui::Context, textures: &mut TextureCache, enabled: bool) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(CANVAS_BACKDROP).inner_margin(MARGIN))
            .show(ctx, |ui| {
                let (w, h) = self.session.canvas().size();
                let bounds = ui.available_rect_before_wrap();
                let rect = super::widgets::fit_rect(egui::vec2(w as f32, h as f32), bounds);
                ui.allocate_rect(rect, egui::Sense::drag());

                let canvas = self.session.canvas();
                match textures.get_or_create(ctx, TextureKey::Canvas, self.session.version(), || {
                    Ok(canvas_to_color_image(canvas))
                }) {
                    Ok(texture) => {
                        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        ui.painter().image(texture, rect, uv, egui::Color32::WHITE);
                    }
                    Err(err) => log::warn!("Cannot upload canvas: {err}"),
                }
                ui.painter()
                    .rect_stroke(rect, 0.0, egui::Stroke::new(2.0, egui::Color32::from_gray(200)));

                if enabled {
                    self.handle_pointer(ui, rect);
                }
            });
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let (w, h) = self.session.canvas().size();
        let scale = egui::vec2(w as f32 / rect.width().max(1.0), h as f32 / rect.height().max(1.0));
        let to_canvas = |pos: egui::Pos2| {
            let local = pos - rect.min;
            egui::pos2((local.x * scale.x).floor(), (local.y * scale.y).floor())
        };

        let (pressed, down, released, moved, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.delta() != egui::Vec2::ZERO,
                i.pointer.interact_pos(),
            )
        });

        if let Some(pos) = pos {
            if pressed && rect.contains(pos) {
                self.session.pointer_down(to_canvas(pos));
            } else if down && moved && self.session.is_stroking() {
                self.session.extend_stroke(to_canvas(pos));
            }
        }
        if released {
            self.session.end_stroke();
        }
    }

    fn show_recall(&mut self, ctx: &egui::Context, textures: &mut TextureCache) {
        let screen = ctx.screen_rect();
        let strip_rect = self.panel_rect;
        let mut selected = None;
        let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        let Some(overlay) = self.recall.as_mut() else {
            return;
        };
        egui::Area::new(egui::Id::new("paint_recall"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(140));
                ui.painter()
                    .rect_filled(strip_rect, 0.0, egui::Color32::from_gray(230));

                let backdrop = ui.interact(screen, egui::Id::new("paint_recall_backdrop"), egui::Sense::click());
                let count = overlay.items.len();
                let tapped = overlay
                    .strip
                    .interact(ui, strip_rect, count, egui::Id::new("paint_recall_strip"));
                if tapped.is_some() {
                    selected = tapped;
                } else if backdrop.clicked()
                    && backdrop
                        .interact_pointer_pos()
                        .is_some_and(|pos| !strip_rect.contains(pos))
                {
                    close = true;
                }

                let painter = ui.painter().with_clip_rect(strip_rect);
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                for idx in overlay.strip.visible(strip_rect, count) {
                    let item = &overlay.items[idx];
                    let rect = overlay.strip.item_rect(strip_rect, idx);
                    let texture = textures.get_or_create(ctx, TextureKey::RecallThumb(idx), overlay.generation, || {
                        Ok(canvas_to_color_image(&item.thumb))
                    });
                    if let Ok(texture) = texture {
                        painter.image(texture, rect, uv, egui::Color32::WHITE);
                    }
                    let (width, color) = match item.source {
                        RecallSource::Live => (3.0, super::widgets::SELECTED_OUTLINE),
                        RecallSource::Archive(_) => (2.0, egui::Color32::from_gray(120)),
                    };
                    painter.rect_stroke(rect, 0.0, egui::Stroke::new(width, color));
                }
            });

        if let Some(idx) = selected {
            close = self.select_recall(idx);
        }
        if close {
            self.recall = None;
            textures.invalidate_where(|key| matches!(key, TextureKey::RecallThumb(_)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgb;

    fn view_in(dir: &std::path::Path) -> PaintView {
        let config = KioskConfig {
            data_root: dir.to_path_buf(),
            ..KioskConfig::default()
        };
        let screen = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0));
        PaintView::new(&config, screen)
    }

    #[test]
    fn test_unloadable_recall_keeps_overlay_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = view_in(dir.path());
        view.session.flood_fill(egui::pos2(1.0, 1.0), Rgb::from([255, 0, 0]));
        view.session.start_new_canvas(time::local_now());
        view.open_recall();

        let overlay = view.recall.as_ref().unwrap();
        assert_eq!(overlay.items.len(), 2);
        let RecallSource::Archive(path) = overlay.items[1].source.clone() else {
            panic!("second entry should be an archive");
        };
        std::fs::write(&path, b"gone bad").unwrap();

        assert!(!view.select_recall(1));
        assert!(view.recall.is_some());
        assert!(view.select_recall(0));
    }
}
