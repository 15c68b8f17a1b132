use eframe::egui;
use egui::text::{LayoutJob, TextFormat};

use super::strip::ScrollStrip;
use super::widgets::{ButtonFace, KioskButton, PANEL_FILL, SELECTED_OUTLINE, home_button};
use crate::config::KioskConfig;
use crate::typing::{
    Cursor, CursorPlacement, Glyph, GlyphMetrics, GlyphStyle, LINE_GAP, RecallSession, SessionLog, TextEditor,
    VerticalDirection, VisualLine,
};
use crate::util::time;

const MARGIN: f32 = 24.0;
const PANEL_PAD: f32 = 10.0;
const GAP: f32 = 10.0;
const CURSOR_WIDTH: f32 = 6.0;
const PAPER: egui::Color32 = egui::Color32::from_rgb(255, 255, 250);
const INK: egui::Color32 = egui::Color32::from_gray(20);

/// Measures glyphs with egui's font atlas
pub struct EguiGlyphMetrics<'a> {
    ctx: &'a egui::Context,
}

impl<'a> EguiGlyphMetrics<'a> {
    pub fn new(ctx: &'a egui::Context) -> Self {
        Self { ctx }
    }
}

impl GlyphMetrics for EguiGlyphMetrics<'_> {
    fn glyph_width(&self, glyph: &Glyph) -> f32 {
        let font = egui::FontId::proportional(glyph.size as f32);
        let width = self.ctx.fonts(|f| f.glyph_width(&font, glyph.ch));
        // bold is painted twice, one pixel apart
        match glyph.style {
            GlyphStyle::Bold => width + 1.0,
            _ => width,
        }
    }

    fn line_height(&self, size: u32, _style: GlyphStyle) -> f32 {
        let font = egui::FontId::proportional(size as f32);
        self.ctx.fonts(|f| f.row_height(&font))
    }
}

struct RecallOverlay {
    sessions: Vec<RecallSession>,
    strip: ScrollStrip,
}

/// Typing pad: controls on the left, paper on the right
pub struct TypingView {
    editor: TextEditor,
    log: Option<SessionLog>,
    size_values: [u32; 3],
    recall_limit: usize,
    tool_size: f32,
    recall: Option<RecallOverlay>,
    panel_rect: egui::Rect,
    view_height: f32,
}

impl TypingView {
    pub fn new(config: &KioskConfig, screen: egui::Rect) -> Self {
        let default_size = config.typing.default_text_size.max(1);
        let log = SessionLog::open(&config.typing_dir())
            .map_err(|err| log::warn!("Typing sessions will not be saved: {err}"))
            .ok();
        Self {
            editor: TextEditor::new(default_size),
            log,
            size_values: crate::typing::size_values(default_size),
            recall_limit: config.typing.recall_limit,
            tool_size: (screen.height() * 0.06).clamp(44.0, 56.0),
            recall: None,
            panel_rect: egui::Rect::NOTHING,
            view_height: screen.height(),
        }
    }

    pub fn editor(&self) -> &TextEditor {
        &self.editor
    }

    /// Logs the document and starts a fresh one
    fn new_document(&mut self) {
        if let Some(log) = &self.log {
            if let Err(err) = log.append(self.editor.document().rows(), time::local_now()) {
                log::warn!("Failed to append typing session: {err}");
            }
        }
        self.editor.clear();
    }

    fn open_recall(&mut self) {
        let mut sessions = vec![RecallSession::current(self.editor.document().rows())];
        if let Some(log) = &self.log {
            match log.load_recent(self.recall_limit) {
                Ok(stored) => sessions.extend(stored),
                Err(err) => log::warn!("Cannot read typing sessions: {err}"),
            }
        }
        self.recall = Some(RecallOverlay {
            sessions,
            strip: ScrollStrip::new(96.0, 12.0, 12.0),
        });
    }

    fn apply_recall(&mut self, index: usize) {
        let Some(overlay) = self.recall.take() else {
            return;
        };
        if let Some(session) = overlay.sessions.into_iter().nth(index) {
            if !session.is_current {
                self.editor.load_rows(session.rows);
            }
        }
    }

    /// Draws one frame. Returns true when the child asked to go home.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        if self.recall.is_some() {
            self.show_panel(ctx, false);
            self.show_paper(ctx, false);
            self.show_recall(ctx);
            return false;
        }
        let home = self.show_panel(ctx, true);
        self.show_paper(ctx, true);
        home || ctx.input(|i| i.key_pressed(egui::Key::Escape))
    }

    fn show_panel(&mut self, ctx: &egui::Context, enabled: bool) -> bool {
        let wide = egui::vec2(self.tool_size * 3.0 + GAP * 2.0, self.tool_size);
        let third = egui::vec2(self.tool_size, self.tool_size);
        let mut home = false;

        let panel = egui::SidePanel::left("typing_controls")
            .exact_width(wide.x + PANEL_PAD * 2.0)
            .resizable(false)
            .frame(egui::Frame::default().fill(PANEL_FILL).inner_margin(PANEL_PAD))
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(GAP, GAP);
                    home = home_button(ui, self.tool_size).clicked();

                    if KioskButton::new(ButtonFace::Text("New"), wide).show(ui).clicked() {
                        self.new_document();
                    }
                    let undo = KioskButton::new(ButtonFace::Text("Undo"), wide)
                        .enabled(self.editor.document().can_undo());
                    if undo.show(ui).clicked() {
                        self.editor.undo();
                    }

                    let selected = self.editor.document().selected();
                    ui.horizontal(|ui| {
                        for (size, label) in self.size_values.into_iter().zip(["A", "AA", "AAA"]) {
                            let button = KioskButton::new(ButtonFace::Text(label), third).selected(selected.size == size);
                            if button.show(ui).clicked() {
                                self.editor.select_size(size);
                            }
                        }
                    });
                    ui.horizontal(|ui| {
                        for style in GlyphStyle::ALL {
                            let button =
                                KioskButton::new(ButtonFace::Text(style.label()), third).selected(selected.style == style);
                            if button.show(ui).clicked() {
                                self.editor.select_style(style);
                            }
                        }
                    });

                    if KioskButton::new(ButtonFace::Text("Recall"), wide).show(ui).clicked() {
                        self.open_recall();
                    }
                });
            });
        self.panel_rect = panel.response.rect;
        home
    }

    fn show_paper(&mut self, ctx: &egui::Context, enabled: bool) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(PAPER).inner_margin(MARGIN))
            .show(ctx, |ui| {
                let text_rect = ui.available_rect_before_wrap();
                let response = ui.interact(text_rect, ui.id().with("typing_paper"), egui::Sense::click());
                self.view_height = text_rect.height();
                let metrics = EguiGlyphMetrics::new(ctx);

                if enabled {
                    self.handle_keys(ctx, &metrics, text_rect.width());
                    if let Some(pos) = response.interact_pointer_pos().filter(|_| response.clicked()) {
                        let lines = self.editor.visual_lines(&metrics, text_rect.width());
                        let offset = pos - text_rect.min + egui::vec2(0.0, self.editor.scroll());
                        if let Some(cursor) = cursor_at(&lines, offset) {
                            self.editor.set_cursor(cursor);
                        }
                    }
                }

                let (lines, placement) = self.editor.layout(&metrics, text_rect.width(), text_rect.height());
                let painter = ui.painter().with_clip_rect(text_rect);
                paint_lines(&painter, ctx, &lines, text_rect.min, self.editor.scroll());
                if enabled {
                    paint_cursor(&painter, &placement, text_rect.min, self.editor.scroll());
                }
            });
    }

    fn handle_keys(&mut self, ctx: &egui::Context, metrics: &dyn GlyphMetrics, width: f32) {
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::Text(text) => {
                    if ctx.input(|i| i.modifiers.ctrl || i.modifiers.alt || i.modifiers.command) {
                        continue;
                    }
                    for ch in text.chars().filter(|ch| !ch.is_control()) {
                        self.editor.insert(ch);
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if modifiers.ctrl || modifiers.alt || modifiers.command {
                        continue;
                    }
                    match key {
                        egui::Key::Enter => self.editor.insert('\n'),
                        egui::Key::Backspace => self.editor.delete_backward(),
                        egui::Key::ArrowLeft => self.editor.move_left(),
                        egui::Key::ArrowRight => self.editor.move_right(),
                        egui::Key::ArrowUp | egui::Key::ArrowDown => {
                            let direction = if key == egui::Key::ArrowUp {
                                VerticalDirection::Up
                            } else {
                                VerticalDirection::Down
                            };
                            let lines = self.editor.visual_lines(metrics, width);
                            self.editor.move_cursor_vertical(&lines, direction);
                        }
                        egui::Key::Home => self.editor.move_home(),
                        egui::Key::End => self.editor.move_end(),
                        egui::Key::PageUp => self.editor.page_up(self.view_height),
                        egui::Key::PageDown => self.editor.page_down(self.view_height),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    fn show_recall(&mut self, ctx: &egui::Context) {
        let screen = ctx.screen_rect();
        let strip_rect = egui::Rect::from_min_max(
            self.panel_rect.min,
            egui::pos2(
                (self.panel_rect.left() + screen.width() * 0.45).max(self.panel_rect.right()),
                self.panel_rect.bottom(),
            ),
        );
        let mut selected = None;
        let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        let Some(overlay) = self.recall.as_mut() else {
            return;
        };
        egui::Area::new(egui::Id::new("typing_recall"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(140));
                ui.painter()
                    .rect_filled(strip_rect, 0.0, egui::Color32::from_gray(230));

                let backdrop = ui.interact(screen, egui::Id::new("typing_recall_backdrop"), egui::Sense::click());
                let count = overlay.sessions.len();
                let tapped = overlay
                    .strip
                    .interact(ui, strip_rect, count, egui::Id::new("typing_recall_strip"));
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
                for idx in overlay.strip.visible(strip_rect, count) {
                    let session = &overlay.sessions[idx];
                    let rect = overlay.strip.item_rect(strip_rect, idx);
                    painter.rect_filled(rect, 8.0, egui::Color32::WHITE);
                    let outline = if session.is_current {
                        egui::Stroke::new(3.0, SELECTED_OUTLINE)
                    } else {
                        egui::Stroke::new(1.0, egui::Color32::from_gray(150))
                    };
                    painter.rect_stroke(rect, 8.0, outline);

                    let inner = rect.shrink(8.0);
                    let label = painter.layout_no_wrap(session.label.clone(), egui::FontId::proportional(14.0), INK);
                    let label_height = label.size().y;
                    painter.galley(inner.min, label, INK);
                    let preview = painter.layout(
                        session.preview.clone(),
                        egui::FontId::proportional(16.0),
                        egui::Color32::from_gray(60),
                        inner.width(),
                    );
                    let preview_pos = inner.min + egui::vec2(0.0, label_height + 4.0);
                    painter
                        .with_clip_rect(rect.intersect(strip_rect))
                        .galley(preview_pos, preview, INK);
                }
            });

        if let Some(idx) = selected {
            self.apply_recall(idx);
        } else if close {
            self.recall = None;
        }
    }
}

/// Cursor position for a tap at `offset` in content coordinates
fn cursor_at(lines: &[VisualLine], offset: egui::Vec2) -> Option<Cursor> {
    let mut top = 0.0;
    let mut hit = lines.last();
    for line in lines {
        if offset.y < top + line.height + LINE_GAP {
            hit = Some(line);
            break;
        }
        top += line.height + LINE_GAP;
    }
    hit.map(|line| Cursor::new(line.row, line.col_for_x(offset.x)))
}

fn paint_lines(painter: &egui::Painter, ctx: &egui::Context, lines: &[VisualLine], origin: egui::Pos2, scroll: f32) {
    let clip = painter.clip_rect();
    let mut top = origin.y - scroll;
    for line in lines {
        let bottom = top + line.height;
        if bottom >= clip.top() && top <= clip.bottom() {
            let mut x = origin.x;
            for (glyph, width) in line.glyphs.iter().zip(&line.widths) {
                paint_glyph(painter, ctx, glyph, egui::pos2(x, bottom));
                x += width;
            }
        }
        top = bottom + LINE_GAP;
    }
}

/// Draws `glyph` with its baseline box bottom-aligned at `bottom_left`
fn paint_glyph(painter: &egui::Painter, ctx: &egui::Context, glyph: &Glyph, bottom_left: egui::Pos2) {
    if glyph.ch.is_whitespace() {
        return;
    }
    let format = TextFormat {
        font_id: egui::FontId::proportional(glyph.size as f32),
        color: INK,
        italics: glyph.style == GlyphStyle::Italic,
        ..Default::default()
    };
    let job = LayoutJob::single_section(glyph.ch.to_string(), format);
    let galley = ctx.fonts(|f| f.layout_job(job));
    let pos = bottom_left - egui::vec2(0.0, galley.size().y);
    if glyph.style == GlyphStyle::Bold {
        painter.galley(pos + egui::vec2(1.0, 0.0), galley.clone(), INK);
    }
    painter.galley(pos, galley, INK);
}

fn paint_cursor(painter: &egui::Painter, placement: &CursorPlacement, origin: egui::Pos2, scroll: f32) {
    let min = origin + egui::vec2(placement.x, placement.top - scroll);
    let rect = egui::Rect::from_min_size(min, egui::vec2(CURSOR_WIDTH, placement.height.max(1.0)));
    painter.rect_filled(rect, 0.0, egui::Color32::from_rgba_unmultiplied(30, 144, 255, 160));
}
