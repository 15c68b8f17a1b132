use eframe::egui;

pub const SELECTED_OUTLINE: egui::Color32 = egui::Color32::from_rgb(200, 60, 60);
pub const PANEL_FILL: egui::Color32 = egui::Color32::from_rgb(238, 234, 226);
const BUTTON_FILL: egui::Color32 = egui::Color32::from_rgb(248, 248, 248);
const BUTTON_HOVER: egui::Color32 = egui::Color32::from_rgb(255, 255, 255);

/// What a big kiosk button shows
pub enum ButtonFace<'a> {
    Text(&'a str),
    /// An icon glyph above a short caption
    Icon(&'a str, &'a str),
    Color(egui::Color32),
    /// A filled dot of the given diameter
    Dot(f32),
    Texture(egui::TextureId),
}

/// Large rounded touch target with a red outline when selected
pub struct KioskButton<'a> {
    pub face: ButtonFace<'a>,
    pub size: egui::Vec2,
    pub selected: bool,
    pub enabled: bool,
}

impl<'a> KioskButton<'a> {
    pub fn new(face: ButtonFace<'a>, size: egui::Vec2) -> Self {
        Self {
            face,
            size,
            selected: false,
            enabled: true,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let sense = if self.enabled {
            egui::Sense::click()
        } else {
            egui::Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(self.size, sense);
        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter();
        let rounding = 12.0;
        let fill = match self.face {
            ButtonFace::Color(color) => color,
            _ if response.hovered() && self.enabled => BUTTON_HOVER,
            _ => BUTTON_FILL,
        };
        painter.rect_filled(rect, rounding, fill);
        painter.rect_stroke(rect, rounding, egui::Stroke::new(1.0, egui::Color32::from_gray(170)));

        let ink = if self.enabled {
            egui::Color32::from_gray(25)
        } else {
            egui::Color32::from_gray(160)
        };
        match self.face {
            ButtonFace::Text(text) => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(20.0),
                    ink,
                );
            }
            ButtonFace::Icon(icon, caption) => {
                painter.text(
                    rect.center() - egui::vec2(0.0, rect.height() * 0.12),
                    egui::Align2::CENTER_CENTER,
                    icon,
                    egui::FontId::proportional(rect.height() * 0.4),
                    ink,
                );
                painter.text(
                    egui::pos2(rect.center().x, rect.bottom() - rect.height() * 0.18),
                    egui::Align2::CENTER_CENTER,
                    caption,
                    egui::FontId::proportional(14.0),
                    ink,
                );
            }
            ButtonFace::Dot(diameter) => {
                painter.circle_filled(rect.center(), diameter.max(2.0) / 2.0, ink);
            }
            ButtonFace::Texture(texture) => {
                let inner = rect.shrink(3.0);
                painter.image(
                    texture,
                    inner,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            ButtonFace::Color(_) => {}
        }

        if self.selected {
            painter.rect_stroke(rect, rounding, egui::Stroke::new(3.0, SELECTED_OUTLINE));
        }
        response
    }
}

/// House-shaped home button
pub fn home_button(ui: &mut egui::Ui, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        painter.rect_filled(rect, 12.0, BUTTON_FILL);
        painter.rect_stroke(rect, 12.0, egui::Stroke::new(1.0, egui::Color32::from_gray(170)));

        let ink = egui::Color32::from_gray(40);
        let body = egui::Rect::from_center_size(
            rect.center() + egui::vec2(0.0, size * 0.12),
            egui::vec2(size * 0.44, size * 0.34),
        );
        painter.rect_filled(body, 2.0, ink);
        let roof = vec![
            egui::pos2(rect.center().x, rect.top() + size * 0.16),
            egui::pos2(body.left() - size * 0.08, body.top()),
            egui::pos2(body.right() + size * 0.08, body.top()),
        ];
        painter.add(egui::Shape::convex_polygon(roof, ink, egui::Stroke::NONE));
    }
    response
}

/// Fits `image_size` inside `bounds` keeping its aspect ratio, centred
pub fn fit_rect(image_size: egui::Vec2, bounds: egui::Rect) -> egui::Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return egui::Rect::from_center_size(bounds.center(), egui::Vec2::ZERO);
    }
    let scale = (bounds.width() / image_size.x).min(bounds.height() / image_size.y);
    egui::Rect::from_center_size(bounds.center(), image_size * scale)
}
