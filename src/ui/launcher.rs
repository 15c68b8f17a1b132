use eframe::egui;

use super::widgets::{ButtonFace, KioskButton};

/// The mini-apps the launcher can start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppKind {
    Paint,
    Photos,
    Typing,
}

impl AppKind {
    pub const ALL: [AppKind; 3] = [AppKind::Paint, AppKind::Photos, AppKind::Typing];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Paint => "Paint",
            Self::Photos => "Photos",
            Self::Typing => "Typing",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Paint => "🎨",
            Self::Photos => "📷",
            Self::Typing => "⌨",
        }
    }
}

/// Side length of a launcher tile for a screen of `available` size
fn tile_size(available: egui::Vec2, count: usize) -> f32 {
    let gap = 40.0;
    let by_width = (available.x - gap * (count as f32 + 1.0)) / count as f32;
    by_width.min(available.y * 0.6).clamp(120.0, 360.0)
}

/// Full-screen grid of app tiles; returns the app that was tapped
pub fn launcher(ctx: &egui::Context) -> Option<AppKind> {
    let mut picked = None;
    egui::CentralPanel::default()
        .frame(egui::Frame::default().fill(egui::Color32::from_rgb(252, 248, 240)))
        .show(ctx, |ui| {
            let available = ui.available_size();
            let size = tile_size(available, AppKind::ALL.len());
            let gap = 40.0;
            let row_width = size * AppKind::ALL.len() as f32 + gap * (AppKind::ALL.len() as f32 - 1.0);

            ui.add_space(((available.y - size) / 2.0).max(0.0));
            ui.horizontal(|ui| {
                ui.add_space(((available.x - row_width) / 2.0).max(0.0));
                ui.spacing_mut().item_spacing.x = gap;
                for kind in AppKind::ALL {
                    let button = KioskButton::new(
                        ButtonFace::Icon(kind.icon(), kind.title()),
                        egui::vec2(size, size),
                    );
                    if button.show(ui).clicked() {
                        log::info!("Launching {}", kind.title());
                        picked = Some(kind);
                    }
                }
            });
        });
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_size_bounds() {
        assert_eq!(tile_size(egui::vec2(1366.0, 768.0), 3), 360.0);
        assert_eq!(tile_size(egui::vec2(300.0, 200.0), 3), 120.0);
    }
}
