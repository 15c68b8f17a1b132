//! In-memory raster surface that the paint tools draw into.

mod canvas;

pub use canvas::Canvas;

/// Opaque RGB colour as stored on the canvas
pub type Rgb = image::Rgb<u8>;

pub const WHITE: Rgb = image::Rgb([255, 255, 255]);
pub const BLACK: Rgb = image::Rgb([0, 0, 0]);

/// Converts a canvas colour for egui painting
pub fn to_color32(color: Rgb) -> egui::Color32 {
    let [r, g, b] = color.0;
    egui::Color32::from_rgb(r, g, b)
}
