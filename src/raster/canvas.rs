use egui::Pos2;
use image::{RgbImage, imageops::FilterType};
use std::path::Path;

use super::{Rgb, WHITE};
use crate::error::{PersistenceError, PersistenceResult};

/// Fixed-size RGB raster that strokes and fills are baked into.
///
/// Cloning a canvas is a deep copy of its pixels; the paint history relies on
/// that for snapshots.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: RgbImage,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl Canvas {
    /// Create a canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width.max(1), height.max(1), background),
        }
    }

    /// Create a blank white canvas
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, WHITE)
    }

    pub fn from_image(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.pixels
    }

    /// Raw RGB bytes, row-major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.pixels.width() && (y as u32) < self.pixels.height()
    }

    /// Pixel at (x, y), `None` outside the canvas
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.contains(x, y)
            .then(|| *self.pixels.get_pixel(x as u32, y as u32))
    }

    /// Writes a pixel; out-of-bounds writes are clipped
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if self.contains(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    fn fill_span(&mut self, y: i32, x_start: i32, x_end: i32, color: Rgb) {
        if y < 0 || y as u32 >= self.pixels.height() {
            return;
        }
        let x_start = x_start.max(0);
        let x_end = x_end.min(self.pixels.width() as i32 - 1);
        for x in x_start..=x_end {
            self.pixels.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Filled disc of the given radius centred on `center`
    pub fn draw_filled_circle(&mut self, color: Rgb, center: Pos2, radius: i32) {
        let cx = center.x.round() as i32;
        let cy = center.y.round() as i32;
        if radius < 1 {
            self.put_pixel(cx, cy, color);
            return;
        }
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let mut half = 0;
            while (half + 1) * (half + 1) + dy * dy <= r2 {
                half += 1;
            }
            self.fill_span(cy + dy, cx - half, cx + half, color);
        }
    }

    /// Round stamp used by the brush and eraser; diameter is at least 2px
    pub fn draw_stamp(&mut self, size: u32, color: Rgb, point: Pos2) {
        let size = size.max(2) as i32;
        self.draw_filled_circle(color, point, size / 2);
    }

    /// Even-odd scanline fill of a closed polygon
    pub fn draw_filled_polygon(&mut self, color: Rgb, points: &[Pos2]) {
        if points.len() < 3 {
            return;
        }
        let (min_y, max_y) = points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
        let first_row = (min_y.floor() as i32).max(0);
        let last_row = (max_y.ceil() as i32).min(self.pixels.height() as i32 - 1);

        let n = points.len();
        let mut nodes: Vec<f32> = Vec::with_capacity(n);
        for y in first_row..=last_row {
            let yf = y as f32 + 0.5;
            nodes.clear();
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                if (a.y < yf && b.y >= yf) || (b.y < yf && a.y >= yf) {
                    let t = (yf - a.y) / (b.y - a.y);
                    nodes.push(a.x + t * (b.x - a.x));
                }
            }
            nodes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            for pair in nodes.chunks_exact(2) {
                self.fill_span(y, pair[0].round() as i32, pair[1].round() as i32, color);
            }
        }
    }

    /// 4-connected flood fill from `start`, bounded by exact RGB equality.
    ///
    /// Returns the number of pixels recoloured. Seeds outside the canvas and
    /// seeds already of `color` leave the canvas untouched.
    pub fn flood_fill(&mut self, start: Pos2, color: Rgb) -> usize {
        let (sx, sy) = (start.x as i32, start.y as i32);
        let Some(target) = self.pixel(sx, sy) else {
            return 0;
        };
        if target == color {
            return 0;
        }

        let (width, height) = (self.pixels.width() as usize, self.pixels.height() as usize);
        let mut visited = vec![false; width * height];
        let mut stack: Vec<(i32, i32)> = vec![(sx, sy)];
        let mut filled = 0;

        while let Some((x, y)) = stack.pop() {
            if !self.contains(x, y) {
                continue;
            }
            let idx = y as usize * width + x as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            if *self.pixels.get_pixel(x as u32, y as u32) != target {
                continue;
            }
            self.pixels.put_pixel(x as u32, y as u32, color);
            filled += 1;
            stack.push((x + 1, y));
            stack.push((x - 1, y));
            stack.push((x, y + 1));
            stack.push((x, y - 1));
        }
        filled
    }

    /// Scaled copy, ignoring aspect ratio
    pub fn scaled(&self, width: u32, height: u32) -> Canvas {
        Canvas {
            pixels: image::imageops::resize(
                &self.pixels,
                width.max(1),
                height.max(1),
                FilterType::Triangle,
            ),
        }
    }

    /// Writes the canvas as PNG to exactly `path`
    pub fn save_png(&self, path: &Path) -> PersistenceResult<()> {
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|err| PersistenceError::image(path, err))
    }

    /// Decodes any supported image and scales it to `width` x `height`
    pub fn load_scaled(path: &Path, width: u32, height: u32) -> PersistenceResult<Canvas> {
        let decoded = image::open(path).map_err(|err| PersistenceError::image(path, err))?;
        let rgb = decoded.to_rgb8();
        if rgb.dimensions() == (width, height) {
            return Ok(Canvas::from_image(rgb));
        }
        Ok(Canvas::from_image(rgb).scaled(width, height))
    }
}
