use egui::{Pos2, pos2};

use super::tool::ToolKind;
use crate::raster::{Canvas, Rgb};

/// Spacing between round stamps along a segment, in pixels
pub const STAMP_SPACING: f32 = 2.0;
/// Spacing between fountain sub-segments, in pixels
pub const FOUNTAIN_DENSITY: f32 = 1.5;
/// Weight given to the new target width when smoothing fountain widths
pub const FOUNTAIN_SMOOTHING: f32 = 0.35;

/// Broad-edge nib: narrow when moving along `angle_degrees`, wide across it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FountainNib {
    pub angle_degrees: f32,
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl Default for FountainNib {
    fn default() -> Self {
        Self {
            angle_degrees: 35.0,
            min_ratio: 0.2,
            max_ratio: 1.8,
        }
    }
}

impl FountainNib {
    pub fn with_angle(angle_degrees: f32) -> Self {
        Self {
            angle_degrees,
            ..Self::default()
        }
    }

    /// Stroke width for a pen of `size` moving from `start` to `end`.
    ///
    /// A zero-length move has no direction and gets the middle ratio.
    pub fn width_for_direction(&self, size: u32, start: Pos2, end: Pos2) -> f32 {
        let size = size as f32;
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        if dx == 0.0 && dy == 0.0 {
            let mid = (self.min_ratio + self.max_ratio) / 2.0;
            return (size * mid).round().max(1.0);
        }

        let direction = dy.atan2(dx);
        let delta = direction - self.angle_degrees.to_radians();
        let blend = delta.sin().abs();
        let ratio = (self.min_ratio + (self.max_ratio - self.min_ratio) * blend)
            .clamp(self.min_ratio, self.max_ratio);
        (size * ratio).round().max(1.0)
    }
}

/// The in-progress pointer gesture.
///
/// Only its raster effect survives: every extension is baked into the canvas
/// immediately and the stroke itself is dropped on pointer-up.
#[derive(Debug, Clone)]
pub struct Stroke {
    tool: ToolKind,
    size: u32,
    color: Rgb,
    points: Vec<Pos2>,
    fountain_width: f32,
}

impl Stroke {
    pub fn new(tool: ToolKind, size: u32, color: Rgb, start: Pos2) -> Self {
        Self {
            tool,
            size,
            color,
            points: vec![start],
            fountain_width: 0.0,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    /// Running width of a fountain stroke; zero until the first segment.
    ///
    /// Each sub-segment starts at the smoothed width the previous one ended
    /// on, not at the raw width of the nib direction, so widths never jump.
    pub fn fountain_width(&self) -> f32 {
        self.fountain_width
    }

    fn last_point(&self) -> Pos2 {
        // points always holds at least the start point
        self.points[self.points.len() - 1]
    }

    /// Extends the stroke to `point`, drawing the new segment onto `canvas`
    pub fn extend_to(&mut self, canvas: &mut Canvas, point: Pos2, nib: &FountainNib) {
        let last = self.last_point();
        match self.tool {
            ToolKind::Fountain => self.extend_fountain(canvas, last, point, nib),
            ToolKind::Round | ToolKind::Eraser => {
                self.points.push(point);
                draw_stamped_segment(canvas, self.size, self.color, last, point);
            }
            // bucket never opens a stroke
            ToolKind::Bucket => {}
        }
    }

    fn extend_fountain(&mut self, canvas: &mut Canvas, last: Pos2, point: Pos2, nib: &FountainNib) {
        let distance = last.distance(point).max(1.0);
        let steps = ((distance / FOUNTAIN_DENSITY) as usize).max(1);
        let mut prev = last;
        let mut width = self.fountain_width;

        for idx in 1..=steps {
            let t = idx as f32 / steps as f32;
            let next = truncated_lerp(last, point, t);
            let target = nib.width_for_direction(self.size, prev, next);
            if width <= 0.0 {
                width = target;
            }
            let smoothed = width + (target - width) * FOUNTAIN_SMOOTHING;
            draw_fountain_segment(canvas, self.color, prev, next, width, smoothed);
            width = smoothed;
            self.points.push(next);
            prev = next;
        }
        self.fountain_width = width;
    }
}

/// Point `t` of the way from `a` to `b`, truncated to whole pixels
fn truncated_lerp(a: Pos2, b: Pos2, t: f32) -> Pos2 {
    pos2(
        (a.x + (b.x - a.x) * t).trunc(),
        (a.y + (b.y - a.y) * t).trunc(),
    )
}

/// Places round stamps every ~2px from `start` to `end`, both ends included
pub fn draw_stamped_segment(canvas: &mut Canvas, size: u32, color: Rgb, start: Pos2, end: Pos2) {
    let distance = start.distance(end).max(1.0);
    let steps = ((distance / STAMP_SPACING) as usize).max(1);
    for idx in 0..=steps {
        let t = idx as f32 / steps as f32;
        canvas.draw_stamp(size, color, truncated_lerp(start, end, t));
    }
}

/// Tapered quad from `start` to `end` with round caps at both ends
pub fn draw_fountain_segment(
    canvas: &mut Canvas,
    color: Rgb,
    start: Pos2,
    end: Pos2,
    start_width: f32,
    end_width: f32,
) {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let length = dx.hypot(dy);
    let half_start = (start_width * 0.5).max(0.5);
    let half_end = (end_width * 0.5).max(0.5);

    if length < 1e-6 {
        let radius = (half_start.max(half_end).round() as i32).max(1);
        canvas.draw_filled_circle(color, start, radius);
        return;
    }

    let (nx, ny) = (-dy / length, dx / length);
    let quad = [
        pos2(start.x + nx * half_start, start.y + ny * half_start),
        pos2(start.x - nx * half_start, start.y - ny * half_start),
        pos2(end.x - nx * half_end, end.y - ny * half_end),
        pos2(end.x + nx * half_end, end.y + ny * half_end),
    ]
    .map(|p| pos2(p.x.round(), p.y.round()));
    canvas.draw_filled_polygon(color, &quad);

    canvas.draw_filled_circle(color, start, (half_start.round() as i32).max(1));
    canvas.draw_filled_circle(color, end, (half_end.round() as i32).max(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{BLACK, WHITE};

    #[test]
    fn test_fountain_width_depends_on_direction() {
        let nib = FountainNib::with_angle(0.0);
        let origin = pos2(0.0, 0.0);
        let vertical = nib.width_for_direction(10, origin, pos2(0.0, 10.0));
        let horizontal = nib.width_for_direction(10, origin, pos2(10.0, 0.0));
        assert!(vertical > horizontal);
        // ratio bounds are 0.2..1.8, so the gap is 16px for size 10
        assert!(vertical - horizontal >= 0.6 * (1.8 - 0.2) * 10.0);
    }

    #[test]
    fn test_fountain_width_for_still_pointer() {
        let nib = FountainNib::default();
        let p = pos2(4.0, 4.0);
        assert_eq!(nib.width_for_direction(10, p, p), 10.0);
        // never thinner than one pixel
        assert_eq!(nib.width_for_direction(1, pos2(0.0, 0.0), pos2(0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_round_stroke_leaves_no_gaps() {
        let mut canvas = Canvas::blank(60, 20);
        let mut stroke = Stroke::new(ToolKind::Round, 4, BLACK, pos2(5.0, 10.0));
        stroke.extend_to(&mut canvas, pos2(55.0, 10.0), &FountainNib::default());
        for x in 5..=55 {
            assert_eq!(canvas.pixel(x, 10), Some(BLACK), "gap at x={x}");
        }
        assert_eq!(canvas.pixel(30, 16), Some(WHITE));
        assert_eq!(stroke.points().len(), 2);
    }

    #[test]
    fn test_fountain_stroke_densifies_and_tracks_width() {
        let mut canvas = Canvas::blank(60, 60);
        let mut stroke = Stroke::new(ToolKind::Fountain, 6, BLACK, pos2(10.0, 10.0));
        stroke.extend_to(&mut canvas, pos2(40.0, 10.0), &FountainNib::default());
        // 30px at 1.5px density: 20 sub-segments
        assert_eq!(stroke.points().len(), 21);
        assert!(stroke.fountain_width() > 0.0);
        assert_eq!(canvas.pixel(25, 10), Some(BLACK));
    }

    #[test]
    fn test_fountain_turn_eases_from_running_width() {
        let nib = FountainNib::with_angle(0.0);
        let mut canvas = Canvas::blank(30, 30);
        let mut stroke = Stroke::new(ToolKind::Fountain, 10, BLACK, pos2(10.0, 10.0));
        stroke.extend_to(&mut canvas, pos2(12.0, 10.0), &nib);
        assert_eq!(stroke.fountain_width(), 2.0);

        // turning across the nib targets 18px but only eases part of the way
        stroke.extend_to(&mut canvas, pos2(12.0, 11.0), &nib);
        let expected = 2.0 + (18.0 - 2.0) * FOUNTAIN_SMOOTHING;
        assert!((stroke.fountain_width() - expected).abs() < 1e-4);
    }
}
