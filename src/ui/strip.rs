use eframe::egui;

/// Pointer travel after which a press on a strip item is a scroll, not a tap
pub const DRAG_THRESHOLD: f32 = 10.0;
/// Mouse-wheel step
pub const SCROLL_STEP: f32 = 40.0;

/// Vertical list of equally sized items scrolled by dragging.
///
/// A press remembers the item under the pointer; releasing over the same
/// item before the drag threshold selects it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollStrip {
    pub item_height: f32,
    pub gap: f32,
    pub padding_x: f32,
    scroll: f32,
    pressed: Option<usize>,
    drag_distance: f32,
}

impl ScrollStrip {
    pub fn new(item_height: f32, gap: f32, padding_x: f32) -> Self {
        Self {
            item_height,
            gap,
            padding_x,
            scroll: 0.0,
            pressed: None,
            drag_distance: 0.0,
        }
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn max_scroll(&self, count: usize, view_height: f32) -> f32 {
        let total = count as f32 * (self.item_height + self.gap) + self.gap;
        (total - view_height).max(0.0)
    }

    pub fn scroll_by(&mut self, delta: f32, count: usize, view_height: f32) {
        self.scroll = (self.scroll + delta).clamp(0.0, self.max_scroll(count, view_height));
    }

    pub fn item_rect(&self, strip: egui::Rect, index: usize) -> egui::Rect {
        let top = strip.top() + self.gap - self.scroll + index as f32 * (self.item_height + self.gap);
        egui::Rect::from_min_size(
            egui::pos2(strip.left() + self.padding_x, top),
            egui::vec2((strip.width() - self.padding_x * 2.0).max(1.0), self.item_height),
        )
    }

    pub fn index_at(&self, strip: egui::Rect, count: usize, pos: egui::Pos2) -> Option<usize> {
        if !strip.contains(pos) {
            return None;
        }
        (0..count).find(|idx| self.item_rect(strip, *idx).contains(pos))
    }

    /// Items at least partly inside the strip
    pub fn visible(&self, strip: egui::Rect, count: usize) -> Vec<usize> {
        (0..count)
            .filter(|idx| self.item_rect(strip, *idx).intersects(strip))
            .collect()
    }

    pub fn press(&mut self, index: Option<usize>) {
        self.pressed = index;
        self.drag_distance = 0.0;
    }

    pub fn drag(&mut self, dy: f32, count: usize, view_height: f32) {
        self.scroll_by(-dy, count, view_height);
        self.drag_distance += dy.abs();
    }

    /// Ends the gesture; returns the tapped item, if it was a tap
    pub fn release(&mut self, index: Option<usize>) -> Option<usize> {
        let pressed = self.pressed.take();
        let tapped = self.drag_distance < DRAG_THRESHOLD && pressed.is_some() && pressed == index;
        self.drag_distance = 0.0;
        if tapped { pressed } else { None }
    }

    /// Runs one frame of pointer handling over `strip`; returns a tapped item
    pub fn interact(&mut self, ui: &mut egui::Ui, strip: egui::Rect, count: usize, id: egui::Id) -> Option<usize> {
        let response = ui.interact(strip, id, egui::Sense::click_and_drag());
        let view_height = strip.height();
        let (pressed, released, delta, pos, wheel) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.delta(),
                i.pointer.interact_pos(),
                i.smooth_scroll_delta.y,
            )
        });

        if response.hovered() && wheel != 0.0 {
            self.scroll_by(-wheel, count, view_height);
        }
        let mut tapped = None;
        if let Some(pos) = pos {
            if pressed && strip.contains(pos) {
                self.press(self.index_at(strip, count, pos));
            } else if released {
                tapped = self.release(self.index_at(strip, count, pos));
            } else if response.is_pointer_button_down_on() && delta.y != 0.0 {
                self.drag(delta.y, count, view_height);
            }
        }
        tapped
    }
}
