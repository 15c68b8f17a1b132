use egui::Vec2;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Horizontal travel, in points, that turns a drag into a swipe
pub const SWIPE_THRESHOLD: f32 = 80.0;

/// Which photo is on screen, plus the order thumbnails still need loading in
#[derive(Debug, Clone, Default)]
pub struct PhotoViewer {
    photos: Vec<PathBuf>,
    current: usize,
    pending: HashSet<usize>,
    pending_cursor: usize,
}

impl PhotoViewer {
    pub fn new(photos: Vec<PathBuf>) -> Self {
        let pending = (0..photos.len()).collect();
        Self {
            photos,
            current: 0,
            pending,
            pending_cursor: 0,
        }
    }

    pub fn photos(&self) -> &[PathBuf] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Path> {
        self.photos.get(self.current).map(PathBuf::as_path)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.photos.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    /// Steps by `delta`, wrapping at both ends
    pub fn step(&mut self, delta: isize) -> bool {
        if self.photos.is_empty() {
            return false;
        }
        let len = self.photos.len() as isize;
        let next = (self.current as isize + delta).rem_euclid(len) as usize;
        let changed = next != self.current;
        self.current = next;
        changed
    }

    pub fn next(&mut self) -> bool {
        self.step(1)
    }

    pub fn previous(&mut self) -> bool {
        self.step(-1)
    }

    /// Applies a finished drag: mostly-horizontal travel past the threshold
    /// moves to the neighbouring photo, leftwards meaning "next"
    pub fn swipe(&mut self, delta: Vec2) -> bool {
        if delta.x.abs() <= SWIPE_THRESHOLD || delta.x.abs() <= delta.y.abs() {
            return false;
        }
        if delta.x < 0.0 { self.next() } else { self.previous() }
    }

    pub fn has_pending_thumbs(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Next thumbnail to load: the first still-pending index in `prefer`,
    /// otherwise the next one in library order
    pub fn next_pending_thumb(&mut self, prefer: &[usize]) -> Option<usize> {
        if let Some(idx) = prefer.iter().copied().find(|idx| self.pending.contains(idx)) {
            self.pending.remove(&idx);
            return Some(idx);
        }
        while self.pending_cursor < self.photos.len() {
            let idx = self.pending_cursor;
            self.pending_cursor += 1;
            if self.pending.remove(&idx) {
                return Some(idx);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    fn viewer(n: usize) -> PhotoViewer {
        PhotoViewer::new((0..n).map(|i| PathBuf::from(format!("{i}.png"))).collect())
    }

    #[test]
    fn test_step_wraps() {
        let mut viewer = viewer(3);
        assert!(viewer.previous());
        assert_eq!(viewer.current_index(), 2);
        assert!(viewer.next());
        assert_eq!(viewer.current_index(), 0);
    }

    #[test]
    fn test_empty_viewer() {
        let mut viewer = viewer(0);
        assert!(!viewer.next());
        assert!(viewer.current().is_none());
        assert_eq!(viewer.next_pending_thumb(&[]), None);
    }

    #[test]
    fn test_swipe_needs_mostly_horizontal_travel() {
        let mut viewer = viewer(3);
        assert!(!viewer.swipe(vec2(-50.0, 0.0)));
        assert!(!viewer.swipe(vec2(-100.0, 120.0)));
        assert!(viewer.swipe(vec2(-100.0, 10.0)));
        assert_eq!(viewer.current_index(), 1);
        assert!(viewer.swipe(vec2(100.0, 10.0)));
        assert_eq!(viewer.current_index(), 0);
    }

    #[test]
    fn test_pending_thumbs_prefer_visible() {
        let mut viewer = viewer(5);
        assert_eq!(viewer.next_pending_thumb(&[3, 4]), Some(3));
        assert_eq!(viewer.next_pending_thumb(&[3]), Some(0));
        assert_eq!(viewer.next_pending_thumb(&[]), Some(1));
        assert_eq!(viewer.next_pending_thumb(&[]), Some(2));
        assert_eq!(viewer.next_pending_thumb(&[]), Some(4));
        assert_eq!(viewer.next_pending_thumb(&[]), None);
        assert!(!viewer.has_pending_thumbs());
    }
}
