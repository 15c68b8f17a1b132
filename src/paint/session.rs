use chrono::NaiveDateTime;
use egui::Pos2;
use std::path::PathBuf;
use std::time::Instant;

use super::archive::ArchiveStore;
use super::history::SnapshotHistory;
use super::stroke::{FountainNib, Stroke};
use super::tool::{ToolKind, scaled_size_values};
use crate::config::PaintConfig;
use crate::error::PersistenceResult;
use crate::raster::{BLACK, Canvas, Rgb, WHITE};
use crate::util::{IntervalTimer, time};

/// What a recall entry would restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecallSource {
    /// The canvas currently being drawn; selecting it changes nothing
    Live,
    Archive(PathBuf),
}

/// One entry of the recall strip
#[derive(Debug, Clone)]
pub struct RecallItem {
    pub source: RecallSource,
    pub thumb: Canvas,
}

/// Single-writer paint session: owns the canvas, its undo/redo snapshots and
/// the archive policy
pub struct PaintSession {
    canvas: Canvas,
    history: SnapshotHistory<Canvas>,
    stroke: Option<Stroke>,
    nib: FountainNib,

    tool: ToolKind,
    size_values: [u32; 3],
    size: u32,
    palette: Vec<Rgb>,
    color: Rgb,

    store: Option<ArchiveStore>,
    recall_demo: Option<PathBuf>,
    autosave: IntervalTimer,
    /// Bumped on every pixel change so views can refresh textures lazily
    version: u64,
}

impl std::fmt::Debug for PaintSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintSession")
            .field("canvas", &self.canvas)
            .field("tool", &self.tool)
            .field("size", &self.size)
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("stroking", &self.stroke.is_some())
            .finish()
    }
}

impl PaintSession {
    /// Builds a session with a blank canvas of `canvas_size`.
    ///
    /// `screen_size` scales the three nib sizes. A `latest.png` left by an
    /// earlier session is rolled into the archive before anything is drawn.
    pub fn new(
        config: &PaintConfig,
        store: Option<ArchiveStore>,
        canvas_size: (u32, u32),
        screen_size: (f32, f32),
        now: Instant,
    ) -> Self {
        let palette = config.palette_colors();
        let color = palette.first().copied().unwrap_or(BLACK);
        let size_values = scaled_size_values(screen_size.0, screen_size.1);

        let mut session = Self {
            canvas: Canvas::blank(canvas_size.0, canvas_size.1),
            history: SnapshotHistory::default(),
            stroke: None,
            nib: FountainNib::default(),
            tool: ToolKind::default(),
            size_values,
            size: size_values[1],
            palette,
            color,
            store,
            recall_demo: config.recall_demo.clone(),
            autosave: IntervalTimer::new(config.autosave_interval(), now),
            version: 0,
        };
        session.rollover_on_start(time::local_now());
        session
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn store(&self) -> Option<&ArchiveStore> {
        self.store.as_ref()
    }

    /// Newest archive that decodes, or the demo picture when there is none
    pub fn recall_preview(&self, width: u32, height: u32) -> Option<Canvas> {
        self.store
            .as_ref()
            .and_then(|store| store.newest_preview(width, height))
            .or_else(|| self.demo_thumb(width, height))
    }

    fn demo_thumb(&self, width: u32, height: u32) -> Option<Canvas> {
        let demo = self.recall_demo.as_ref()?;
        Canvas::load_scaled(demo, width, height)
            .map_err(|err| log::debug!("Recall demo unavailable: {err}"))
            .ok()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn size_values(&self) -> [u32; 3] {
        self.size_values
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn nib(&self) -> FountainNib {
        self.nib
    }

    pub fn set_nib(&mut self, nib: FountainNib) {
        self.nib = nib;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn push_undo(&mut self) {
        self.history.record(self.canvas.clone());
    }

    /// Pointer-down with the current tool, size and colour
    pub fn pointer_down(&mut self, point: Pos2) {
        self.begin_stroke(self.tool, self.size, self.color, point);
    }

    /// Snapshots the canvas, then either opens a stroke or, for the bucket,
    /// fills immediately
    pub fn begin_stroke(&mut self, tool: ToolKind, size: u32, color: Rgb, point: Pos2) {
        if !tool.draws_strokes() {
            self.flood_fill(point, color);
            return;
        }
        self.push_undo();
        let color = if tool == ToolKind::Eraser { WHITE } else { color };
        self.stroke = Some(Stroke::new(tool, size, color, point));
    }

    /// Draws from the last recorded point to `point`; no-op without a stroke
    pub fn extend_stroke(&mut self, point: Pos2) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        stroke.extend_to(&mut self.canvas, point, &self.nib);
        self.touch();
    }

    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    /// Bucket fill as an undoable action.
    ///
    /// The snapshot is taken even when the fill turns out to be a no-op.
    pub fn flood_fill(&mut self, point: Pos2, color: Rgb) {
        self.push_undo();
        if self.canvas.flood_fill(point, color) > 0 {
            self.touch();
        }
    }

    pub fn undo(&mut self) {
        self.stroke = None;
        if self.history.undo(&mut self.canvas) {
            self.touch();
        }
    }

    pub fn redo(&mut self) {
        self.stroke = None;
        if self.history.redo(&mut self.canvas) {
            self.touch();
        }
    }

    /// Archives the current canvas under a timestamped name
    pub fn archive(&self, now: NaiveDateTime) -> Option<PathBuf> {
        let store = self.store.as_ref()?;
        match store.archive(&self.canvas, now) {
            Ok(path) => Some(path),
            Err(err) => {
                log::warn!("Failed to archive canvas: {err}");
                None
            }
        }
    }

    /// "New": archive what is there, then start over on a white canvas
    pub fn start_new_canvas(&mut self, now: NaiveDateTime) {
        self.archive(now);
        self.stroke = None;
        self.canvas.fill(WHITE);
        self.history.clear();
        self.touch();
    }

    /// Atomically overwrites `latest.png`
    pub fn autosave(&self) -> PersistenceResult<()> {
        match &self.store {
            Some(store) => store.autosave_latest(&self.canvas),
            None => Ok(()),
        }
    }

    fn autosave_logged(&self) {
        if let Err(err) = self.autosave() {
            log::warn!("Autosave failed: {err}");
        }
    }

    /// Called once per frame; autosaves when the interval has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.autosave.poll(now) {
            return false;
        }
        self.autosave_logged();
        true
    }

    /// Renames a stale `latest.png` into the archive
    pub fn rollover_on_start(&self, now: NaiveDateTime) -> Option<PathBuf> {
        let store = self.store.as_ref()?;
        match store.rollover_latest(now) {
            Ok(archived) => archived,
            Err(err) => {
                log::warn!("Failed to roll over previous canvas: {err}");
                None
            }
        }
    }

    /// Persists the live canvas, then lists it followed by every archive that
    /// decodes, newest first, as `thumb_size` thumbnails. The configured demo
    /// picture stands in when no archive decodes.
    pub fn open_recall(&self, thumb_size: (u32, u32)) -> Vec<RecallItem> {
        self.autosave_logged();
        let (w, h) = thumb_size;
        let mut items = vec![RecallItem {
            source: RecallSource::Live,
            thumb: self.canvas.scaled(w, h),
        }];

        let archives = match &self.store {
            Some(store) => store.list_archives().unwrap_or_else(|err| {
                log::warn!("Cannot list archives: {err}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        for path in archives {
            match Canvas::load_scaled(&path, w, h) {
                Ok(thumb) => items.push(RecallItem {
                    source: RecallSource::Archive(path),
                    thumb,
                }),
                Err(err) => log::debug!("Skipping recall candidate: {err}"),
            }
        }
        if items.len() == 1 {
            if let (Some(demo), Some(thumb)) = (&self.recall_demo, self.demo_thumb(w, h)) {
                items.push(RecallItem {
                    source: RecallSource::Archive(demo.clone()),
                    thumb,
                });
            }
        }
        items
    }

    /// Replaces the canvas with the selected archive.
    ///
    /// Clears undo and redo, then promotes the result to `latest.png`. Returns
    /// false when the selection could not be loaded; the canvas is unchanged.
    pub fn recall(&mut self, source: &RecallSource, now: Instant) -> bool {
        let RecallSource::Archive(path) = source else {
            return true;
        };
        let (w, h) = self.canvas.size();
        let loaded = match Canvas::load_scaled(path, w, h) {
            Ok(canvas) => canvas,
            Err(err) => {
                log::warn!("Recall unavailable: {err}");
                return false;
            }
        };
        self.stroke = None;
        self.canvas = loaded;
        self.history.clear();
        self.touch();
        self.autosave_logged();
        self.autosave.reset(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn session() -> PaintSession {
        PaintSession::new(
            &PaintConfig::default(),
            None,
            (40, 30),
            (1366.0, 768.0),
            Instant::now(),
        )
    }

    #[test]
    fn test_defaults_follow_config() {
        let session = session();
        assert_eq!(session.tool(), ToolKind::Fountain);
        assert_eq!(session.size(), 6);
        assert_eq!(session.color(), BLACK);
        assert_eq!(session.palette().len(), 16);
    }

    #[test]
    fn test_eraser_paints_white() {
        let mut session = session();
        session.set_tool(ToolKind::Round);
        session.pointer_down(pos2(5.0, 5.0));
        session.extend_stroke(pos2(30.0, 5.0));
        session.end_stroke();
        assert_eq!(session.canvas().pixel(20, 5), Some(BLACK));

        session.set_tool(ToolKind::Eraser);
        session.pointer_down(pos2(5.0, 5.0));
        session.extend_stroke(pos2(30.0, 5.0));
        session.end_stroke();
        assert_eq!(session.canvas().pixel(20, 5), Some(WHITE));
    }

    #[test]
    fn test_extend_without_stroke_is_noop() {
        let mut session = session();
        let version = session.version();
        session.extend_stroke(pos2(10.0, 10.0));
        assert_eq!(session.version(), version);
        assert_eq!(session.canvas(), &Canvas::blank(40, 30));
    }

    #[test]
    fn test_bucket_does_not_open_stroke() {
        let mut session = session();
        session.set_tool(ToolKind::Bucket);
        session.set_color(Rgb::from([255, 0, 0]));
        session.pointer_down(pos2(1.0, 1.0));
        assert!(!session.is_stroking());
        assert_eq!(session.canvas().pixel(39, 29), Some(Rgb::from([255, 0, 0])));
        assert_eq!(session.undo_len(), 1);
    }

    #[test]
    fn test_recall_live_is_noop() {
        let mut session = session();
        session.pointer_down(pos2(5.0, 5.0));
        session.extend_stroke(pos2(20.0, 20.0));
        session.end_stroke();
        let before = session.canvas().clone();
        assert!(session.recall(&RecallSource::Live, Instant::now()));
        assert_eq!(session.canvas(), &before);
        assert!(session.can_undo());
    }

    #[test]
    fn test_open_recall_without_store_lists_live_only() {
        let session = session();
        let items = session.open_recall((8, 6));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, RecallSource::Live);
        assert_eq!(items[0].thumb.size(), (8, 6));
    }
}
