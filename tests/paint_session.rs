use chrono::{NaiveDate, NaiveDateTime};
use egui::pos2;
use kidbox::config::PaintConfig;
use kidbox::paint::{ArchiveStore, LATEST_FILE, PaintSession, RecallSource, ToolKind, UNDO_MAX_DEPTH};
use kidbox::raster::{Canvas, Rgb};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

fn at(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 5)
        .unwrap()
        .and_hms_opt(9, minute, 0)
        .unwrap()
}

fn session_in(dir: &Path) -> PaintSession {
    let store = ArchiveStore::open(dir, 100).unwrap();
    PaintSession::new(
        &PaintConfig::default(),
        Some(store),
        (48, 32),
        (1366.0, 768.0),
        Instant::now(),
    )
}

fn scribble(session: &mut PaintSession, y: f32) {
    session.pointer_down(pos2(4.0, y));
    session.extend_stroke(pos2(40.0, y));
    session.end_stroke();
}

fn set_mtime(path: &Path, secs_after_epoch: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
        .unwrap();
}

#[test]
fn test_undo_then_redo_restores_canvas_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());
    session.set_tool(ToolKind::Round);
    scribble(&mut session, 8.0);
    session.set_tool(ToolKind::Fountain);
    scribble(&mut session, 20.0);
    let drawn = session.canvas().clone();

    session.undo();
    assert_ne!(session.canvas(), &drawn);
    session.redo();
    assert_eq!(session.canvas(), &drawn);

    // a fresh edit after undo invalidates redo
    session.undo();
    scribble(&mut session, 28.0);
    assert!(!session.can_redo());
}

#[test]
fn test_undo_depth_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());
    for idx in 0..(UNDO_MAX_DEPTH + 5) {
        scribble(&mut session, 2.0 + idx as f32 * 2.0);
    }
    assert_eq!(session.undo_len(), UNDO_MAX_DEPTH);

    let mut undone = 0;
    while session.can_undo() {
        session.undo();
        undone += 1;
    }
    assert_eq!(undone, UNDO_MAX_DEPTH);
    // the oldest strokes fell off the stack and stay on the canvas
    assert_ne!(session.canvas(), &Canvas::blank(48, 32));
}

#[test]
fn test_fill_with_same_color_still_records_undo() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());
    let white = Rgb::from([255, 255, 255]);
    session.flood_fill(pos2(1.0, 1.0), white);
    assert_eq!(session.canvas(), &Canvas::blank(48, 32));
    assert_eq!(session.undo_len(), 1);
}

#[test]
fn test_retention_keeps_newest_archives() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::open(dir.path(), 100).unwrap();
    let canvas = Canvas::blank(4, 4);
    for idx in 0..105u64 {
        let path = dir.path().join(format!("archive_{idx:03}.png"));
        canvas.save_png(&path).unwrap();
        set_mtime(&path, 1_000 + idx);
    }
    canvas.save_png(&dir.path().join(LATEST_FILE)).unwrap();

    assert_eq!(store.enforce_retention(), 5);
    let archives = store.list_archives().unwrap();
    assert_eq!(archives.len(), 100);
    assert!(!dir.path().join("archive_004.png").exists());
    assert!(dir.path().join("archive_005.png").exists());
    assert!(dir.path().join(LATEST_FILE).exists());
}

#[test]
fn test_new_canvas_archives_and_trims() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArchiveStore::open(dir.path(), 2).unwrap();
    let mut session = PaintSession::new(
        &PaintConfig::default(),
        Some(store),
        (48, 32),
        (1366.0, 768.0),
        Instant::now(),
    );
    for minute in 0..4 {
        scribble(&mut session, 10.0);
        session.start_new_canvas(at(minute));
    }
    let archives = session.store().unwrap().list_archives().unwrap();
    assert_eq!(archives.len(), 2);
    assert_eq!(session.canvas(), &Canvas::blank(48, 32));
    assert!(!session.can_undo());
}

#[test]
fn test_rollover_moves_latest_into_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = session_in(dir.path());
    scribble(&mut first, 16.0);
    first.autosave().unwrap();
    let drawn = first.canvas().clone();
    drop(first);

    let second = session_in(dir.path());
    assert!(!dir.path().join(LATEST_FILE).exists());
    let archives = second.store().unwrap().list_archives().unwrap();
    assert_eq!(archives.len(), 1);
    let restored = Canvas::load_scaled(&archives[0], 48, 32).unwrap();
    assert_eq!(restored, drawn);
}

#[test]
fn test_recall_replaces_canvas_and_clears_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());
    scribble(&mut session, 6.0);
    let archived = session.canvas().clone();
    session.start_new_canvas(at(1));
    scribble(&mut session, 26.0);

    let items = session.open_recall((24, 16));
    assert_eq!(items[0].source, RecallSource::Live);
    assert_eq!(items.len(), 2);
    // opening recall persisted the live canvas
    assert!(dir.path().join(LATEST_FILE).exists());

    assert!(session.recall(&items[1].source, Instant::now()));
    assert_eq!(session.canvas(), &archived);
    assert!(!session.can_undo());
    assert!(!session.can_redo());
    let latest = Canvas::load_scaled(&dir.path().join(LATEST_FILE), 48, 32).unwrap();
    assert_eq!(latest, archived);
}

#[test]
fn test_recall_of_broken_archive_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());
    std::fs::write(dir.path().join("2024-01-01_000000.png"), b"not a png").unwrap();

    let items = session.open_recall((24, 16));
    assert_eq!(items.len(), 1);

    scribble(&mut session, 12.0);
    let before = session.canvas().clone();
    let broken = RecallSource::Archive(dir.path().join("2024-01-01_000000.png"));
    assert!(!session.recall(&broken, Instant::now()));
    assert_eq!(session.canvas(), &before);
    assert!(session.can_undo());
}

#[test]
fn test_demo_picture_stands_in_without_archives() {
    let dir = tempfile::tempdir().unwrap();
    let demo = dir.path().join("demo.png");
    let mut picture = Canvas::blank(48, 32);
    picture.fill(Rgb::from([0, 128, 128]));
    picture.save_png(&demo).unwrap();

    let config = PaintConfig {
        recall_demo: Some(demo.clone()),
        ..PaintConfig::default()
    };
    let store = ArchiveStore::open(dir.path().join("paint"), 100).unwrap();
    let mut session = PaintSession::new(&config, Some(store), (48, 32), (1366.0, 768.0), Instant::now());

    assert_eq!(session.recall_preview(8, 8).map(|c| c.size()), Some((8, 8)));
    let items = session.open_recall((24, 16));
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].source, RecallSource::Archive(demo.clone()));
    assert!(session.recall(&items[1].source, Instant::now()));
    assert_eq!(session.canvas(), &picture);

    // once a real archive exists the demo is no longer offered
    session.start_new_canvas(at(3));
    let items = session.open_recall((24, 16));
    assert_eq!(items.len(), 2);
    assert_ne!(items[1].source, RecallSource::Archive(demo));
}

#[test]
fn test_undo_redo_across_fills_and_strokes() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_in(dir.path());
    let red = Rgb::from([220, 30, 30]);
    let blue = Rgb::from([30, 30, 220]);
    let blank = session.canvas().clone();

    session.set_tool(ToolKind::Round);
    scribble(&mut session, 16.0);
    let stroked = session.canvas().clone();

    session.set_tool(ToolKind::Bucket);
    session.set_color(red);
    session.pointer_down(pos2(2.0, 2.0));
    session.end_stroke();
    let filled = session.canvas().clone();
    assert_eq!(filled.pixel(2, 2), Some(red));
    assert_eq!(filled.pixel(20, 16), stroked.pixel(20, 16));

    session.set_tool(ToolKind::Round);
    session.set_color(blue);
    scribble(&mut session, 28.0);
    let restroked = session.canvas().clone();

    session.flood_fill(pos2(2.0, 2.0), blue);
    let refilled = session.canvas().clone();
    assert_eq!(refilled.pixel(2, 2), Some(blue));

    let states = [&blank, &stroked, &filled, &restroked, &refilled];
    for expected in states.iter().rev().skip(1) {
        session.undo();
        assert_eq!(session.canvas(), *expected);
    }
    assert!(!session.can_undo());
    for expected in states.iter().skip(1) {
        session.redo();
        assert_eq!(session.canvas(), *expected);
    }
    assert!(!session.can_redo());
}
