use chrono::{NaiveDate, NaiveDateTime};
use kidbox::typing::sessions::SESSIONS_FILE;
use kidbox::typing::{GlyphStyle, SessionLog, TextEditor};
use std::io::Write;

fn at(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 5)
        .unwrap()
        .and_hms_opt(9, minute, 0)
        .unwrap()
}

fn document(text: &str, style: GlyphStyle) -> TextEditor {
    let mut editor = TextEditor::new(25);
    editor.select_style(style);
    text.chars().for_each(|ch| editor.insert(ch));
    editor
}

#[test]
fn test_sessions_round_trip_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::open(dir.path()).unwrap();
    let first = document("hello\nworld", GlyphStyle::Italic);
    let second = document("é ok", GlyphStyle::Bold);
    log.append(first.document().rows(), at(0)).unwrap();
    log.append(second.document().rows(), at(1)).unwrap();

    let sessions = log.load_recent(200).unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].rows, second.document().rows());
    assert_eq!(sessions[0].label, "2024-10-05T09:01:00");
    assert_eq!(sessions[1].rows, first.document().rows());
    assert_eq!(sessions[1].preview, "hello world");
    assert!(sessions.iter().all(|session| !session.is_current));
}

#[test]
fn test_malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::open(dir.path()).unwrap();
    log.append(document("before", GlyphStyle::Plain).document().rows(), at(0))
        .unwrap();
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join(SESSIONS_FILE))
            .unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file, r#"{{"timestamp": "x", "rich_lines": [[{{"char": "ab", "size": 25, "style": "plain"}}]]}}"#)
            .unwrap();
        writeln!(file, r#"{{"timestamp": "x", "rich_lines": [[{{"char": "a", "size": 0, "style": "plain"}}]]}}"#)
            .unwrap();
        writeln!(file).unwrap();
    }
    log.append(document("after", GlyphStyle::Plain).document().rows(), at(1))
        .unwrap();

    let sessions = log.load_recent(200).unwrap();
    let previews: Vec<_> = sessions.iter().map(|s| s.preview.as_str()).collect();
    assert_eq!(previews, vec!["after", "before"]);
}

#[test]
fn test_recent_sessions_are_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::open(dir.path()).unwrap();
    for minute in 0..5 {
        let text = format!("doc {minute}");
        log.append(document(&text, GlyphStyle::Plain).document().rows(), at(minute))
            .unwrap();
    }
    let sessions = log.load_recent(2).unwrap();
    let previews: Vec<_> = sessions.iter().map(|s| s.preview.as_str()).collect();
    assert_eq!(previews, vec!["doc 4", "doc 3"]);
}

#[test]
fn test_undecodable_line_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let log = SessionLog::open(dir.path()).unwrap();
    log.append(document("first", GlyphStyle::Plain).document().rows(), at(0))
        .unwrap();
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join(SESSIONS_FILE))
            .unwrap();
        file.write_all(&[0xFF, 0xFE, b'\n']).unwrap();
    }
    log.append(document("second", GlyphStyle::Plain).document().rows(), at(1))
        .unwrap();

    let sessions = log.load_recent(200).unwrap();
    let previews: Vec<_> = sessions.iter().map(|s| s.preview.as_str()).collect();
    assert_eq!(previews, vec!["second", "first"]);
}
