use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::document::rows_to_text;
use super::glyph::Glyph;
use crate::error::{PersistenceError, PersistenceResult};
use crate::util::time;

pub const SESSIONS_FILE: &str = "sessions.jsonl";
pub const PREVIEW_LIMIT: usize = 150;

/// One line of `sessions.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord<'a> {
    pub timestamp: String,
    pub rich_lines: &'a [Vec<Glyph>],
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    timestamp: serde_json::Value,
    rich_lines: Vec<Vec<Glyph>>,
}

/// A document offered in the recall list
#[derive(Debug, Clone, PartialEq)]
pub struct RecallSession {
    pub label: String,
    pub preview: String,
    pub rows: Vec<Vec<Glyph>>,
    /// The live document; selecting it leaves everything as is
    pub is_current: bool,
}

impl RecallSession {
    pub fn current(rows: &[Vec<Glyph>]) -> Self {
        let text = rows_to_text(rows);
        Self {
            label: "Current".to_owned(),
            preview: preview_text(text.trim_end(), PREVIEW_LIMIT),
            rows: rows.to_vec(),
            is_current: true,
        }
    }
}

/// Collapses whitespace runs to single spaces and keeps the first `limit`
/// characters
pub fn preview_text(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(limit)
        .collect()
}

fn record_label(timestamp: &serde_json::Value) -> String {
    match timestamp {
        serde_json::Value::String(s) if !s.is_empty() => s.clone(),
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        serde_json::Value::Bool(true) => "true".to_owned(),
        serde_json::Value::Array(items) if !items.is_empty() => timestamp.to_string(),
        serde_json::Value::Object(fields) if !fields.is_empty() => timestamp.to_string(),
        _ => "Saved".to_owned(),
    }
}

fn parse_record(line: &str) -> PersistenceResult<RecallSession> {
    let record: StoredRecord = serde_json::from_str(line)?;
    let rows = if record.rich_lines.is_empty() {
        vec![Vec::new()]
    } else {
        record.rich_lines
    };
    Ok(RecallSession {
        label: record_label(&record.timestamp),
        preview: preview_text(&rows_to_text(&rows), PREVIEW_LIMIT),
        rows,
        is_current: false,
    })
}

/// Append-only log of finished typing documents
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    /// Log at `<dir>/sessions.jsonl`, creating `dir` if needed
    pub fn open(dir: &Path) -> PersistenceResult<Self> {
        fs::create_dir_all(dir).map_err(|err| PersistenceError::io(dir, err))?;
        Ok(Self::at(dir.join(SESSIONS_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `rows` as one JSON line stamped with `now`
    pub fn append(&self, rows: &[Vec<Glyph>], now: NaiveDateTime) -> PersistenceResult<()> {
        let record = SessionRecord {
            timestamp: time::iso_timestamp(now),
            rich_lines: rows,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| PersistenceError::io(&self.path, err))?;
        file.write_all(line.as_bytes())
            .map_err(|err| PersistenceError::io(&self.path, err))
    }

    /// The last `limit` valid records, newest first.
    ///
    /// Blank and malformed lines are skipped; a missing log is empty.
    pub fn load_recent(&self, limit: usize) -> PersistenceResult<Vec<RecallSession>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(PersistenceError::io(&self.path, err)),
        };

        let mut recent = VecDeque::with_capacity(limit.min(256));
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let bytes = line.map_err(|err| PersistenceError::io(&self.path, err))?;
            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(err) => {
                    log::debug!("Skipping session record {}: {}", idx + 1, err);
                    continue;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_record(line) {
                Ok(session) => {
                    recent.push_back(session);
                    if recent.len() > limit {
                        recent.pop_front();
                    }
                }
                Err(err) => log::debug!("Skipping session record {}: {}", idx + 1, err),
            }
        }
        Ok(recent.into_iter().rev().collect())
    }
}
