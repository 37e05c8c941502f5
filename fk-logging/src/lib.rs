//! fk-logging: NDJSON game-event logs + completed-game summaries.
//!
//! Event logs are append-only, one JSON object per line, so a crashed run still
//! leaves every complete line readable. Summaries feed an external Hall-of-Fame
//! store; this crate only writes the records.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use fk_core::{EventSink, GameEvent, GameSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Summary record schema version.
pub const SUMMARY_VERSION: u32 = 1;

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for NdjsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NdjsonError::Io(e) => write!(f, "io error: {e}"),
            NdjsonError::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for NdjsonError {}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// One line of a game-event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecordV1 {
    pub ts_ms: u64,
    pub game_id: u64,
    /// Position of the event within its game, from 0.
    pub seq: u64,
    #[serde(flatten)]
    pub event: GameEvent,
}

/// Completed-game record handed to the Hall-of-Fame store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummaryV1 {
    pub summary_version: u32,
    pub game_id: u64,
    pub finished_ts_ms: u64,
    #[serde(flatten)]
    pub summary: GameSummary,
}

impl GameSummaryV1 {
    pub fn new(game_id: u64, summary: GameSummary) -> Self {
        Self {
            summary_version: SUMMARY_VERSION,
            game_id,
            finished_ts_ms: now_ms(),
            summary,
        }
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

/// [`EventSink`] that appends every game event to an NDJSON log.
///
/// Write failures are counted, never raised: a broken log must not stop a game.
/// The writer is flushed after `GameEnded` and on drop.
pub struct NdjsonEventSink {
    writer: NdjsonWriter,
    game_id: u64,
    seq: u64,
    errors: u64,
}

impl NdjsonEventSink {
    pub fn new(writer: NdjsonWriter, game_id: u64) -> Self {
        Self {
            writer,
            game_id,
            seq: 0,
            errors: 0,
        }
    }

    pub fn open_append(path: impl AsRef<Path>, game_id: u64) -> Result<Self, NdjsonError> {
        Ok(Self::new(NdjsonWriter::open_append(path)?, game_id))
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn events_written(&self) -> u64 {
        self.seq
    }
}

impl EventSink for NdjsonEventSink {
    fn emit(&mut self, event: &GameEvent) {
        let rec = EventRecordV1 {
            ts_ms: now_ms(),
            game_id: self.game_id,
            seq: self.seq,
            event: event.clone(),
        };
        if self.writer.write_event(&rec).is_err() {
            self.errors += 1;
            return;
        }
        self.seq += 1;
        if matches!(event, GameEvent::GameEnded { .. }) && self.writer.flush().is_err() {
            self.errors += 1;
        }
    }
}

impl Drop for NdjsonEventSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read every well-formed line of an NDJSON file, skipping blank or torn lines.
pub fn read_ndjson_lenient<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<Vec<T>, NdjsonError> {
    let s = std::fs::read_to_string(path)?;
    Ok(s.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<T>(l).ok())
        .collect())
}

pub fn read_summary(path: impl AsRef<Path>) -> Result<GameSummaryV1, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<GameSummaryV1>(&bytes)?)
}

/// Write a single summary as pretty JSON via tmp file + rename.
pub fn write_summary_atomic(path: impl AsRef<Path>, s: &GameSummaryV1) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(s)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Append a summary to a Hall-of-Fame NDJSON file.
pub fn append_summary(path: impl AsRef<Path>, s: &GameSummaryV1) -> Result<(), NdjsonError> {
    let mut w = NdjsonWriter::open_append(path)?;
    w.write_event(s)?;
    w.flush()
}
