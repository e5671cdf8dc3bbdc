//! JSONL append-only event logging with graceful degradation.
//!
//! Lifecycle events (spawn, ready, shutdown, swallowed shutdown failures)
//! are written as one JSON object per line. When the sink cannot be opened
//! or written, events fall back to stderr; logging never fails the caller.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;

/// Severity of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Routine lifecycle progress.
    Info,
    /// Unexpected but non-fatal (e.g. swallowed shutdown failures).
    Warn,
    /// Supervision failed.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warn => f.write_str("warn"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Append-only JSONL event log.
pub struct EventLog {
    sink: Option<Mutex<File>>,
}

impl EventLog {
    /// Open (or create) a JSONL log at `path`. Falls back to stderr-only
    /// when the file cannot be opened.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
            .map(Mutex::new);
        if sink.is_none() {
            eprintln!("wdh: cannot open event log at {}, logging to stderr", path.display());
        }
        Self { sink }
    }

    /// Log to stderr only.
    #[must_use]
    pub const fn stderr_only() -> Self {
        Self { sink: None }
    }

    /// Record one event.
    pub fn log(&self, level: Level, event: &str, detail: &str) {
        let record = json!({
            "ts": Utc::now().to_rfc3339(),
            "level": level.to_string(),
            "event": event,
            "detail": detail,
        });
        if let Some(sink) = &self.sink {
            let mut file = sink.lock();
            if writeln!(file, "{record}").is_ok() {
                return;
            }
        }
        eprintln!("wdh: {record}");
    }

    /// Record a routine event.
    pub fn info(&self, event: &str, detail: &str) {
        self.log(Level::Info, event, detail);
    }

    /// Record a non-fatal anomaly.
    pub fn warn(&self, event: &str, detail: &str) {
        self.log(Level::Warn, event, detail);
    }

    /// Record a failure.
    pub fn error(&self, event: &str, detail: &str) {
        self.log(Level::Error, event, detail);
    }
}
