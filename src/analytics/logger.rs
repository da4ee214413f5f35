use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;
use crate::input::{Dialect, ParseResult};
use crate::request::FormError;

// ---------------------------------------------------------------------------
// Parse log entry (JSONL)
// ---------------------------------------------------------------------------

/// Which input path produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Free-form matrix text (`fuelform parse`).
    Matrix,
    /// A single CSV row (`fuelform row`).
    Row,
    /// Single-segment request form.
    Segment,
    /// Multi-segment route request form.
    Route,
    /// Two-route comparison form.
    Compare,
}

impl InputSource {
    pub const ALL: [InputSource; 5] = [
        Self::Matrix,
        Self::Row,
        Self::Segment,
        Self::Route,
        Self::Compare,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Row => "row",
            Self::Segment => "segment",
            Self::Route => "route",
            Self::Compare => "compare",
        }
    }
}

/// A single entry in the parse event log (`~/.fuelform/parse-log.jsonl`).
///
/// Records the outcome of one parse or form submission. Raw input text is
/// not stored, only its size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseLogEntry {
    pub timestamp: String,
    pub source: InputSource,
    pub success: bool,
    /// Dialect that matched (matrix parses only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dialect: Option<Dialect>,
    /// Error identifier when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub columns: usize,
    #[serde(default)]
    pub input_bytes: usize,
}

impl ParseLogEntry {
    fn new(source: InputSource, raw_len: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            source,
            success: false,
            dialect: None,
            error: None,
            rows: 0,
            columns: 0,
            input_bytes: raw_len,
        }
    }

    /// Entry for a matrix parse.
    pub fn matrix(raw: &str, result: &ParseResult) -> Self {
        let mut entry = Self::new(InputSource::Matrix, raw.len());
        match result {
            Ok(parsed) => {
                entry.success = true;
                entry.dialect = Some(parsed.dialect);
                entry.rows = parsed.rows();
                entry.columns = parsed.max_columns();
            }
            Err(err) => entry.error = Some(err.kind.as_str().to_string()),
        }
        entry
    }

    /// Entry for a CSV row parse. An empty row counts as a failure.
    pub fn row(raw: &str, values: &[f64]) -> Self {
        let mut entry = Self::new(InputSource::Row, raw.len());
        entry.success = !values.is_empty();
        if entry.success {
            entry.rows = 1;
            entry.columns = values.len();
        } else {
            entry.error = Some("empty_row".to_string());
        }
        entry
    }

    /// Entry for a form submission that produced `rows` x `columns` values
    /// or failed with `error`.
    pub fn form(
        source: InputSource,
        input_bytes: usize,
        outcome: Result<(usize, usize), &FormError>,
    ) -> Self {
        let mut entry = Self::new(source, input_bytes);
        match outcome {
            Ok((rows, columns)) => {
                entry.success = true;
                entry.rows = rows;
                entry.columns = columns;
            }
            Err(err) => entry.error = Some(err.code().to_string()),
        }
        entry
    }
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Append an entry to the configured log.
///
/// Best-effort: does nothing when logging is disabled and ignores I/O
/// failures.
pub fn log_event(config: &LoggingConfig, entry: &ParseLogEntry) {
    if !config.enabled {
        return;
    }
    if let Some(path) = config.resolved_path() {
        let _ = append_log_entry(&path, entry);
    }
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from the log at `path`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<ParseLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<ParseLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the last `days` days. `None` returns everything.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<ParseLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let cutoff_str = cutoff.to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff_str)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_log_entry(path: &Path, entry: &ParseLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
