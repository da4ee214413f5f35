//! Analytics reporter — aggregation over the parse event log.
//!
//! Answers which input paths are used, which dialects users actually type,
//! and which errors come up most often.

use std::collections::HashMap;
use std::path::Path;

use crate::analytics::logger::{self, InputSource, ParseLogEntry};
use crate::input::Dialect;

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `fuelform stats`.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_events: usize,
    pub successes: usize,
    pub source_stats: Vec<SourceStat>,
    pub dialects: DialectDistribution,
    /// `(error id, count)`, most frequent first.
    pub errors: Vec<(String, usize)>,
}

impl Stats {
    pub fn success_pct(&self) -> f64 {
        pct(self.successes, self.total_events)
    }
}

/// Per-input-source counts.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStat {
    pub source: InputSource,
    pub count: usize,
    pub successes: usize,
    /// Mean rows over successful events.
    pub avg_rows: f64,
}

/// Which dialect matched, over successful matrix parses.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DialectDistribution {
    pub strict: usize,
    pub semicolon: usize,
    pub lenient_quotes: usize,
}

impl DialectDistribution {
    pub fn total(&self) -> usize {
        self.strict + self.semicolon + self.lenient_quotes
    }

    /// Percentage for a given count, 0.0 if there are no parses.
    pub fn pct(&self, count: usize) -> f64 {
        pct(count, self.total())
    }
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute stats from the log at `path`, optionally limited to the last
/// `days` days.
pub fn compute_stats(path: &Path, days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(path, days);
    build_stats(&entries)
}

fn build_stats(entries: &[ParseLogEntry]) -> Stats {
    if entries.is_empty() {
        return Stats::default();
    }

    Stats {
        total_events: entries.len(),
        successes: entries.iter().filter(|e| e.success).count(),
        source_stats: compute_source_stats(entries),
        dialects: compute_dialects(entries),
        errors: compute_errors(entries),
    }
}

/// One row per source that appears in the log, in [`InputSource::ALL`] order.
fn compute_source_stats(entries: &[ParseLogEntry]) -> Vec<SourceStat> {
    let mut groups: HashMap<InputSource, Vec<&ParseLogEntry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.source).or_default().push(entry);
    }

    InputSource::ALL
        .iter()
        .filter_map(|source| {
            let group = groups.get(source)?;
            let ok: Vec<_> = group.iter().filter(|e| e.success).collect();
            let avg_rows = if ok.is_empty() {
                0.0
            } else {
                ok.iter().map(|e| e.rows).sum::<usize>() as f64 / ok.len() as f64
            };
            Some(SourceStat {
                source: *source,
                count: group.len(),
                successes: ok.len(),
                avg_rows,
            })
        })
        .collect()
}

fn compute_dialects(entries: &[ParseLogEntry]) -> DialectDistribution {
    let mut dist = DialectDistribution::default();
    for entry in entries.iter().filter(|e| e.success) {
        match entry.dialect {
            Some(Dialect::Strict) => dist.strict += 1,
            Some(Dialect::Semicolon) => dist.semicolon += 1,
            Some(Dialect::LenientQuotes) => dist.lenient_quotes += 1,
            None => {}
        }
    }
    dist
}

/// Error ids by frequency, ties broken alphabetically.
fn compute_errors(entries: &[ParseLogEntry]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for error in entries.iter().filter_map(|e| e.error.as_deref()) {
        *counts.entry(error).or_default() += 1;
    }

    let mut errors: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(error, count)| (error.to_string(), count))
        .collect();
    errors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
