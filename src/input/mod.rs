//! Free-form numeric input parsing.
//!
//! Two entry points with deliberately different leniency:
//!
//! - [`parse`] / [`parse_with`] — the tolerant matrix parser used for whole
//!   routes. Tries an ordered list of dialects and classifies every failure.
//! - [`parse_row`] — the CSV row parser used for single segments. Drops
//!   anything it cannot read.
//!
//! Neither function panics or performs I/O.

pub mod dialect;
pub mod validate;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use dialect::Dialect;

/// The longest numeric prefix of a row piece: an optional sign, then either
/// `Infinity` or a decimal with an optional exponent.
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("leading number regex must compile")
});

/// Rows are route segments, columns are features.
pub type Matrix = Vec<Vec<f64>>;

/// Outcome of a matrix parse.
pub type ParseResult = Result<ParsedMatrix, ParseError>;

// ---------------------------------------------------------------------------
// Success / failure types
// ---------------------------------------------------------------------------

/// A validated matrix together with the dialect that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMatrix {
    pub matrix: Matrix,
    pub dialect: Dialect,
}

impl ParsedMatrix {
    pub fn rows(&self) -> usize {
        self.matrix.len()
    }

    /// Width of the widest row.
    pub fn max_columns(&self) -> usize {
        self.matrix.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn into_matrix(self) -> Matrix {
        self.matrix
    }
}

/// Failure classification for [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// No dialect recognized the input.
    InvalidFormat,
    /// The semicolon dialect hit a cell that is not a finite number.
    MalformedRow,
    /// Zero rows, or a row with zero columns.
    EmptyMatrix,
    /// NaN or an infinity in a structured literal.
    NonFiniteValue,
}

impl ParseErrorKind {
    /// Stable identifier used in the event log and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::MalformedRow => "malformed_row",
            Self::EmptyMatrix => "empty_matrix",
            Self::NonFiniteValue => "non_finite_value",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(
                f,
                "invalid format, use JSON [[1,2],[3,4]] or semicolon rows 1,2; 3,4"
            ),
            Self::MalformedRow => write!(f, "a segment contains a value that is not a number"),
            Self::EmptyMatrix => write!(f, "no segments or an empty segment"),
            Self::NonFiniteValue => write!(f, "values must be finite numbers"),
        }
    }
}

/// A rejected parse. Keeps the raw input so callers can echo it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub raw: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunables for [`parse_with`]. Mirrors the `[input]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Retry with single quotes normalized to double quotes.
    pub lenient_quotes: bool,
    /// In the lenient dialect, accept quoted numbers such as `'1'`.
    pub coerce_numeric_strings: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            lenient_quotes: true,
            coerce_numeric_strings: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse free-form text into a validated matrix using default options.
pub fn parse(raw: &str) -> ParseResult {
    parse_with(raw, &ParserOptions::default())
}

/// Parse free-form text into a validated matrix.
///
/// Dialects are tried in order and the first one that yields a matrix wins:
///
/// 1. strict JSON array of arrays of numbers
/// 2. semicolon-separated rows of comma-separated numbers (only when the
///    input contains `;`, and strict: one bad cell rejects the whole input)
/// 3. JSON again after replacing `'` with `"`
///
/// The winning matrix is then checked for emptiness and non-finite values.
pub fn parse_with(raw: &str, options: &ParserOptions) -> ParseResult {
    let (matrix, dialect) =
        dialect::resolve(raw, options).map_err(|kind| ParseError::new(kind, raw))?;
    validate::check(&matrix).map_err(|kind| ParseError::new(kind, raw))?;
    Ok(ParsedMatrix { matrix, dialect })
}

/// Parse a single comma-separated row, silently dropping unreadable pieces.
///
/// Each piece is read up to the end of its leading number, so `"12km"` is
/// `12.0`. Pieces with no leading number (`"a"`, `"inf"`, `"NaN"`) are
/// dropped: `"1, a, 3"` yields `[1.0, 3.0]`. `Infinity` is kept as a value.
/// The result may be empty; rejecting an empty row is the caller's job.
pub fn parse_row(raw: &str) -> Vec<f64> {
    raw.split(',').filter_map(leading_number).collect()
}

fn leading_number(piece: &str) -> Option<f64> {
    let number = LEADING_NUMBER_RE.find(piece.trim())?;
    number.as_str().parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
