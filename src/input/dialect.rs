//! Input dialects for the matrix parser.
//!
//! Each dialect is one attempt in a fixed order. An attempt either produces
//! a matrix, rejects the input outright, or steps aside for the next one.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Matrix, ParseErrorKind, ParserOptions};

/// Prefix for placeholder strings standing in for non-finite literals.
const NON_FINITE_TAG: char = '\u{0}';

/// Matches, outside of string literals, the bare `Infinity`, `-Infinity`
/// and `NaN` literals (group 1) and JSON number literals (group 2). String
/// literals match as a whole so their contents are never rewritten.
static LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
          "(?:[^"\\]|\\.)*"
          |
          (-?\b(?:Infinity|NaN)\b)
          |
          (-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)
        "#,
    )
    .expect("literal regex must compile")
});

// ---------------------------------------------------------------------------
// Dialect
// ---------------------------------------------------------------------------

/// The input syntax that produced a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// JSON array of arrays of numbers.
    Strict,
    /// `1,2; 3,4`
    Semicolon,
    /// JSON with single quotes, e.g. `[['1', 2]]`.
    LenientQuotes,
}

impl Dialect {
    /// Resolution order.
    pub const ORDER: [Dialect; 3] = [Self::Strict, Self::Semicolon, Self::LenientQuotes];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Semicolon => "semicolon",
            Self::LenientQuotes => "lenient_quotes",
        }
    }

    fn attempt(self, raw: &str, options: &ParserOptions) -> Attempt {
        match self {
            Self::Strict => structured(raw, false).map_or(Attempt::Skipped, Attempt::Matched),
            Self::Semicolon => {
                if !raw.contains(';') {
                    return Attempt::Skipped;
                }
                match semicolon_rows(raw) {
                    Some(matrix) => Attempt::Matched(matrix),
                    None => Attempt::Rejected(ParseErrorKind::MalformedRow),
                }
            }
            Self::LenientQuotes => {
                if !options.lenient_quotes || !raw.contains('\'') {
                    return Attempt::Skipped;
                }
                let normalized = raw.replace('\'', "\"");
                structured(&normalized, options.coerce_numeric_strings)
                    .map_or(Attempt::Skipped, Attempt::Matched)
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "JSON"),
            Self::Semicolon => write!(f, "semicolon rows"),
            Self::LenientQuotes => write!(f, "JSON (single quotes)"),
        }
    }
}

/// Outcome of a single dialect attempt.
#[derive(Debug)]
enum Attempt {
    Matched(Matrix),
    Rejected(ParseErrorKind),
    Skipped,
}

/// Run the dialects in order and return the first match.
///
/// The matrix is shape-checked only (array of arrays of numbers); emptiness
/// and finiteness are left to [`super::validate`].
pub(crate) fn resolve(
    raw: &str,
    options: &ParserOptions,
) -> Result<(Matrix, Dialect), ParseErrorKind> {
    for dialect in Dialect::ORDER {
        match dialect.attempt(raw, options) {
            Attempt::Matched(matrix) => return Ok((matrix, dialect)),
            Attempt::Rejected(kind) => return Err(kind),
            Attempt::Skipped => {}
        }
    }
    Err(ParseErrorKind::InvalidFormat)
}

// ---------------------------------------------------------------------------
// Structured (JSON) dialects
// ---------------------------------------------------------------------------

/// Parse `text` as a JSON array of arrays of numbers.
///
/// Returns `None` on malformed syntax or the wrong shape. With
/// `coerce_strings`, string cells holding a number are accepted.
fn structured(text: &str, coerce_strings: bool) -> Option<Matrix> {
    let source = tag_non_finite_literals(text);
    let value: Value = serde_json::from_str(&source).ok()?;

    value
        .as_array()?
        .iter()
        .map(|row| {
            row.as_array()?
                .iter()
                .map(|cell| cell_value(cell, coerce_strings))
                .collect::<Option<Vec<f64>>>()
        })
        .collect()
}

fn cell_value(cell: &Value, coerce_strings: bool) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            if let Some(tagged) = non_finite_placeholder(s) {
                return Some(tagged);
            }
            if coerce_strings {
                s.trim().parse::<f64>().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Rewrite bare `Infinity`, `-Infinity` and `NaN` outside string literals,
/// and number literals too large for `f64`, into tagged placeholder strings.
/// JSON parsing then succeeds and the values surface as non-finite instead
/// of as a syntax error.
///
/// A string literal that already decodes to a tagged placeholder is
/// replaced with `null` so it can never pass as a number.
fn tag_non_finite_literals(text: &str) -> Cow<'_, str> {
    LITERAL_RE.replace_all(text, |caps: &Captures| {
        if let Some(literal) = caps.get(1) {
            return placeholder(literal.as_str());
        }
        if let Some(number) = caps.get(2) {
            return match number.as_str().parse::<f64>() {
                Ok(n) if n == f64::INFINITY => placeholder("Infinity"),
                Ok(n) if n == f64::NEG_INFINITY => placeholder("-Infinity"),
                _ => number.as_str().to_string(),
            };
        }
        let string = &caps[0];
        if serde_json::from_str::<String>(string).is_ok_and(|s| s.starts_with(NON_FINITE_TAG)) {
            "null".to_string()
        } else {
            string.to_string()
        }
    })
}

fn placeholder(literal: &str) -> String {
    format!("\"\\u0000{literal}\"")
}

fn non_finite_placeholder(s: &str) -> Option<f64> {
    match s.strip_prefix(NON_FINITE_TAG)? {
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Semicolon dialect
// ---------------------------------------------------------------------------

/// Split on `;` into rows and on `,` into cells. Every cell must be a
/// finite number; a single bad cell rejects the whole input.
fn semicolon_rows(text: &str) -> Option<Matrix> {
    text.split(';')
        .map(|row| row.split(',').map(finite_cell).collect::<Option<Vec<f64>>>())
        .collect()
}

fn finite_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ParserOptions {
        ParserOptions::default()
    }

    #[test]
    fn strict_wins_before_semicolon() {
        let (matrix, dialect) = resolve("[[1.5, 2]]", &defaults()).unwrap();
        assert_eq!(matrix, vec![vec![1.5, 2.0]]);
        assert_eq!(dialect, Dialect::Strict);
    }

    #[test]
    fn strict_rejects_wrong_shape() {
        assert!(structured("[1, 2]", false).is_none());
        assert!(structured("{\"a\": [1]}", false).is_none());
        assert!(structured("[[1, \"2\"]]", false).is_none());
        assert!(structured("[[1, null]]", false).is_none());
        assert!(structured("[[[1]]]", false).is_none());
    }

    #[test]
    fn flat_array_falls_through_to_invalid_format() {
        let err = resolve("[1, 2]", &defaults()).unwrap_err();
        assert_eq!(err, ParseErrorKind::InvalidFormat);
    }

    #[test]
    fn semicolon_requires_every_cell() {
        assert_eq!(
            resolve("1,2;3,", &defaults()).unwrap_err(),
            ParseErrorKind::MalformedRow
        );
        assert_eq!(
            resolve("1,2;", &defaults()).unwrap_err(),
            ParseErrorKind::MalformedRow
        );
        assert_eq!(
            resolve("1,inf;2,3", &defaults()).unwrap_err(),
            ParseErrorKind::MalformedRow
        );
    }

    #[test]
    fn semicolon_single_row() {
        let (matrix, dialect) = resolve(" 4 , 5 ;6", &defaults()).unwrap();
        assert_eq!(matrix, vec![vec![4.0, 5.0], vec![6.0]]);
        assert_eq!(dialect, Dialect::Semicolon);
    }

    #[test]
    fn semicolon_failure_does_not_reach_lenient_dialect() {
        // Would be valid JSON after quote normalization, but the `;` commits
        // the input to the semicolon dialect first.
        let err = resolve("[['1;2']]", &defaults()).unwrap_err();
        assert_eq!(err, ParseErrorKind::MalformedRow);
    }

    #[test]
    fn lenient_dialect_can_be_disabled() {
        let options = ParserOptions {
            lenient_quotes: false,
            ..defaults()
        };
        assert_eq!(
            resolve("[['1',2]]", &options).unwrap_err(),
            ParseErrorKind::InvalidFormat
        );
    }

    #[test]
    fn stray_quote_still_breaks_lenient_json() {
        let err = resolve("[[1, 2]] '", &defaults()).unwrap_err();
        assert_eq!(err, ParseErrorKind::InvalidFormat);
    }

    #[test]
    fn tags_bare_literals_only() {
        assert_eq!(
            tag_non_finite_literals("[[1,Infinity]]"),
            "[[1,\"\\u0000Infinity\"]]"
        );
        assert_eq!(
            tag_non_finite_literals("[[-Infinity]]"),
            "[[\"\\u0000-Infinity\"]]"
        );
        assert_eq!(tag_non_finite_literals("[[\"NaN\"]]"), "[[\"NaN\"]]");
        assert_eq!(tag_non_finite_literals("[[xNaN]]"), "[[xNaN]]");
        assert_eq!(tag_non_finite_literals("[[NaNa]]"), "[[NaNa]]");
        assert_eq!(tag_non_finite_literals("[[1, 2.5e3]]"), "[[1, 2.5e3]]");
    }

    #[test]
    fn overflowing_numbers_become_infinite() {
        assert_eq!(
            tag_non_finite_literals("[[1e400, -2E999]]"),
            "[[\"\\u0000Infinity\", \"\\u0000-Infinity\"]]"
        );
        let matrix = structured("[[1e400, 1]]", false).unwrap();
        assert_eq!(matrix[0][0], f64::INFINITY);
        assert_eq!(matrix[0][1], 1.0);
    }

    #[test]
    fn typed_placeholder_strings_are_not_numbers() {
        assert!(structured("[[\"\\u0000Infinity\"]]", false).is_none());
        assert!(structured("[[\"\\u0000NaN\", 1]]", true).is_none());
        assert_eq!(
            resolve("[[\"\\u0000Infinity\"]]", &defaults()).unwrap_err(),
            ParseErrorKind::InvalidFormat
        );
    }

    #[test]
    fn quoted_numbers_need_single_quotes_to_coerce() {
        assert_eq!(
            resolve("[[\"1\", 2]]", &defaults()).unwrap_err(),
            ParseErrorKind::InvalidFormat
        );
        let (matrix, dialect) = resolve("[['1', 2]]", &defaults()).unwrap();
        assert_eq!(matrix, vec![vec![1.0, 2.0]]);
        assert_eq!(dialect, Dialect::LenientQuotes);
    }

    #[test]
    fn tagged_literals_decode_to_non_finite() {
        let matrix = structured("[[NaN, -Infinity, Infinity]]", false).unwrap();
        assert!(matrix[0][0].is_nan());
        assert_eq!(matrix[0][1], f64::NEG_INFINITY);
        assert_eq!(matrix[0][2], f64::INFINITY);
    }

    #[test]
    fn coercion_trims_numeric_strings() {
        let matrix = structured("[[\" 3.5 \", 1]]", true).unwrap();
        assert_eq!(matrix, vec![vec![3.5, 1.0]]);
        assert!(structured("[[\"abc\"]]", true).is_none());
    }

    #[test]
    fn dialect_names() {
        assert_eq!(Dialect::LenientQuotes.as_str(), "lenient_quotes");
        assert_eq!(Dialect::Semicolon.to_string(), "semicolon rows");
    }
}
