//! Building request bodies from form text.
//!
//! The segment and route forms go through the lenient row parser, so stray
//! tokens are dropped. The compare form goes through the matrix parser and
//! reports why it rejected the input.

use std::fmt;

use crate::input::{self, Matrix, ParseError, ParserOptions};

use super::{CompareRequest, RouteRequest, SegmentRequest};

/// Display labels for the two compared routes.
pub const ROUTE_LABELS: [&str; 2] = ["Route A", "Route B"];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Validation rules applied while building request bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormRules {
    pub parser: ParserOptions,
    /// Required feature count per segment. `None` accepts any width.
    pub expected_features: Option<usize>,
}

impl FormRules {
    /// `route` is the compared route the row belongs to, if any.
    fn check_width(
        &self,
        route: Option<usize>,
        row: usize,
        values: &[f64],
    ) -> Result<(), FormError> {
        match self.expected_features {
            Some(expected) if values.len() != expected => Err(FormError::FeatureCount {
                route,
                row,
                expected,
                found: values.len(),
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a form could not be turned into a request body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// The segment form held no readable number.
    NoFeatures,
    /// No route segment held a readable number.
    NoSegments,
    /// An infinity slipped through the row parser; JSON cannot carry it.
    NonFinite { row: usize },
    /// A segment has the wrong number of features. `route` is set for the
    /// compare form.
    FeatureCount {
        route: Option<usize>,
        row: usize,
        expected: usize,
        found: usize,
    },
    /// One of the compared routes failed to parse.
    Route { index: usize, source: ParseError },
}

impl FormError {
    /// Stable identifier used in the event log.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFeatures => "no_features",
            Self::NoSegments => "no_segments",
            Self::NonFinite { .. } => "non_finite",
            Self::FeatureCount { .. } => "feature_count",
            Self::Route { source, .. } => source.kind.as_str(),
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFeatures => write!(f, "Please enter valid numerical features."),
            Self::NoSegments => write!(f, "Please enter at least one valid segment."),
            Self::NonFinite { row } => {
                write!(f, "Segment {} contains a non-finite value.", row + 1)
            }
            Self::FeatureCount {
                route,
                row,
                expected,
                found,
            } => {
                if let Some(index) = route {
                    write!(f, "{}: ", route_label(*index))?;
                }
                write!(
                    f,
                    "Segment {} has {found} features, expected {expected}.",
                    row + 1
                )
            }
            Self::Route { index, source } => write!(f, "{}: {source}", route_label(*index)),
        }
    }
}

fn route_label(index: usize) -> &'static str {
    ROUTE_LABELS.get(index).copied().unwrap_or("Route")
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Route { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

impl SegmentRequest {
    /// Build from the single-segment feature field, e.g. `"45, 0.6, 2.1"`.
    pub fn from_input(raw: &str, rules: &FormRules) -> Result<Self, FormError> {
        let features = input::parse_row(raw);
        if features.is_empty() {
            return Err(FormError::NoFeatures);
        }
        check_finite(0, &features)?;
        rules.check_width(None, 0, &features)?;
        Ok(Self { features })
    }
}

impl RouteRequest {
    /// Build from the route form's per-segment fields.
    ///
    /// Blank fields and fields with no readable number are skipped. Row
    /// numbers in errors count only the kept segments.
    pub fn from_inputs<S: AsRef<str>>(
        fields: &[S],
        rules: &FormRules,
    ) -> Result<Self, FormError> {
        let segments: Matrix = fields
            .iter()
            .map(|field| field.as_ref())
            .filter(|field: &&str| !field.trim().is_empty())
            .map(input::parse_row)
            .filter(|row| !row.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(FormError::NoSegments);
        }
        for (row, values) in segments.iter().enumerate() {
            check_finite(row, values)?;
            rules.check_width(None, row, values)?;
        }
        Ok(Self { segments })
    }
}

impl CompareRequest {
    /// Build from the two free-form route fields of the compare form.
    pub fn from_inputs(first: &str, second: &str, rules: &FormRules) -> Result<Self, FormError> {
        let first = parse_route(0, first, rules)?;
        let second = parse_route(1, second, rules)?;
        Ok(Self {
            routes: [first, second],
        })
    }
}

fn parse_route(index: usize, raw: &str, rules: &FormRules) -> Result<Matrix, FormError> {
    let matrix = input::parse_with(raw, &rules.parser)
        .map_err(|source| FormError::Route { index, source })?
        .into_matrix();
    for (row, values) in matrix.iter().enumerate() {
        rules.check_width(Some(index), row, values)?;
    }
    Ok(matrix)
}

fn check_finite(row: usize, values: &[f64]) -> Result<(), FormError> {
    if values.iter().all(|n| n.is_finite()) {
        Ok(())
    } else {
        Err(FormError::NonFinite { row })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ParseErrorKind;

    #[test]
    fn segment_drops_junk_tokens() {
        let req = SegmentRequest::from_input("45, fast, 0.6", &FormRules::default()).unwrap();
        assert_eq!(req.features, vec![45.0, 0.6]);
    }

    #[test]
    fn segment_requires_a_number() {
        let err = SegmentRequest::from_input(" , abc", &FormRules::default()).unwrap_err();
        assert_eq!(err, FormError::NoFeatures);
        assert_eq!(err.to_string(), "Please enter valid numerical features.");
    }

    #[test]
    fn segment_rejects_infinity() {
        let err = SegmentRequest::from_input("1, Infinity", &FormRules::default()).unwrap_err();
        assert_eq!(err, FormError::NonFinite { row: 0 });
    }

    #[test]
    fn segment_drops_abbreviated_infinity() {
        let req = SegmentRequest::from_input("1, inf, 12km", &FormRules::default()).unwrap();
        assert_eq!(req.features, vec![1.0, 12.0]);
    }

    #[test]
    fn segment_width_check() {
        let rules = FormRules {
            expected_features: Some(3),
            ..FormRules::default()
        };
        let err = SegmentRequest::from_input("1, 2", &rules).unwrap_err();
        assert_eq!(
            err,
            FormError::FeatureCount {
                route: None,
                row: 0,
                expected: 3,
                found: 2
            }
        );
        assert!(SegmentRequest::from_input("1, 2, 3", &rules).is_ok());
    }

    #[test]
    fn compare_width_error_names_the_route() {
        let rules = FormRules {
            expected_features: Some(2),
            ..FormRules::default()
        };
        let err = CompareRequest::from_inputs("1,2; 3,4", "[[1,2],[3]]", &rules).unwrap_err();
        assert_eq!(
            err,
            FormError::FeatureCount {
                route: Some(1),
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(err.code(), "feature_count");
        assert_eq!(
            err.to_string(),
            "Route B: Segment 2 has 1 features, expected 2."
        );
    }

    #[test]
    fn route_skips_blank_and_unreadable_fields() {
        let fields = ["1, 2", "   ", "x, y", "3, 4"];
        let req = RouteRequest::from_inputs(&fields, &FormRules::default()).unwrap();
        assert_eq!(req.segments, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn route_requires_a_segment() {
        let fields: [&str; 2] = ["", "nope"];
        let err = RouteRequest::from_inputs(&fields, &FormRules::default()).unwrap_err();
        assert_eq!(err, FormError::NoSegments);
    }

    #[test]
    fn compare_accepts_mixed_dialects() {
        let req =
            CompareRequest::from_inputs("[[1,2],[3,4]]", "5,6; 7,8", &FormRules::default())
                .unwrap();
        assert_eq!(req.routes[0], vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(req.routes[1], vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
    }

    #[test]
    fn compare_reports_which_route_failed() {
        let err = CompareRequest::from_inputs("[[1]]", "1; x", &FormRules::default()).unwrap_err();
        match &err {
            FormError::Route { index, source } => {
                assert_eq!(*index, 1);
                assert_eq!(source.kind, ParseErrorKind::MalformedRow);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Route B: "));
    }
}
