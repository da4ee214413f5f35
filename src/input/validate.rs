//! Post-parse checks shared by every dialect.

use super::{Matrix, ParseErrorKind};

/// Reject empty matrices, empty rows, and non-finite cells.
///
/// Emptiness is checked before finiteness so `[[], [NaN]]` reports
/// `EmptyMatrix`.
pub fn check(matrix: &Matrix) -> Result<(), ParseErrorKind> {
    if matrix.is_empty() || matrix.iter().any(Vec::is_empty) {
        return Err(ParseErrorKind::EmptyMatrix);
    }
    if matrix.iter().flatten().any(|n| !n.is_finite()) {
        return Err(ParseErrorKind::NonFiniteValue);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ragged_finite_rows() {
        assert!(check(&vec![vec![1.0], vec![2.0, 3.0]]).is_ok());
    }

    #[test]
    fn empty_before_non_finite() {
        let matrix = vec![vec![], vec![f64::NAN]];
        assert_eq!(check(&matrix), Err(ParseErrorKind::EmptyMatrix));
    }

    #[test]
    fn rejects_infinity_anywhere() {
        let matrix = vec![vec![1.0], vec![2.0, f64::NEG_INFINITY]];
        assert_eq!(check(&matrix), Err(ParseErrorKind::NonFiniteValue));
    }
}
