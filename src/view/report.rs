//! Pure rendering of prediction responses.
//!
//! Turns response bodies into labelled values and proportional bars. No
//! terminal or markup concerns live here.

use crate::request::form::ROUTE_LABELS;
use crate::request::{CompareResponse, RouteResponse, SegmentResponse};

/// Format a fuel value with a fixed number of decimals.
pub fn format_fuel(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

/// Headline value for a single-segment prediction.
pub fn segment_summary(response: &SegmentResponse, decimals: usize) -> String {
    format_fuel(response.predicted_fuel, decimals)
}

// ---------------------------------------------------------------------------
// Route breakdown
// ---------------------------------------------------------------------------

/// One row of a proportional bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Bar length as a share of the largest value, `0.0..=100.0`.
    pub width_pct: f64,
}

impl Bar {
    /// Render as a run of block characters at most `columns` wide.
    pub fn blocks(&self, columns: usize) -> String {
        let filled = ((self.width_pct / 100.0) * columns as f64).round() as usize;
        "█".repeat(filled.min(columns))
    }
}

/// Route total plus one bar per segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteBreakdown {
    pub total: f64,
    pub bars: Vec<Bar>,
}

/// Build the per-segment chart for a route prediction.
///
/// Widths are relative to the largest segment. When that maximum is not a
/// positive finite number every bar has zero width.
pub fn route_breakdown(response: &RouteResponse) -> RouteBreakdown {
    let max = response
        .segment_fuel
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let bars = response
        .segment_fuel
        .iter()
        .enumerate()
        .map(|(i, &value)| Bar {
            label: format!("Seg {}", i + 1),
            value,
            width_pct: proportional_width(value, max),
        })
        .collect();

    RouteBreakdown {
        total: response.total_fuel,
        bars,
    }
}

fn proportional_width(value: f64, max: f64) -> f64 {
    if !(max.is_finite() && max > 0.0) || !value.is_finite() {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Side-by-side result of a two-route comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareSummary {
    /// `(label, fuel)` per route, in request order.
    pub routes: Vec<(String, f64)>,
    /// Index of the most efficient route, if the backend's index is valid.
    pub winner: Option<usize>,
}

impl CompareSummary {
    pub fn winner_label(&self) -> Option<&str> {
        self.winner
            .and_then(|i| self.routes.get(i))
            .map(|(label, _)| label.as_str())
    }

    /// Banner text such as `Winner: Route A (Most Efficient)`.
    pub fn banner(&self) -> Option<String> {
        self.winner_label()
            .map(|label| format!("Winner: {label} (Most Efficient)"))
    }
}

/// Label each route and pick out the winner reported by the backend.
pub fn compare_summary(response: &CompareResponse) -> CompareSummary {
    let routes = response
        .route_fuel
        .iter()
        .enumerate()
        .map(|(i, &fuel)| (route_label(i), fuel))
        .collect::<Vec<_>>();
    let winner = (response.best_route_index < routes.len()).then_some(response.best_route_index);

    CompareSummary { routes, winner }
}

fn route_label(index: usize) -> String {
    ROUTE_LABELS
        .get(index)
        .map(|label| (*label).to_string())
        .unwrap_or_else(|| format!("Route {}", index + 1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
