//! Request and response bodies for the fuel prediction service.
//!
//! The service exposes three JSON endpoints. This module builds their
//! request bodies from raw form text and describes their responses. It does
//! not send anything; transport belongs to the caller.

pub mod form;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::input::Matrix;

pub use form::FormError;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// A prediction endpoint on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Fuel for a single segment's feature vector.
    PredictSegment,
    /// Per-segment and total fuel for a route.
    PredictRoute,
    /// Fuel for two routes plus the index of the cheaper one.
    CompareRoutes,
}

impl Endpoint {
    /// URL path, relative to the service base.
    pub fn path(self) -> &'static str {
        match self {
            Self::PredictSegment => "/predict_segment",
            Self::PredictRoute => "/predict_route",
            Self::CompareRoutes => "/compare_routes",
        }
    }

    /// HTTP method. Every endpoint takes a JSON body.
    pub fn method(self) -> &'static str {
        "POST"
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for `POST /predict_segment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub features: Vec<f64>,
}

/// Body for `POST /predict_route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub segments: Matrix,
}

/// Body for `POST /compare_routes`. Always exactly two routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    pub routes: [Matrix; 2],
}

/// A request body paired with its endpoint.
pub trait PredictionRequest: Serialize {
    const ENDPOINT: Endpoint;

    /// Serialize the body as compact JSON.
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl PredictionRequest for SegmentRequest {
    const ENDPOINT: Endpoint = Endpoint::PredictSegment;
}

impl PredictionRequest for RouteRequest {
    const ENDPOINT: Endpoint = Endpoint::PredictRoute;
}

impl PredictionRequest for CompareRequest {
    const ENDPOINT: Endpoint = Endpoint::CompareRoutes;
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Response from `POST /predict_segment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResponse {
    pub predicted_fuel: f64,
}

/// Response from `POST /predict_route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub segment_fuel: Vec<f64>,
    pub total_fuel: f64,
}

/// Response from `POST /compare_routes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub route_fuel: Vec<f64>,
    /// Index into `route_fuel` of the route with the lowest fuel.
    pub best_route_index: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::PredictSegment.path(), "/predict_segment");
        assert_eq!(Endpoint::PredictRoute.path(), "/predict_route");
        assert_eq!(Endpoint::CompareRoutes.path(), "/compare_routes");
        assert_eq!(
            Endpoint::CompareRoutes.to_string(),
            "POST /compare_routes"
        );
    }

    #[test]
    fn request_bodies_use_backend_field_names() {
        let segment = SegmentRequest {
            features: vec![45.0, 0.6],
        };
        assert_eq!(segment.to_json().unwrap(), r#"{"features":[45.0,0.6]}"#);

        let route = RouteRequest {
            segments: vec![vec![1.0], vec![2.0]],
        };
        assert_eq!(route.to_json().unwrap(), r#"{"segments":[[1.0],[2.0]]}"#);

        let compare = CompareRequest {
            routes: [vec![vec![1.0]], vec![vec![2.0, 3.0]]],
        };
        assert_eq!(
            compare.to_json().unwrap(),
            r#"{"routes":[[[1.0]],[[2.0,3.0]]]}"#
        );
    }

    #[test]
    fn responses_deserialize() {
        let route: RouteResponse =
            serde_json::from_str(r#"{"segment_fuel":[0.5,1.25],"total_fuel":1.75}"#).unwrap();
        assert_eq!(route.segment_fuel, vec![0.5, 1.25]);
        assert!((route.total_fuel - 1.75).abs() < f64::EPSILON);

        let compare: CompareResponse =
            serde_json::from_str(r#"{"route_fuel":[3.0,2.0],"best_route_index":1}"#).unwrap();
        assert_eq!(compare.best_route_index, 1);

        let segment: SegmentResponse =
            serde_json::from_str(r#"{"predicted_fuel":4.2}"#).unwrap();
        assert!((segment.predicted_fuel - 4.2).abs() < f64::EPSILON);
    }
}
