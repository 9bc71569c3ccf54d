//! Request/response contract between the engines and the transport layer

use crate::distance::DistanceMetric;
use crate::error::{ErrorKind, PredictError, PredictResult};
use crate::models::{Label, ModelParameters, Mode, Prediction};
use crate::points::RawField;
use serde::{Deserialize, Serialize};

/// Default cap on training rows per request
pub const DEFAULT_MAX_POINTS: usize = 10_000;

/// Default cap on the polynomial degree a request may ask for
pub const DEFAULT_MAX_DEGREE: usize = 20;

/// A prediction request as received from the web layer or CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Raw training rows: coordinates optionally trailed by a label
    pub points: Vec<Vec<RawField>>,
    pub query: Query,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<DistanceMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<usize>,
}

/// Query value: a coordinate vector for KNN, a scalar `x` for regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Query {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Query {
    /// Coordinates of the query; a scalar is a one-dimensional point
    pub fn coordinates(&self) -> Vec<f64> {
        match self {
            Query::Scalar(x) => vec![*x],
            Query::Vector(coords) => coords.clone(),
        }
    }

    /// Single `x` value; a one-element vector is accepted
    pub fn scalar(&self) -> PredictResult<f64> {
        match self {
            Query::Scalar(x) => Ok(*x),
            Query::Vector(coords) if coords.len() == 1 => Ok(coords[0]),
            Query::Vector(coords) => Err(PredictError::DimensionMismatch {
                expected: 1,
                actual: coords.len(),
            }),
        }
    }
}

/// One selected neighbor, in ascending distance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Position of the point in the training rows
    pub index: usize,
    pub point: Vec<f64>,
    pub label: Label,
    pub distance: f64,
}

/// Successful prediction as returned to the web layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Prediction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<Vec<Neighbor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
}

/// Failure as returned to the web layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&PredictError> for ErrorResponse {
    fn from(err: &PredictError) -> Self {
        Self {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<PredictError> for ErrorResponse {
    fn from(err: PredictError) -> Self {
        Self::from(&err)
    }
}

/// Deployment-wide fallbacks for optional request fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    pub k: usize,
    pub metric: DistanceMetric,
    pub degree: usize,
    pub max_points: usize,
    pub max_degree: usize,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            k: 3,
            metric: DistanceMetric::Euclidean,
            degree: 1,
            max_points: DEFAULT_MAX_POINTS,
            max_degree: DEFAULT_MAX_DEGREE,
        }
    }
}

impl RequestDefaults {
    /// Fill the request's absent parameters from these defaults
    pub fn resolve(&self, request: &PredictionRequest) -> ModelParameters {
        ModelParameters {
            k: request.k.unwrap_or(self.k),
            metric: request.metric.unwrap_or(self.metric),
            degree: request.degree.unwrap_or(self.degree),
            mode: request.mode.unwrap_or_default(),
        }
    }

    /// Reject requests carrying more rows than this deployment accepts
    pub fn check_size(&self, request: &PredictionRequest) -> PredictResult<()> {
        if request.points.len() > self.max_points {
            return Err(PredictError::validation(format!(
                "{} points supplied; at most {} accepted",
                request.points.len(),
                self.max_points
            )));
        }
        Ok(())
    }

    /// Reject polynomial degrees above this deployment's cap
    pub fn check_degree(&self, degree: usize) -> PredictResult<()> {
        if degree > self.max_degree {
            return Err(PredictError::validation(format!(
                "degree {} requested; at most {} accepted",
                degree, self.max_degree
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{"mode": "classify", "points": [[0, 0, "A"], [5, 5, "B"]],
                "query": [0, 0.5], "k": 1, "metric": "manhattan"}"#,
        )
        .unwrap();

        assert_eq!(request.mode, Some(Mode::Classify));
        assert_eq!(request.points.len(), 2);
        assert_eq!(request.query, Query::Vector(vec![0.0, 0.5]));
        assert_eq!(request.metric, Some(DistanceMetric::Manhattan));
        assert_eq!(request.degree, None);
    }

    #[test]
    fn test_scalar_query() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"points": [[0, 0]], "query": 4}"#).unwrap();
        assert_eq!(request.query.scalar().unwrap(), 4.0);
        assert_eq!(request.query.coordinates(), vec![4.0]);
    }

    #[test]
    fn test_vector_query_as_scalar() {
        assert_eq!(Query::Vector(vec![2.0]).scalar().unwrap(), 2.0);
        assert!(matches!(
            Query::Vector(vec![1.0, 2.0]).scalar(),
            Err(PredictError::DimensionMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_response_omits_absent_diagnostics() {
        let response = PredictionResponse {
            prediction: Prediction::Value(8.0),
            neighbors: None,
            coefficients: Some(vec![0.0, 2.0]),
            r_squared: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("neighbors").is_none());
        assert!(json.get("r_squared").is_none());
        assert_eq!(json["coefficients"][1], 2.0);
    }

    #[test]
    fn test_error_response_from_error() {
        let body = ErrorResponse::from(PredictError::InsufficientData { k: 4, available: 3 });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error_kind"], "insufficient_data");
        assert!(json["message"].as_str().unwrap().contains("k = 4"));
    }

    #[test]
    fn test_resolve_prefers_request_values() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"points": [], "query": 0, "k": 7, "mode": "regress"}"#).unwrap();
        let params = RequestDefaults::default().resolve(&request);
        assert_eq!(params.k, 7);
        assert_eq!(params.mode, Mode::Regress);
        assert_eq!(params.metric, DistanceMetric::Euclidean);
        assert_eq!(params.degree, 1);
    }

    #[test]
    fn test_size_limit() {
        let defaults = RequestDefaults {
            max_points: 1,
            ..RequestDefaults::default()
        };
        let request = PredictionRequest {
            mode: None,
            points: vec![vec![RawField::Number(0.0)], vec![RawField::Number(1.0)]],
            query: Query::Scalar(0.0),
            k: None,
            metric: None,
            degree: None,
        };
        assert!(defaults.check_size(&request).is_err());
    }

    #[test]
    fn test_degree_limit() {
        let defaults = RequestDefaults::default();
        assert!(defaults.check_degree(DEFAULT_MAX_DEGREE).is_ok());
        assert!(matches!(
            defaults.check_degree(usize::MAX),
            Err(PredictError::Validation(_))
        ));
    }
}
