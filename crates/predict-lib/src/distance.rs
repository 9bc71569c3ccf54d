//! Distance metrics between points of equal dimension

use crate::error::{PredictError, PredictResult};
use crate::models::Point;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Square root of the summed squared axis differences
    #[default]
    Euclidean,
    /// Sum of absolute axis differences
    Manhattan,
}

impl DistanceMetric {
    /// Distance between two points.
    ///
    /// Fails with `DimensionMismatch` when the points have different
    /// dimensions.
    pub fn distance(&self, a: &Point, b: &Point) -> PredictResult<f64> {
        self.between(&a.coords, &b.coords)
    }

    /// Distance between two raw coordinate slices
    pub fn between(&self, a: &[f64], b: &[f64]) -> PredictResult<f64> {
        if a.len() != b.len() {
            return Err(PredictError::DimensionMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }

        let pairs = a.iter().zip(b);
        let value = match self {
            DistanceMetric::Euclidean => pairs.map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt(),
            DistanceMetric::Manhattan => pairs.map(|(x, y)| (x - y).abs()).sum::<f64>(),
        };
        Ok(value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "manhattan" => Ok(DistanceMetric::Manhattan),
            other => Err(PredictError::validation(format!(
                "unknown metric '{}', expected 'euclidean' or 'manhattan'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
