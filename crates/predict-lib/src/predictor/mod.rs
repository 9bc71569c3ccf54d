//! Prediction engines
//!
//! Two independent engines share one contract: [`KnnEngine`] for nearest
//! neighbor classification/averaging and [`RegressionEngine`] for
//! polynomial least squares. The transport layer only sees the
//! [`PredictionEngine`] trait.

pub mod knn;
mod output;
pub mod regression;

#[cfg(test)]
mod tests;

pub use knn::{KnnEngine, KnnPrediction};
pub use output::{OutputConfig, ResponseFormatter, JSON_CONTENT_TYPE};
pub use regression::{Polynomial, RegressionEngine, RegressionPrediction};

use crate::contract::{PredictionRequest, PredictionResponse};
use crate::error::PredictResult;

/// Trait for prediction implementations mounted by the transport layer
pub trait PredictionEngine: Send + Sync {
    /// Route group and metrics label for this engine
    fn name(&self) -> &'static str;

    /// Run one request to completion
    fn predict(&self, request: &PredictionRequest) -> PredictResult<PredictionResponse>;
}
