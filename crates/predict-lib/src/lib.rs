//! Prediction library for the KNN and regression demonstrations
//!
//! This crate provides:
//! - Validated point sets built from raw user rows
//! - Euclidean and Manhattan distance metrics
//! - A k-nearest-neighbors engine (classification and averaging)
//! - A polynomial least-squares regression engine
//! - The request/response contract consumed by the web layer
//! - Health checks and observability

pub mod contract;
pub mod demo;
pub mod distance;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod points;
pub mod predictor;

pub use contract::{
    ErrorResponse, Neighbor, PredictionRequest, PredictionResponse, Query, RequestDefaults,
};
pub use distance::DistanceMetric;
pub use error::{ErrorKind, PredictError, PredictResult};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use points::{parse_coordinates, parse_rows, LabelKind, PointSet, RawField};
pub use predictor::{KnnEngine, PredictionEngine, RegressionEngine, ResponseFormatter};
