//! Error taxonomy shared by both prediction engines
//!
//! Every failure is terminal for the request that produced it. Callers get a
//! specific kind plus a readable message, never a default prediction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PredictResult<T> = Result<T, PredictError>;

/// Errors raised while building point sets or running an engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// Malformed or inconsistent input
    #[error("invalid input: {0}")]
    Validation(String),

    /// Query and training data disagree on dimensionality
    #[error("dimension mismatch: expected {expected} coordinate(s), got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// More neighbors requested than training points exist
    #[error("not enough training points: k = {k} but only {available} available")]
    InsufficientData { k: usize, available: usize },

    /// Too few points to determine a polynomial of the requested degree
    #[error(
        "a degree {degree} polynomial needs at least {required} points, got {available}"
    )]
    UnderdeterminedSystem {
        degree: usize,
        required: usize,
        available: usize,
    },

    /// Least-squares system has no unique stable solution
    #[error("least-squares fit is singular: {0}")]
    SingularFit(String),
}

impl PredictError {
    pub fn validation(message: impl Into<String>) -> Self {
        PredictError::Validation(message.into())
    }

    pub fn singular(message: impl Into<String>) -> Self {
        PredictError::SingularFit(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::Validation(_) => ErrorKind::ValidationError,
            PredictError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            PredictError::InsufficientData { .. } => ErrorKind::InsufficientData,
            PredictError::UnderdeterminedSystem { .. } => ErrorKind::UnderdeterminedSystem,
            PredictError::SingularFit(_) => ErrorKind::SingularFit,
        }
    }
}

/// Wire name of an error, reported as `error_kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    DimensionMismatch,
    InsufficientData,
    UnderdeterminedSystem,
    SingularFit,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::DimensionMismatch => "dimension_mismatch",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::UnderdeterminedSystem => "underdetermined_system",
            ErrorKind::SingularFit => "singular_fit",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
