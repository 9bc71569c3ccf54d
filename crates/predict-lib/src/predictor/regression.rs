//! Polynomial least-squares regression
//!
//! Fits `y = c0 + c1*x + ... + cn*x^n` to `(x, y)` training pairs. The x
//! values are mapped onto `[-1, 1]` before the design matrix is built, the
//! system is solved through an SVD rather than the normal equations, and the
//! solution is expanded back into powers of the original `x`. Fewer distinct
//! abscissae than coefficients is an explicit error.

use super::PredictionEngine;
use crate::contract::{PredictionRequest, PredictionResponse, RequestDefaults};
use crate::error::{PredictError, PredictResult};
use crate::health::components;
use crate::models::{Mode, Prediction};
use crate::points::{LabelKind, PointSet};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Relative singular-value cutoff, scaled by the larger matrix dimension
const RANK_EPSILON: f64 = f64::EPSILON;

/// Fitted polynomial, coefficients in ascending powers of `x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate at `x` using Horner's scheme
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }
}

/// Regression result for display
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionPrediction {
    pub prediction: f64,
    pub polynomial: Polynomial,
    /// Coefficient of determination; `None` when every target is equal
    pub r_squared: Option<f64>,
}

/// Fit a polynomial of `degree` to one-dimensional `(x, y)` training points
pub fn fit(training: &PointSet, degree: usize) -> PredictResult<Polynomial> {
    let (xs, ys) = split_pairs(training)?;
    let columns = degree
        .checked_add(1)
        .ok_or(PredictError::UnderdeterminedSystem {
            degree,
            required: usize::MAX,
            available: xs.len(),
        })?;

    if xs.len() < columns {
        return Err(PredictError::UnderdeterminedSystem {
            degree,
            required: columns,
            available: xs.len(),
        });
    }

    let distinct = distinct_count(&xs);
    if distinct < columns {
        return Err(PredictError::singular(format!(
            "{} distinct x values cannot determine a degree {} fit; \
             supply at least {}",
            distinct, degree, columns
        )));
    }

    let start = Instant::now();
    let (shift, scale) = normalization(&xs);
    let design = DMatrix::from_fn(xs.len(), columns, |row, col| {
        ((xs[row] - shift) / scale).powi(col as i32)
    });
    if design.iter().any(|v| !v.is_finite()) {
        return Err(PredictError::singular("design matrix overflows f64"));
    }
    let targets = DVector::from_column_slice(&ys);

    let svd = design.svd(true, true);
    let largest = svd.singular_values.max();
    let tolerance = largest * RANK_EPSILON * xs.len().max(columns) as f64;
    let rank = svd.rank(tolerance);

    if rank < columns {
        return Err(PredictError::singular(format!(
            "design matrix has numerical rank {} but a degree {} fit needs {}",
            rank, degree, columns
        )));
    }

    let solution = svd
        .solve(&targets, tolerance)
        .map_err(|e| PredictError::singular(e.to_string()))?;

    let coefficients = to_monomial(solution.as_slice(), shift, scale);
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(PredictError::singular(format!(
            "x^{} overflows f64 for the supplied x range",
            degree
        )));
    }

    debug!(
        degree = degree,
        training_points = xs.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Polynomial fit completed"
    );

    Ok(Polynomial::new(coefficients))
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// Center and half-range mapping the x values onto `[-1, 1]`
fn normalization(xs: &[f64]) -> (f64, f64) {
    let (min, max) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    // halves first so neither sum can overflow
    let shift = min / 2.0 + max / 2.0;
    let scale = max / 2.0 - min / 2.0;
    if scale > 0.0 {
        (shift, scale)
    } else {
        (shift, 1.0)
    }
}

/// Expand `sum a_j ((x - shift) / scale)^j` into ascending powers of `x`
fn to_monomial(scaled: &[f64], shift: f64, scale: f64) -> Vec<f64> {
    let mut coefficients = vec![0.0; scaled.len()];
    for (j, a) in scaled.iter().enumerate() {
        let a = a / scale.powi(j as i32);
        let mut binomial = 1.0;
        for (i, coefficient) in coefficients.iter_mut().enumerate().take(j + 1) {
            *coefficient += a * binomial * (-shift).powi((j - i) as i32);
            binomial = binomial * (j - i) as f64 / (i + 1) as f64;
        }
    }
    coefficients
}

/// Fit and evaluate at `query_x`
pub fn fit_predict(
    training: &PointSet,
    degree: usize,
    query_x: f64,
) -> PredictResult<RegressionPrediction> {
    if !query_x.is_finite() {
        return Err(PredictError::validation("query x must be a finite number"));
    }

    let polynomial = fit(training, degree)?;
    let (xs, ys) = split_pairs(training)?;

    let prediction = polynomial.evaluate(query_x);
    if !prediction.is_finite() {
        return Err(PredictError::validation(format!(
            "prediction at x = {} overflows f64",
            query_x
        )));
    }

    Ok(RegressionPrediction {
        prediction,
        r_squared: r_squared(&polynomial, &xs, &ys),
        polynomial,
    })
}

fn split_pairs(training: &PointSet) -> PredictResult<(Vec<f64>, Vec<f64>)> {
    if training.dimension() != 1 {
        return Err(PredictError::DimensionMismatch {
            expected: 1,
            actual: training.dimension(),
        });
    }

    training
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let y = point
                .label
                .as_ref()
                .and_then(|label| label.as_target())
                .ok_or_else(|| {
                    PredictError::validation(format!(
                        "training point {} has no numeric target",
                        index + 1
                    ))
                })?;
            Ok((point.coords[0], y))
        })
        .collect::<PredictResult<Vec<(f64, f64)>>>()
        .map(|pairs| pairs.into_iter().unzip())
}

fn r_squared(polynomial: &Polynomial, xs: &[f64], ys: &[f64]) -> Option<f64> {
    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    let total: f64 = ys.iter().map(|y| (y - mean).powi(2)).sum();
    if total < f64::EPSILON {
        return None;
    }
    let residual: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - polynomial.evaluate(*x)).powi(2))
        .sum();
    Some(1.0 - residual / total)
}

/// Contract adapter for the regression route group
#[derive(Debug, Clone, Default)]
pub struct RegressionEngine {
    defaults: RequestDefaults,
}

impl RegressionEngine {
    pub fn new(defaults: RequestDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }
}

impl PredictionEngine for RegressionEngine {
    fn name(&self) -> &'static str {
        components::REGRESSION
    }

    fn predict(&self, request: &PredictionRequest) -> PredictResult<PredictionResponse> {
        if request.mode == Some(Mode::Classify) {
            return Err(PredictError::validation(
                "the regression engine only supports mode 'regress'",
            ));
        }
        self.defaults.check_size(request)?;

        let params = self.defaults.resolve(request);
        self.defaults.check_degree(params.degree)?;
        let training = PointSet::build(&request.points, LabelKind::Target)?;
        let x = request.query.scalar()?;
        let result = fit_predict(&training, params.degree, x)?;

        Ok(PredictionResponse {
            prediction: Prediction::Value(result.prediction),
            neighbors: None,
            coefficients: Some(result.polynomial.coefficients().to_vec()),
            r_squared: result.r_squared,
        })
    }
}
