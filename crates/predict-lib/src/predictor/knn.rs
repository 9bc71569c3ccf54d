//! K-nearest-neighbors prediction
//!
//! A lazy learner: nothing is fitted ahead of time. Each call measures the
//! query against every training point, stable-sorts by distance and looks at
//! the first `k` entries. Equal distances keep training order, so identical
//! inputs always select the identical neighbor set.

use super::PredictionEngine;
use crate::contract::{Neighbor, PredictionRequest, PredictionResponse, RequestDefaults};
use crate::distance::DistanceMetric;
use crate::error::{PredictError, PredictResult};
use crate::health::components;
use crate::models::{Label, Mode, Point, Prediction};
use crate::points::{LabelKind, PointSet};
use std::time::Instant;
use tracing::debug;

/// Prediction plus the neighbors that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct KnnPrediction {
    pub prediction: Prediction,
    pub neighbors: Vec<Neighbor>,
}

/// Predict a label or value for `query` from its `k` nearest training points
pub fn predict(
    training: &PointSet,
    query: &Point,
    k: usize,
    metric: DistanceMetric,
    mode: Mode,
) -> PredictResult<KnnPrediction> {
    if k == 0 {
        return Err(PredictError::validation("k must be at least 1"));
    }
    if query.dimension() != training.dimension() {
        return Err(PredictError::DimensionMismatch {
            expected: training.dimension(),
            actual: query.dimension(),
        });
    }
    if k > training.len() {
        return Err(PredictError::InsufficientData {
            k,
            available: training.len(),
        });
    }

    let start = Instant::now();
    let neighbors = nearest(training, query, k, metric, mode)?;

    let prediction = match mode {
        Mode::Classify => Prediction::Label(majority_label(&neighbors)?),
        Mode::Regress => Prediction::Value(mean_target(&neighbors)?),
    };

    debug!(
        k = k,
        metric = %metric,
        training_points = training.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "KNN prediction completed"
    );

    Ok(KnnPrediction {
        prediction,
        neighbors,
    })
}

/// The `k` nearest training points, closest first
fn nearest(
    training: &PointSet,
    query: &Point,
    k: usize,
    metric: DistanceMetric,
    mode: Mode,
) -> PredictResult<Vec<Neighbor>> {
    let mut ranked = Vec::with_capacity(training.len());

    for (index, point) in training.iter().enumerate() {
        let label = checked_label(point, index, mode)?;
        let distance = metric.distance(query, point)?;
        ranked.push((distance, index, label));
    }

    // sort_by is stable: equal distances stay in training order
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(ranked
        .into_iter()
        .take(k)
        .map(|(distance, index, label)| Neighbor {
            index,
            point: training.points()[index].coords.clone(),
            label: label.clone(),
            distance,
        })
        .collect())
}

fn checked_label(point: &Point, index: usize, mode: Mode) -> PredictResult<&Label> {
    let label = point.label.as_ref().ok_or_else(|| {
        PredictError::validation(format!("training point {} has no label", index + 1))
    })?;

    match (mode, label) {
        (Mode::Classify, Label::Category(_)) | (Mode::Regress, Label::Target(_)) => Ok(label),
        (Mode::Classify, Label::Target(_)) => Err(PredictError::validation(format!(
            "training point {} has a numeric target; classification needs category labels",
            index + 1
        ))),
        (Mode::Regress, Label::Category(_)) => Err(PredictError::validation(format!(
            "training point {} has a category label; regression needs numeric targets",
            index + 1
        ))),
    }
}

/// Most frequent label. Ties go to the label seen first in distance order.
fn majority_label(neighbors: &[Neighbor]) -> PredictResult<String> {
    // Kept in first-occurrence order so the tie-break is positional
    let mut tally: Vec<(&str, usize)> = Vec::new();

    for neighbor in neighbors {
        let name = neighbor
            .label
            .as_category()
            .ok_or_else(|| PredictError::validation("neighbor is missing a category label"))?;
        match tally.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => tally.push((name, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in tally {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }

    best.map(|(name, _)| name.to_string())
        .ok_or_else(|| PredictError::validation("no neighbors to vote"))
}

fn mean_target(neighbors: &[Neighbor]) -> PredictResult<f64> {
    if neighbors.is_empty() {
        return Err(PredictError::validation("no neighbors to average"));
    }

    let mut sum = 0.0;
    for neighbor in neighbors {
        sum += neighbor
            .label
            .as_target()
            .ok_or_else(|| PredictError::validation("neighbor is missing a numeric target"))?;
    }
    Ok(sum / neighbors.len() as f64)
}

/// Contract adapter for the KNN route group
#[derive(Debug, Clone, Default)]
pub struct KnnEngine {
    defaults: RequestDefaults,
}

impl KnnEngine {
    pub fn new(defaults: RequestDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }
}

impl PredictionEngine for KnnEngine {
    fn name(&self) -> &'static str {
        components::KNN
    }

    fn predict(&self, request: &PredictionRequest) -> PredictResult<PredictionResponse> {
        self.defaults.check_size(request)?;

        let params = self.defaults.resolve(request);
        let labels = match params.mode {
            Mode::Classify => LabelKind::Category,
            Mode::Regress => LabelKind::Target,
        };

        let training = PointSet::build(&request.points, labels)?;
        let query = Point::new(request.query.coordinates());
        let result = predict(&training, &query, params.k, params.metric, params.mode)?;

        Ok(PredictionResponse {
            prediction: result.prediction,
            neighbors: Some(result.neighbors),
            coefficients: None,
            r_squared: None,
        })
    }
}
