//! Bundled sample requests
//!
//! Served by the `/knn/sample` and `/regression/sample` routes so a learner
//! can start from a working request and edit it.

use crate::contract::{PredictionRequest, Query};
use crate::distance::DistanceMetric;
use crate::models::Mode;
use crate::points::RawField;

fn row(coords: &[f64], label: RawField) -> Vec<RawField> {
    coords
        .iter()
        .copied()
        .map(RawField::Number)
        .chain(std::iter::once(label))
        .collect()
}

/// Two labeled clusters in the plane, one per animal
pub fn knn_sample() -> PredictionRequest {
    let cats = [[1.0, 1.2], [1.5, 0.8], [0.8, 1.6], [1.2, 1.9], [2.0, 1.1]];
    let dogs = [[5.5, 6.0], [6.1, 5.2], [4.9, 5.8], [6.4, 6.6], [5.2, 4.7]];

    let points = cats
        .iter()
        .map(|p| row(p, RawField::from("貓")))
        .chain(dogs.iter().map(|p| row(p, RawField::from("狗"))))
        .collect();

    PredictionRequest {
        mode: Some(Mode::Classify),
        points,
        query: Query::Vector(vec![2.5, 2.0]),
        k: Some(3),
        metric: Some(DistanceMetric::Euclidean),
        degree: None,
    }
}

/// Noisy samples of `y = 0.5x^2 - x + 2`
pub fn regression_sample() -> PredictionRequest {
    let samples = [
        (-3.0, 9.4),
        (-2.0, 6.1),
        (-1.0, 3.4),
        (0.0, 2.1),
        (1.0, 1.4),
        (2.0, 2.2),
        (3.0, 3.4),
        (4.0, 6.1),
    ];

    PredictionRequest {
        mode: Some(Mode::Regress),
        points: samples
            .iter()
            .map(|(x, y)| row(&[*x], RawField::Number(*y)))
            .collect(),
        query: Query::Scalar(5.0),
        k: None,
        metric: None,
        degree: Some(2),
    }
}
