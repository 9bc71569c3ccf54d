//! Core data models for the prediction engines

use crate::distance::DistanceMetric;
use crate::error::PredictError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Label attached to a training point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    /// Regression target
    Target(f64),
    /// Classification category
    Category(String),
}

impl Label {
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Label::Category(name) => Some(name),
            Label::Target(_) => None,
        }
    }

    pub fn as_target(&self) -> Option<f64> {
        match self {
            Label::Target(value) => Some(*value),
            Label::Category(_) => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Target(value) => write!(f, "{}", value),
            Label::Category(name) => f.write_str(name),
        }
    }
}

/// A sample point: coordinates plus an optional label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub coords: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

impl Point {
    /// Unlabeled point, typically a query
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords, label: None }
    }

    pub fn labeled(coords: Vec<f64>, label: Label) -> Self {
        Self {
            coords,
            label: Some(label),
        }
    }

    pub fn dimension(&self) -> usize {
        self.coords.len()
    }
}

/// Result value of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Label(String),
    Value(f64),
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prediction::Label(name) => f.write_str(name),
            Prediction::Value(value) => write!(f, "{}", value),
        }
    }
}

/// What a KNN prediction produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Majority label among the neighbors
    #[default]
    Classify,
    /// Mean target of the neighbors
    Regress,
}

impl FromStr for Mode {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classify" => Ok(Mode::Classify),
            "regress" => Ok(Mode::Regress),
            other => Err(PredictError::validation(format!(
                "unknown mode '{}', expected 'classify' or 'regress'",
                other
            ))),
        }
    }
}

/// Per-request model configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Neighbor count
    pub k: usize,
    pub metric: DistanceMetric,
    /// Polynomial order for the regression engine
    pub degree: usize,
    pub mode: Mode,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            k: 3,
            metric: DistanceMetric::Euclidean,
            degree: 1,
            mode: Mode::Classify,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_untagged_roundtrip() {
        let labels: Vec<Label> = serde_json::from_str(r#"[2.5, "B"]"#).unwrap();
        assert_eq!(labels[0], Label::Target(2.5));
        assert_eq!(labels[1], Label::Category("B".to_string()));
    }

    #[test]
    fn test_numeric_string_stays_category() {
        let label: Label = serde_json::from_str(r#""5""#).unwrap();
        assert_eq!(label.as_category(), Some("5"));
        assert_eq!(label.as_target(), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Regress".parse::<Mode>().unwrap(), Mode::Regress);
        assert!("cluster".parse::<Mode>().is_err());
    }

    #[test]
    fn test_prediction_serializes_bare() {
        assert_eq!(
            serde_json::to_string(&Prediction::Label("A".into())).unwrap(),
            r#""A""#
        );
        assert_eq!(serde_json::to_string(&Prediction::Value(5.0)).unwrap(), "5.0");
    }
}
