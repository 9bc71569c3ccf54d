//! Observability for the prediction service
//!
//! Provides:
//! - Prometheus metrics (latency, request counts, rejections by kind, input size)
//! - Structured JSON logging with tracing

use crate::error::ErrorKind;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Latency buckets in seconds; engines run in micro- to milliseconds
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

const POINT_COUNT_BUCKETS: &[f64] = &[1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    training_points: HistogramVec,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram_vec!(
                "predict_server_prediction_latency_seconds",
                "Time spent inside a prediction engine",
                &["engine"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "predict_server_predictions_total",
                "Predictions served successfully",
                &["engine"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "predict_server_prediction_errors_total",
                "Prediction requests rejected, by error kind",
                &["engine", "kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            training_points: register_histogram_vec!(
                "predict_server_training_points",
                "Number of training rows per request",
                &["engine"],
                POINT_COUNT_BUCKETS.to_vec()
            )
            .expect("Failed to register training_points"),
        }
    }
}

/// Handle to the process-wide prediction metrics.
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_latency(&self, engine: &str, duration_secs: f64) {
        self.inner()
            .prediction_latency_seconds
            .with_label_values(&[engine])
            .observe(duration_secs);
    }

    pub fn observe_training_points(&self, engine: &str, count: usize) {
        self.inner()
            .training_points
            .with_label_values(&[engine])
            .observe(count as f64);
    }

    pub fn inc_predictions(&self, engine: &str) {
        self.inner()
            .predictions_total
            .with_label_values(&[engine])
            .inc();
    }

    pub fn inc_errors(&self, engine: &str, kind: ErrorKind) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[engine, kind.as_str()])
            .inc();
    }

    pub fn predictions(&self, engine: &str) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[engine])
            .get()
    }

    pub fn errors(&self, engine: &str, kind: ErrorKind) -> u64 {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[engine, kind.as_str()])
            .get()
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_prediction(
        &self,
        engine: &str,
        training_points: usize,
        prediction: &str,
        elapsed_us: u64,
    ) {
        info!(
            event = "prediction_served",
            service = %self.service,
            engine = %engine,
            training_points = training_points,
            prediction = %prediction,
            elapsed_us = elapsed_us,
            "Prediction served"
        );
    }

    pub fn log_rejection(&self, engine: &str, kind: ErrorKind, message: &str) {
        warn!(
            event = "prediction_rejected",
            service = %self.service,
            engine = %engine,
            error_kind = %kind,
            message = %message,
            "Prediction request rejected"
        );
    }

    pub fn log_startup(&self, version: &str, address: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            address = %address,
            "Prediction service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Prediction service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        // Prometheus registry is process-global; use a label no other test touches
        let metrics = PredictorMetrics::new();
        let before = metrics.predictions("observability-test");
        metrics.inc_predictions("observability-test");
        metrics.inc_predictions("observability-test");
        assert_eq!(metrics.predictions("observability-test"), before + 2);

        metrics.inc_errors("observability-test", ErrorKind::SingularFit);
        assert_eq!(
            metrics.errors("observability-test", ErrorKind::SingularFit),
            1
        );
    }

    #[test]
    fn test_handles_share_collectors() {
        let first = PredictorMetrics::new();
        let second = first.clone();
        first.observe_latency("shared-test", 0.0001);
        first.observe_training_points("shared-test", 12);
        second.inc_predictions("shared-test");
        assert_eq!(PredictorMetrics::new().predictions("shared-test"), 1);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("predict-server");
        assert_eq!(logger.service, "predict-server");
    }
}
