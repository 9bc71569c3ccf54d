//! HTTP API: prediction route groups, index page, health and metrics

pub mod knn;
pub mod regression;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use predict_lib::{
    demo, predictor::JSON_CONTENT_TYPE, ComponentStatus, ErrorResponse, HealthRegistry, KnnEngine,
    PredictError, PredictionEngine, PredictionRequest, PredictorMetrics, RegressionEngine,
    RequestDefaults, ResponseFormatter, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Neighbors and Curves</title></head>
<body>
<h1>Neighbors and Curves</h1>
<h2>K-nearest neighbors</h2>
<ul>
<li><code>POST /knn/predict</code> classify or average from the k closest points</li>
<li><code>GET /knn/sample</code> a ready-made request to start from</li>
</ul>
<h2>Polynomial regression</h2>
<ul>
<li><code>POST /regression/predict</code> least-squares fit and prediction at x</li>
<li><code>GET /regression/sample</code> a ready-made request to start from</li>
</ul>
</body>
</html>
"#;

/// Shared application state
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: PredictorMetrics,
    pub logger: StructuredLogger,
    pub formatter: ResponseFormatter,
    pub knn: KnnEngine,
    pub regression: RegressionEngine,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: PredictorMetrics,
        logger: StructuredLogger,
        defaults: RequestDefaults,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            formatter: ResponseFormatter::new(),
            knn: KnnEngine::new(defaults),
            regression: RegressionEngine::new(defaults),
        }
    }

    /// Record both engines in the health registry
    pub async fn register_engines(&self) {
        self.health_registry.register(self.knn.name()).await;
        self.health_registry.register(self.regression.name()).await;
    }

    /// Run each engine on its bundled sample; a failure marks it unhealthy
    pub async fn self_check(&self) {
        check_engine(&self.health_registry, &self.knn, &demo::knn_sample()).await;
        check_engine(
            &self.health_registry,
            &self.regression,
            &demo::regression_sample(),
        )
        .await;
    }
}

async fn check_engine<E: PredictionEngine>(
    registry: &HealthRegistry,
    engine: &E,
    sample: &PredictionRequest,
) {
    match engine.predict(sample) {
        Ok(_) => registry.register(engine.name()).await,
        Err(e) => {
            error!(engine = engine.name(), error = %e, "Engine failed its self-check");
            registry
                .set_unhealthy(engine.name(), format!("self-check failed: {}", e))
                .await;
        }
    }
}

/// Serialize `value` through the shared formatter
pub(crate) fn json_response<T: Serialize>(
    formatter: &ResponseFormatter,
    status: StatusCode,
    value: &T,
) -> Response {
    match formatter.to_json(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run one request through `engine`, recording metrics and log events
pub(crate) fn run_engine<E: PredictionEngine>(
    state: &AppState,
    engine: &E,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Response {
    let name = engine.name();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = PredictError::validation(rejection.body_text());
            state.metrics.inc_errors(name, err.kind());
            state.logger.log_rejection(name, err.kind(), &err.to_string());
            return json_response(
                &state.formatter,
                StatusCode::BAD_REQUEST,
                &ErrorResponse::from(&err),
            );
        }
    };

    let start = Instant::now();
    let outcome = engine.predict(&request);
    let elapsed = start.elapsed();

    state.metrics.observe_latency(name, elapsed.as_secs_f64());
    state.metrics.observe_training_points(name, request.points.len());

    let status = match &outcome {
        Ok(response) => {
            state.metrics.inc_predictions(name);
            state.logger.log_prediction(
                name,
                request.points.len(),
                &response.prediction.to_string(),
                elapsed.as_micros() as u64,
            );
            StatusCode::OK
        }
        Err(err) => {
            state.metrics.inc_errors(name, err.kind());
            state.logger.log_rejection(name, err.kind(), &err.to_string());
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };

    match state.formatter.format(&outcome) {
        Ok(body) => (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize prediction");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Health check response - returns 200 unless an engine is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router with both prediction route groups mounted
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .merge(knn::routes())
        .merge(regression::routes())
        .with_state(state)
}

/// Start the API server
pub async fn serve(address: String, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %address, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
