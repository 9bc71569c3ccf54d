//! Polynomial regression route group

use super::{json_response, run_engine, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use predict_lib::{demo, PredictionRequest};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/regression/predict", post(predict))
        .route("/regression/sample", get(sample))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Response {
    run_engine(&state, &state.regression, payload)
}

async fn sample(State(state): State<Arc<AppState>>) -> Response {
    json_response(&state.formatter, StatusCode::OK, &demo::regression_sample())
}
