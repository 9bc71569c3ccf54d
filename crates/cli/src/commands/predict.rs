//! Prediction and sample commands
//!
//! Requests are built from the same comma/semicolon row syntax the web form
//! accepts. With `--offline` the engines run in-process; otherwise the
//! request goes to the server.

use anyhow::Result;
use predict_lib::{
    demo, parse_coordinates, parse_rows, DistanceMetric, KnnEngine, Mode, PredictionEngine,
    PredictionRequest, PredictionResponse, Query, RegressionEngine,
};

use crate::client::ApiClient;
use crate::output::{print_json, print_prediction, OutputFormat};

/// Which engine a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineKind {
    Knn,
    Regression,
}

impl EngineKind {
    fn path(self, action: &str) -> String {
        match self {
            EngineKind::Knn => format!("knn/{}", action),
            EngineKind::Regression => format!("regression/{}", action),
        }
    }
}

/// Where predictions are computed
pub enum Backend {
    Remote(ApiClient),
    Offline,
}

impl Backend {
    async fn predict(
        &self,
        engine: EngineKind,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse> {
        match self {
            Backend::Remote(client) => client.post(&engine.path("predict"), request).await,
            Backend::Offline => {
                let response = match engine {
                    EngineKind::Knn => KnnEngine::default().predict(request)?,
                    EngineKind::Regression => RegressionEngine::default().predict(request)?,
                };
                Ok(response)
            }
        }
    }

    async fn sample(&self, engine: EngineKind) -> Result<PredictionRequest> {
        match self {
            Backend::Remote(client) => client.get(&engine.path("sample")).await,
            Backend::Offline => Ok(match engine {
                EngineKind::Knn => demo::knn_sample(),
                EngineKind::Regression => demo::regression_sample(),
            }),
        }
    }
}

/// Build a KNN request from row text such as `"0,0,A;0,1,A;5,5,B"`
pub fn knn_request(
    points: &str,
    query: &str,
    k: Option<usize>,
    metric: Option<DistanceMetric>,
    mode: Option<Mode>,
) -> Result<PredictionRequest> {
    Ok(PredictionRequest {
        mode,
        points: parse_rows(points),
        query: Query::Vector(parse_coordinates(query)?),
        k,
        metric,
        degree: None,
    })
}

/// Build a regression request from `x,y` row text
pub fn regression_request(points: &str, x: f64, degree: Option<usize>) -> PredictionRequest {
    PredictionRequest {
        mode: Some(Mode::Regress),
        points: parse_rows(points),
        query: Query::Scalar(x),
        k: None,
        metric: None,
        degree,
    }
}

pub async fn run_knn(
    backend: &Backend,
    request: PredictionRequest,
    format: OutputFormat,
) -> Result<()> {
    let response = backend.predict(EngineKind::Knn, &request).await?;
    print_prediction(&response, format)
}

pub async fn run_regression(
    backend: &Backend,
    request: PredictionRequest,
    format: OutputFormat,
) -> Result<()> {
    let response = backend.predict(EngineKind::Regression, &request).await?;
    print_prediction(&response, format)
}

/// Print a ready-made request for `engine`
pub async fn show_sample(backend: &Backend, engine: EngineKind) -> Result<()> {
    let sample = backend.sample(engine).await?;
    print_json(&sample)
}
