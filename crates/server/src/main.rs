//! Prediction server - KNN and polynomial regression demonstrations
//!
//! Serves both engines over HTTP alongside health and metrics endpoints.

use anyhow::Result;
use predict_lib::{HealthRegistry, PredictorMetrics, StructuredLogger};
use predict_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting predict-server");

    let config = ServerConfig::load()?;
    let address = config.address();
    info!(
        address = %address,
        default_k = config.default_k,
        default_metric = %config.default_metric,
        default_degree = config.default_degree,
        "Server configured"
    );

    let health_registry = HealthRegistry::new();
    let metrics = PredictorMetrics::new();
    let logger = StructuredLogger::new("predict-server");

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        logger.clone(),
        config.request_defaults(),
    ));
    app_state.register_engines().await;
    app_state.self_check().await;

    health_registry.set_ready(true).await;
    logger.log_startup(SERVER_VERSION, &address);

    let server = tokio::spawn(api::serve(address, app_state));

    tokio::select! {
        result = server => {
            match result {
                Ok(Ok(())) => info!("API server stopped"),
                Ok(Err(e)) => {
                    error!(error = %e, "API server failed");
                    return Err(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
