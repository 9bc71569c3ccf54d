//! Server configuration

use anyhow::{Context, Result};
use predict_lib::{
    contract::{DEFAULT_MAX_DEGREE, DEFAULT_MAX_POINTS},
    DistanceMetric, RequestDefaults,
};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for prediction, health and metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Neighbor count when a request omits `k`
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Metric when a request omits `metric`
    #[serde(default)]
    pub default_metric: DistanceMetric,

    /// Polynomial degree when a request omits `degree`
    #[serde(default = "default_degree")]
    pub default_degree: usize,

    /// Largest number of training rows accepted per request
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Highest polynomial degree accepted per request
    #[serde(default = "default_max_degree")]
    pub max_degree: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_k() -> usize {
    3
}

fn default_degree() -> usize {
    1
}

fn default_max_points() -> usize {
    DEFAULT_MAX_POINTS
}

fn default_max_degree() -> usize {
    DEFAULT_MAX_DEGREE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_port: default_api_port(),
            default_k: default_k(),
            default_metric: DistanceMetric::default(),
            default_degree: default_degree(),
            max_points: default_max_points(),
            max_degree: default_max_degree(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `predict-server` file and
    /// `PREDICT_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("predict-server").required(false))
            .add_source(config::Environment::with_prefix("PREDICT"))
            .build()
            .context("Failed to read configuration")?;

        let loaded: ServerConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;

        if loaded.default_k == 0 {
            anyhow::bail!("default_k must be at least 1");
        }
        if loaded.default_degree > loaded.max_degree {
            anyhow::bail!(
                "default_degree {} exceeds max_degree {}",
                loaded.default_degree,
                loaded.max_degree
            );
        }
        Ok(loaded)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }

    /// Fallbacks handed to both engines
    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            k: self.default_k,
            metric: self.default_metric,
            degree: self.default_degree,
            max_points: self.max_points,
            max_degree: self.max_degree,
        }
    }
}
