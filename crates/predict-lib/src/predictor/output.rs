//! Response serialization at the transport boundary
//!
//! Bodies are UTF-8 JSON with non-ASCII characters written verbatim, so a
//! label such as `"貓"` reaches the page as typed rather than as `\u8c93`.
//! Both the server and the CLI go through [`ResponseFormatter`].

use crate::contract::{ErrorResponse, PredictionResponse};
use crate::error::PredictResult;
use serde::Serialize;

/// Content type for every JSON body produced here
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Configuration for output formatting
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Indent bodies for human readers
    pub pretty: bool,
}

/// Serializes responses and errors with one consistent policy
#[derive(Debug, Clone, Default)]
pub struct ResponseFormatter {
    config: OutputConfig,
}

impl ResponseFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn pretty() -> Self {
        Self::with_config(OutputConfig { pretty: true })
    }

    /// Serialize any contract value
    pub fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        // serde_json never escapes non-ASCII; keep it that way
        if self.config.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    /// Serialize the outcome of an engine call, success or failure
    pub fn format(&self, outcome: &PredictResult<PredictionResponse>) -> serde_json::Result<String> {
        match outcome {
            Ok(response) => self.to_json(response),
            Err(err) => self.to_json(&ErrorResponse::from(err)),
        }
    }
}
