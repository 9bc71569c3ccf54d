//! API client for the prediction server

use anyhow::{Context, Result};
use predict_lib::{ErrorKind, ErrorResponse};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use url::Url;

/// Non-success answer from the server
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server understood the request and an engine rejected it
    #[error("{kind}: {message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("API error ({status}): {body}")]
    Http { status: u16, body: String },
}

/// HTTP client for the prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_accepting(path, None).await
    }

    /// Make a GET request whose body is also meaningful under `accepted`,
    /// such as `/healthz` answering 503 with a health report
    pub async fn get_accepting<T: DeserializeOwned>(
        &self,
        path: &str,
        accepted: Option<StatusCode>,
    ) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        decode(response, accepted).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        decode(response, None).await
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    accepted: Option<StatusCode>,
) -> Result<T> {
    let status = response.status();
    if status.is_success() || Some(status) == accepted {
        return response.json().await.context("Failed to parse response");
    }

    let body = response.text().await.unwrap_or_default();
    let err = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(rejection) => ApiError::Rejected {
            kind: rejection.error_kind,
            message: rejection.message,
        },
        Err(_) => ApiError::Http {
            status: status.as_u16(),
            body,
        },
    };

    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use predict_lib::{demo, ComponentStatus, HealthResponse, Prediction, PredictionResponse};

    #[tokio::test]
    async fn test_post_decodes_prediction() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/knn/predict")
            .with_status(200)
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"prediction":"貓","neighbors":[]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let response: PredictionResponse = client
            .post("knn/predict", &demo::knn_sample())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.prediction, Prediction::Label("貓".to_string()));
    }

    #[tokio::test]
    async fn test_rejection_keeps_error_kind() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/regression/predict")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error_kind":"singular_fit","message":"singular fit: rank 1"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .post::<PredictionResponse, _>("regression/predict", &demo::regression_sample())
            .await
            .unwrap_err();

        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Rejected { kind, .. }) => assert_eq!(*kind, ErrorKind::SingularFit),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.get::<serde_json::Value>("healthz").await.unwrap_err();

        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Http { status, body }) => {
                assert_eq!(*status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accepted_status_body_is_decoded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"unhealthy","components":{"regression":{"status":"unhealthy","message":"self-check failed","last_check_timestamp":0}}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health: HealthResponse = client
            .get_accepting("healthz", Some(StatusCode::SERVICE_UNAVAILABLE))
            .await
            .unwrap();

        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert!(health.components.contains_key("regression"));

        let err = client.get::<HealthResponse>("healthz").await.unwrap_err();
        assert!(err.downcast_ref::<ApiError>().is_some());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
