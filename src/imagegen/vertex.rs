//! Vertex AI Imagen provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::auth::{AccessTokenProvider, ServiceAccountKey};
use super::provider::{ImageGenError, ImageProvider};

const IMAGEN_MODEL: &str = "imagen-3.0-generate-002";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One credentialed Vertex AI instance. Two of these are typically configured
/// and the dispatcher round-robins between them.
pub struct VertexProvider {
    label: String,
    endpoint: String,
    tokens: AccessTokenProvider,
    http: reqwest::Client,
}

impl VertexProvider {
    pub fn new(
        label: impl Into<String>,
        project_id: &str,
        location: &str,
        key: ServiceAccountKey,
    ) -> Result<Self, ImageGenError> {
        let endpoint = predict_endpoint(project_id, location);
        Ok(Self {
            label: label.into(),
            endpoint,
            tokens: AccessTokenProvider::new(key)?,
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .map_err(|e| ImageGenError::Connection(e.to_string()))?,
        })
    }

    /// Point the provider at a different predict endpoint. Test hook.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn predict_endpoint(project_id: &str, location: &str) -> String {
    format!(
        "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{IMAGEN_MODEL}:predict"
    )
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PromptInstance<'a>>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PromptInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

#[async_trait]
impl ImageProvider for VertexProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError> {
        let token = self.tokens.access_token().await?;

        let request = PredictRequest {
            instances: vec![PromptInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1",
            },
        };

        debug!(provider = %self.label, "Sending Imagen predict request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImageGenError::Connection(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ImageGenError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageGenError::Api {
                status: status.as_u16(),
                message: super::body_snippet(&body),
            });
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| ImageGenError::InvalidResponse(e.to_string()))?;

        parsed
            .predictions
            .into_iter()
            .next()
            .and_then(|p| p.bytes_base64_encoded)
            .ok_or_else(|| ImageGenError::InvalidResponse("response carried no image".to_string()))
    }
}
