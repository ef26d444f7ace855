//! Gemini API Imagen provider (free-tier keys, aggressively rate limited).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use super::provider::{ImageGenError, ImageProvider};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const IMAGEN_MODEL: &str = "imagen-4.0-generate-001";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini API provider rotating across one or more free-tier keys.
///
/// The rotation counter is best-effort under concurrency; exact fairness is
/// not required.
pub struct GeminiProvider {
    keys: Vec<String>,
    key_index: AtomicUsize,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(keys: Vec<String>) -> Result<Self, ImageGenError> {
        if keys.is_empty() {
            return Err(ImageGenError::Auth(
                "at least one Gemini API key is required".to_string(),
            ));
        }
        Ok(Self {
            keys,
            key_index: AtomicUsize::new(0),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .map_err(|e| ImageGenError::Connection(e.to_string()))?,
        })
    }

    /// Point the provider at a different API host. Test hook.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn next_key(&self) -> (&str, usize) {
        let index = self.key_index.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        (&self.keys[index], index)
    }
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
impl ImageProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError> {
        let (key, key_index) = self.next_key();
        let url = format!("{}/v1beta/models/{}:predict", self.base_url, IMAGEN_MODEL);

        let request = PredictRequest {
            instances: vec![PromptInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1",
            },
        };

        debug!(key_index, "Sending Gemini Imagen predict request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
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
