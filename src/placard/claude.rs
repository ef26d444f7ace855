//! Anthropic messages API client for placard generation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::imagegen::RetryPolicy;

use super::{
    build_record, curator_instruction, strip_markdown_fences, CuratorReply, PlacardError,
    PlacardRecord, PlacardRequest,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-5-haiku-20241022";
const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Characters of an upstream error body quoted in diagnostics.
const ERROR_SNIPPET_CHARS: usize = 500;

/// Composes placard records by querying the Anthropic messages API.
pub struct PlacardComposer {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl PlacardComposer {
    pub fn new(api_key: String) -> Result<Self, PlacardError> {
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .map_err(|e| PlacardError::Connection(e.to_string()))?,
            retry: RetryPolicy::new(3, Duration::from_secs(10)),
        })
    }

    /// Point the composer at a different API host. Test hook.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the retry pacing. Test hook.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generate a placard for the given artwork context.
    ///
    /// Rate limits retry with linear backoff; an unparseable reply is retried
    /// within the same attempt budget and surfaced as terminal afterwards.
    /// Any other upstream status is terminal immediately.
    pub async fn compose(&self, request: &PlacardRequest) -> Result<PlacardRecord, PlacardError> {
        let instruction = curator_instruction(request);
        let url = format!("{}/v1/messages", self.base_url);

        let mut last_parse_error = None;

        for attempt in 1..=self.retry.max_attempts {
            debug!(attempt, max_attempts = self.retry.max_attempts, "Requesting placard");

            let body = MessagesRequest {
                model: MODEL,
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                messages: vec![Message {
                    role: "user",
                    content: &instruction,
                }],
            };

            let response = self
                .http
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await
                .map_err(|e| PlacardError::Connection(e.to_string()))?;

            let status = response.status();

            if status.as_u16() == 429 {
                if attempt < self.retry.max_attempts {
                    let wait = self.retry.backoff(attempt);
                    warn!(attempt, wait_secs = wait.as_secs_f64(), "Placard provider rate limited");
                    tokio::time::sleep(wait).await;
                    continue;
                }
                return Err(PlacardError::RetryLimitExceeded);
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message: String = text.chars().take(ERROR_SNIPPET_CHARS).collect();
                return Err(PlacardError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: MessagesResponse = response
                .json()
                .await
                .map_err(|e| PlacardError::Unparseable(e.to_string()))?;
            let text = parsed
                .content
                .first()
                .map(|block| block.text.as_str())
                .unwrap_or_default();

            let cleaned = strip_markdown_fences(text);
            match serde_json::from_str::<CuratorReply>(&cleaned) {
                Ok(reply) => return Ok(build_record(request, reply)),
                Err(e) => {
                    let snippet: String = cleaned.chars().take(ERROR_SNIPPET_CHARS).collect();
                    warn!(attempt, error = %e, reply = %snippet, "Placard reply was not valid JSON");
                    last_parse_error = Some(PlacardError::Unparseable(e.to_string()));
                }
            }
        }

        Err(last_parse_error.unwrap_or(PlacardError::RetryLimitExceeded))
    }
}
