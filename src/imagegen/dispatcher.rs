//! Backend selection, retry and failover for image generation.
//!
//! The dispatcher walks its configured providers in priority order: the two
//! primary (Vertex) instances alternate via a rotating counter with the other
//! instance as first fallback, then the Gemini free-tier provider. A provider
//! is retried only on rate limiting; any other upstream error abandons it
//! immediately in favor of the next one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::prompt::PromptDocument;

use super::provider::{ImageGenError, ImageProvider};
use super::retry::RetryPolicy;

/// Terminal dispatch failures. Always structured: the caller gets the prompt
/// that was attempted and the last upstream error, never an opaque panic.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no image generation backends configured")]
    NoBackends,

    #[error("all image backends failed: {last_error}")]
    Exhausted {
        prompt: String,
        #[source]
        last_error: ImageGenError,
    },
}

pub struct ImageDispatcher {
    primaries: Vec<Arc<dyn ImageProvider>>,
    fallback: Option<Arc<dyn ImageProvider>>,
    retry: RetryPolicy,
    rotation: AtomicUsize,
}

impl ImageDispatcher {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            primaries: Vec::new(),
            fallback: None,
            retry,
            rotation: AtomicUsize::new(0),
        }
    }

    /// Add a primary (credentialed) provider. The first two participate in
    /// round-robin rotation.
    pub fn with_primary(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.primaries.push(provider);
        self
    }

    /// Set the rate-limited fallback provider, tried after every primary.
    pub fn with_fallback(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.fallback = Some(provider);
        self
    }

    pub fn backend_count(&self) -> usize {
        self.primaries.len() + usize::from(self.fallback.is_some())
    }

    /// Generate an image for the prompt, walking backends in priority order.
    pub async fn generate(&self, prompt: &PromptDocument) -> Result<String, DispatchError> {
        let order = self.provider_order();
        if order.is_empty() {
            return Err(DispatchError::NoBackends);
        }

        let mut last_error: Option<ImageGenError> = None;
        for provider in order {
            match self.try_provider(provider.as_ref(), &prompt.text).await {
                Ok(image) => return Ok(image),
                Err(e) => {
                    warn!(backend = provider.name(), error = %e, "Image backend failed, falling through");
                    last_error = Some(e);
                }
            }
        }

        Err(DispatchError::Exhausted {
            prompt: prompt.text.clone(),
            last_error: last_error.unwrap_or(ImageGenError::RateLimited),
        })
    }

    /// Priority order for this call: rotated primaries first, fallback last.
    fn provider_order(&self) -> Vec<Arc<dyn ImageProvider>> {
        let mut order: Vec<Arc<dyn ImageProvider>> = Vec::new();

        match self.primaries.len() {
            0 => {}
            1 => order.push(self.primaries[0].clone()),
            _ => {
                let first = self.rotation.fetch_add(1, Ordering::Relaxed) % 2;
                order.push(self.primaries[first].clone());
                order.push(self.primaries[1 - first].clone());
            }
        }

        if let Some(fallback) = &self.fallback {
            order.push(fallback.clone());
        }

        order
    }

    /// Run one provider through its retry budget. Only rate limiting retries;
    /// any other error abandons the provider at once.
    async fn try_provider(
        &self,
        provider: &dyn ImageProvider,
        prompt: &str,
    ) -> Result<String, ImageGenError> {
        for attempt in 1..=self.retry.max_attempts {
            info!(
                backend = provider.name(),
                attempt,
                max_attempts = self.retry.max_attempts,
                "Requesting image generation"
            );

            match provider.generate(prompt).await {
                Ok(image) => {
                    info!(backend = provider.name(), attempt, "Image generated");
                    return Ok(image);
                }
                Err(e) if e.is_rate_limit() && attempt < self.retry.max_attempts => {
                    let wait = self.retry.backoff(attempt);
                    warn!(
                        backend = provider.name(),
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(ImageGenError::RateLimited)
    }
}
