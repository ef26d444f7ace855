//! Image provider trait definition.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when calling a text-to-image provider.
#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ImageGenError {
    /// Rate limiting is the only condition worth retrying on the same
    /// provider; everything else falls through to the next backend.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ImageGenError::RateLimited)
    }
}

/// Trait for text-to-image providers.
///
/// Implementations make exactly one upstream request per call; retry and
/// failover policy live in the dispatcher.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short label used in logs and failure diagnostics (e.g. "vertex-1").
    fn name(&self) -> &str;

    /// Generate one image for the prompt, returned as base64-encoded bytes.
    async fn generate(&self, prompt: &str) -> Result<String, ImageGenError>;
}
