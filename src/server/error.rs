//! HTTP-facing error taxonomy.
//!
//! Maps component failures onto responses: caller mistakes become 400s,
//! missing credentials and exhausted backends become 500s with diagnostic
//! detail, and speech upstream statuses pass through unchanged. Secrets never
//! appear in any variant.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::github::ExtractError;
use crate::imagegen::DispatchError;
use crate::placard::PlacardError;
use crate::speech::SpeechError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed caller input. Surfaced immediately as 400, never retried.
    #[error("{0}")]
    Validation(String),

    /// A required credential is missing. Fails with a clear 500 at first use.
    #[error("{0}")]
    Configuration(String),

    /// Every configured image backend failed. Carries the attempted prompt
    /// for caller-side diagnostics.
    #[error("Image generation failed")]
    GenerationFailed { prompt: String, detail: String },

    /// An upstream provider rejected the request; its status passes through.
    #[error("upstream error (status {status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": detail }))).into_response()
            }
            ApiError::Configuration(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": detail })),
            )
                .into_response(),
            ApiError::GenerationFailed { prompt, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Image generation failed",
                    "prompt_used": prompt,
                    "details": detail,
                })),
            )
                .into_response(),
            ApiError::Upstream { status, detail } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(json!({ "error": detail }))).into_response()
            }
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": detail })),
            )
                .into_response(),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoBackends => {
                ApiError::Configuration("No image generation credentials configured".to_string())
            }
            DispatchError::Exhausted { prompt, last_error } => ApiError::GenerationFailed {
                prompt,
                detail: last_error.to_string(),
            },
        }
    }
}

impl From<PlacardError> for ApiError {
    fn from(err: PlacardError) -> Self {
        match err {
            PlacardError::NotConfigured => {
                ApiError::Configuration("Anthropic API key not configured".to_string())
            }
            other => ApiError::Internal(format!("Placard generation failed: {}", other)),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::NotConfigured => {
                ApiError::Configuration("Missing ELEVENLABS_API_KEY".to_string())
            }
            SpeechError::MissingVoice => ApiError::Validation("Missing voice_id".to_string()),
            SpeechError::Upstream { status, detail } => ApiError::Upstream { status, detail },
            SpeechError::Connection(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidUrl => ApiError::Validation("Invalid GitHub URL".to_string()),
            other => ApiError::Internal(format!("Extraction failed: {}", other)),
        }
    }
}
