mod file_config;

pub use file_config::{FileConfig, ImageFileConfig, PlacardFileConfig};

use anyhow::Result;
use clap::ValueEnum;
use std::time::Duration;
use tracing::warn;

use crate::imagegen::{RetryPolicy, ServiceAccountKey};
use crate::server::RequestsLoggingLevel;
use crate::speech::SpeechDefaults;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
const DEFAULT_IMAGE_RETRY_BASE_SECS: u64 = 15;
const DEFAULT_PLACARD_RETRY_BASE_SECS: u64 = 10;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// CLI arguments that participate in config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// Comma-separated allowed CORS origins.
    pub cors_origins: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            logging_level: RequestsLoggingLevel::Path,
            cors_origins: None,
        }
    }
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub cors_origins: Vec<String>,
    pub image_retry: RetryPolicy,
    pub placard_retry: RetryPolicy,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| RequestsLoggingLevel::from_str(&s, true).ok())
            .unwrap_or_else(|| cli.logging_level.clone());

        let cors_origins = file.cors_origins.unwrap_or_else(|| {
            split_origins(cli.cors_origins.as_deref().unwrap_or(DEFAULT_CORS_ORIGINS))
        });

        let image_file = file.image.unwrap_or_default();
        let image_retry = RetryPolicy::new(
            image_file
                .retry_max_attempts
                .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS),
            Duration::from_secs(
                image_file
                    .retry_base_secs
                    .unwrap_or(DEFAULT_IMAGE_RETRY_BASE_SECS),
            ),
        );

        let placard_file = file.placard.unwrap_or_default();
        let placard_retry = RetryPolicy::new(
            placard_file
                .retry_max_attempts
                .unwrap_or(DEFAULT_RETRY_MAX_ATTEMPTS),
            Duration::from_secs(
                placard_file
                    .retry_base_secs
                    .unwrap_or(DEFAULT_PLACARD_RETRY_BASE_SECS),
            ),
        );

        Ok(Self {
            port,
            logging_level,
            cors_origins,
            image_retry,
            placard_retry,
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Credentials for one Vertex AI instance.
#[derive(Debug, Clone)]
pub struct VertexCredentials {
    pub project_id: String,
    pub location: String,
    pub key: ServiceAccountKey,
}

/// Provider credentials gathered from the environment. Every field is
/// optional; absence disables the corresponding backend instead of failing
/// startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub elevenlabs_api_key: Option<String>,
    pub speech_defaults: SpeechDefaults,
    pub anthropic_api_key: Option<String>,
    pub vertex_primary: Option<VertexCredentials>,
    pub vertex_secondary: Option<VertexCredentials>,
    pub gemini_keys: Vec<String>,
    pub github_token: Option<String>,
    pub cors_origins_env: Option<String>,
}

impl ProviderCredentials {
    pub fn from_env() -> Self {
        let defaults = SpeechDefaults::default();
        let speech_defaults = SpeechDefaults {
            voice_id: env_trimmed("ELEVENLABS_VOICE_ID").unwrap_or(defaults.voice_id),
            model_id: env_trimmed("ELEVENLABS_MODEL_ID").unwrap_or(defaults.model_id),
            output_format: env_trimmed("ELEVENLABS_OUTPUT_FORMAT").unwrap_or(defaults.output_format),
            streaming_latency: env_trimmed("ELEVENLABS_STREAMING_LATENCY")
                .unwrap_or(defaults.streaming_latency),
        };

        let gemini_keys = ["GEMINI_API_KEY", "GEMINI_API_KEY_2", "GEMINI_API_KEY_3"]
            .iter()
            .filter_map(|name| env_trimmed(name))
            .collect();

        Self {
            elevenlabs_api_key: env_trimmed("ELEVENLABS_API_KEY"),
            speech_defaults,
            anthropic_api_key: env_trimmed("ANTHROPIC_API_KEY"),
            vertex_primary: vertex_from_env(
                "GCP_PROJECT_ID",
                "GCP_LOCATION",
                "GOOGLE_APPLICATION_CREDENTIALS_JSON",
                "GOOGLE_APPLICATION_CREDENTIALS",
            ),
            vertex_secondary: vertex_from_env(
                "GCP_PROJECT_ID_2",
                "GCP_LOCATION_2",
                "GOOGLE_APPLICATION_CREDENTIALS_JSON_2",
                "GOOGLE_APPLICATION_CREDENTIALS_2",
            ),
            gemini_keys,
            github_token: env_trimmed("GITHUB_TOKEN"),
            cors_origins_env: env_trimmed("CORS_ORIGINS"),
        }
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load one Vertex instance's credentials: project id plus a service account
/// key from either an inline JSON env var or a key file path. Malformed
/// credentials are logged and treated as absent.
fn vertex_from_env(
    project_var: &str,
    location_var: &str,
    json_var: &str,
    path_var: &str,
) -> Option<VertexCredentials> {
    let project_id = env_trimmed(project_var)?;
    let location = env_trimmed(location_var).unwrap_or_else(|| "us-central1".to_string());

    let key_json = if let Some(inline) = env_trimmed(json_var) {
        inline
    } else {
        let path = env_trimmed(path_var)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path, error = %e, "Failed to read service account key file");
                return None;
            }
        }
    };

    match ServiceAccountKey::from_json(&key_json) {
        Ok(key) => Some(VertexCredentials {
            project_id,
            location,
            key,
        }),
        Err(e) => {
            warn!(project = %project_id, error = %e, "Ignoring malformed service account key");
            None
        }
    }
}
