//! Text-to-speech passthrough against the ElevenLabs streaming API.
//!
//! The upstream body is forwarded chunk by chunk, so consumer backpressure
//! reaches the provider connection and an early disconnect drops it.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
/// Per-read timeout; a whole-request timeout would cut long audio streams.
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Missing ELEVENLABS_API_KEY")]
    NotConfigured,

    #[error("Missing voice_id")]
    MissingVoice,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("speech API error (status {status}): {detail}")]
    Upstream { status: u16, detail: String },
}

/// Voice defaults resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct SpeechDefaults {
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub streaming_latency: String,
}

impl Default for SpeechDefaults {
    fn default() -> Self {
        Self {
            voice_id: "Xb7hH8MSUJpSbSDYk0k2".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            streaming_latency: "2".to_string(),
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.35,
            similarity_boost: 0.7,
            style: 0.2,
            use_speaker_boost: true,
        }
    }
}

pub struct SpeechClient {
    api_key: String,
    defaults: SpeechDefaults,
    base_url: String,
    http: reqwest::Client,
}

impl SpeechClient {
    pub fn new(api_key: String, defaults: SpeechDefaults) -> Result<Self, SpeechError> {
        Ok(Self {
            api_key,
            defaults,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::builder()
                .read_timeout(READ_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .map_err(|e| SpeechError::Connection(e.to_string()))?,
        })
    }

    /// Point the client at a different API host. Test hook.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Start a streaming synthesis request and return the open upstream
    /// response; its body is the audio stream.
    ///
    /// Upstream error statuses are read fully and propagated with their body
    /// as detail; on success no body bytes are buffered here. Dropping the
    /// returned response closes the upstream connection.
    pub async fn stream(
        &self,
        text: &str,
        voice_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<reqwest::Response, SpeechError> {
        let voice = voice_id
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(self.defaults.voice_id.as_str());
        if voice.is_empty() {
            return Err(SpeechError::MissingVoice);
        }
        let model = model_id
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.defaults.model_id.as_str());

        let url = format!("{}/v1/text-to-speech/{}/stream", self.base_url, voice);

        debug!(voice, model, chars = text.len(), "Starting speech synthesis stream");

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .query(&[
                ("output_format", self.defaults.output_format.as_str()),
                (
                    "optimize_streaming_latency",
                    self.defaults.streaming_latency.as_str(),
                ),
            ])
            .json(&SpeechRequest {
                text,
                model_id: model,
                voice_settings: VoiceSettings::default(),
            })
            .send()
            .await
            .map_err(|e| SpeechError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = if detail.is_empty() {
                "speech provider error".to_string()
            } else {
                detail
            };
            return Err(SpeechError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_voice() {
        let defaults = SpeechDefaults::default();
        assert_eq!(defaults.model_id, "eleven_multilingual_v2");
        assert_eq!(defaults.output_format, "mp3_44100_128");
    }

    #[test]
    fn voice_settings_serialize_fixed_tuning() {
        let json = serde_json::to_value(VoiceSettings::default()).unwrap();
        assert_eq!(json["similarity_boost"], 0.7);
        assert_eq!(json["use_speaker_boost"], true);
    }
}
