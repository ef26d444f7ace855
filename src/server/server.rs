use anyhow::Result;
use std::time::{Duration, Instant};

use tracing::info;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowHeaders, CorsLayer};

use crate::analysis::{clip_snippet, extract, CodeMetrics};
use crate::placard::PlacardRequest;
use crate::prompt::{compose, PromptDocument};
use crate::speech::SpeechError;

use super::error::ApiError;
use super::state::*;
use super::{log_requests, ServerConfig};

const MAX_TTS_TEXT_CHARS: usize = 5000;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub image_backends: usize,
    pub placard_enabled: bool,
    pub speech_enabled: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        image_backends: state.dispatcher.backend_count(),
        placard_enabled: state.placard.is_some(),
        speech_enabled: state.speech.is_some(),
    };
    Json(stats)
}

#[derive(Deserialize, Debug)]
struct GenerateBody {
    pub code: Option<String>,
    pub language: Option<String>,
    /// Direct image prompt, bypassing analysis and composition.
    pub prompt: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    image_data_url: String,
    prompt_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<CodeMetrics>,
}

async fn generate_art(
    State(state): State<ServerState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let (prompt, metrics) = if let Some(direct) =
        body.prompt.as_deref().filter(|p| !p.trim().is_empty())
    {
        info!(chars = direct.len(), "Using provided prompt");
        (PromptDocument::raw(direct), None)
    } else if let Some(code) = body.code.as_deref().filter(|c| !c.trim().is_empty()) {
        let snippet = clip_snippet(code);
        let metrics = extract(snippet, body.language.as_deref());
        info!(
            chars = snippet.len(),
            language = %metrics.language,
            "Analyzing code snippet"
        );

        let document = compose(&metrics);
        info!(chars = document.text.len(), "Prompt composed, dispatching");
        (document, Some(metrics))
    } else {
        return Err(ApiError::Validation(
            "Either 'code' or 'prompt' must be provided".to_string(),
        ));
    };

    let b64 = state.dispatcher.generate(&prompt).await?;

    info!("Image generated successfully");
    Ok(Json(GenerateResponse {
        image_data_url: format!("data:image/png;base64,{}", b64),
        prompt_used: prompt.text,
        metrics,
    }))
}

async fn generate_placard(
    State(placard): State<OptionalPlacardComposer>,
    Json(body): Json<PlacardRequest>,
) -> Result<Response, ApiError> {
    if body.imagen_prompt.trim().is_empty() || body.code_snippet.trim().is_empty() {
        return Err(ApiError::Validation(
            "imagen_prompt and code_snippet must be non-empty".to_string(),
        ));
    }

    let composer = placard.ok_or_else(|| {
        ApiError::Configuration("Anthropic API key not configured".to_string())
    })?;

    info!(file = %body.file_path, "Generating placard");
    let record = composer.compose(&body).await?;
    info!(file = %body.file_path, "Placard generated");

    Ok(Json(record).into_response())
}

#[derive(Deserialize, Debug)]
struct TtsQuery {
    pub text: String,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TtsBody {
    pub text: String,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
}

async fn stream_speech(
    speech: OptionalSpeechClient,
    text: &str,
    voice_id: Option<&str>,
    model_id: Option<&str>,
) -> Result<Response, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::Validation("Missing text".to_string()));
    }
    if text.chars().count() > MAX_TTS_TEXT_CHARS {
        return Err(ApiError::Validation(format!(
            "text exceeds {} characters",
            MAX_TTS_TEXT_CHARS
        )));
    }

    let client = speech.ok_or(SpeechError::NotConfigured)?;
    let upstream = client.stream(text, voice_id, model_id).await?;

    // Forward the body as a stream so consumer backpressure reaches the
    // provider; dropping the response on disconnect closes the upstream.
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap())
}

async fn tts_get(
    State(speech): State<OptionalSpeechClient>,
    Query(query): Query<TtsQuery>,
) -> Result<Response, ApiError> {
    stream_speech(
        speech,
        &query.text,
        query.voice_id.as_deref(),
        query.model_id.as_deref(),
    )
    .await
}

async fn tts_post(
    State(speech): State<OptionalSpeechClient>,
    Json(body): Json<TtsBody>,
) -> Result<Response, ApiError> {
    stream_speech(
        speech,
        &body.text,
        body.voice_id.as_deref(),
        body.model_id.as_deref(),
    )
    .await
}

#[derive(Deserialize, Debug)]
struct ExtractBody {
    pub github_url: String,
}

async fn extract_repo(
    State(extractor): State<SharedExtractor>,
    Json(body): Json<ExtractBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let github_url = body.github_url.trim();

    if !github_url.starts_with("https://github.com/") {
        return Err(ApiError::Validation(
            "Invalid GitHub URL format. Must start with 'https://github.com/'".to_string(),
        ));
    }

    info!(url = github_url, "Extracting repository");
    let bundle = extractor.extract(github_url).await?;
    info!(
        files = bundle.analysis.important_files.len(),
        "Extraction complete"
    );

    Ok(Json(json!({ "success": true, "data": bundle })))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router = Router::new()
        .route("/generate", post(generate_art))
        .route("/placard", post(generate_placard))
        .route("/tts", get(tts_get).post(tts_post))
        .route("/extract", post(extract_repo))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/api", api_routes);

    if !state.config.cors_origins.is_empty() {
        app = app.layer(cors_layer(&state.config.cors_origins));
    }

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    dispatcher: SharedDispatcher,
    placard: OptionalPlacardComposer,
    speech: OptionalSpeechClient,
    extractor: SharedExtractor,
) -> Result<()> {
    let port = config.port;
    let state = ServerState {
        config,
        start_time: Instant::now(),
        hash: env!("GIT_HASH").to_string(),
        dispatcher,
        placard,
        speech,
        extractor,
    };
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
