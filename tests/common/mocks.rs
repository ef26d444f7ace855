//! Mock upstream providers: tiny axum servers speaking just enough of each
//! provider's wire format.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Handle to a spawned mock provider.
pub struct MockUpstream {
    pub base_url: String,
    hits: Arc<AtomicU32>,
}

impl MockUpstream {
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

// ---------------------------------------------------------------------------
// Imagen (Gemini API wire format)
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum ImagenMode {
    /// Always succeed with a fixed base64 payload.
    Ok,
    /// Return 429 for the first N requests, then succeed.
    RateLimited(u32),
    /// Always fail with the given status.
    Error(u16),
}

/// Base64 payload returned by the imagen mock.
pub const MOCK_IMAGE_B64: &str = "aW1hZ2UtYnl0ZXM=";

#[derive(Clone)]
struct ImagenState {
    mode: ImagenMode,
    hits: Arc<AtomicU32>,
}

async fn imagen_predict(State(state): State<ImagenState>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    match &state.mode {
        ImagenMode::Ok => {
            Json(json!({ "predictions": [{ "bytesBase64Encoded": MOCK_IMAGE_B64 }] }))
                .into_response()
        }
        ImagenMode::RateLimited(n) if hit <= *n => {
            (StatusCode::TOO_MANY_REQUESTS, "quota exceeded").into_response()
        }
        ImagenMode::RateLimited(_) => {
            Json(json!({ "predictions": [{ "bytesBase64Encoded": MOCK_IMAGE_B64 }] }))
                .into_response()
        }
        ImagenMode::Error(status) => (
            StatusCode::from_u16(*status).unwrap(),
            "upstream exploded",
        )
            .into_response(),
    }
}

pub async fn spawn_imagen(mode: ImagenMode) -> MockUpstream {
    let hits = Arc::new(AtomicU32::new(0));
    let state = ImagenState {
        mode,
        hits: hits.clone(),
    };
    let router = Router::new()
        .route(
            "/v1beta/models/imagen-4.0-generate-001:predict",
            post(imagen_predict),
        )
        .with_state(state);
    let base_url = spawn_router(router).await;
    MockUpstream { base_url, hits }
}

// ---------------------------------------------------------------------------
// Anthropic messages API
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum AnthropicMode {
    /// Reply with the given assistant text.
    Reply(String),
    /// Always fail with the given status.
    Error(u16),
    /// 429 on every request.
    RateLimitedForever,
}

#[derive(Clone)]
struct AnthropicState {
    mode: AnthropicMode,
    hits: Arc<AtomicU32>,
}

async fn anthropic_messages(State(state): State<AnthropicState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    match &state.mode {
        AnthropicMode::Reply(text) => Json(json!({
            "content": [{ "type": "text", "text": text }],
            "stop_reason": "end_turn",
        }))
        .into_response(),
        AnthropicMode::Error(status) => (
            StatusCode::from_u16(*status).unwrap(),
            "provider rejected the request",
        )
            .into_response(),
        AnthropicMode::RateLimitedForever => {
            (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response()
        }
    }
}

pub async fn spawn_anthropic(mode: AnthropicMode) -> MockUpstream {
    let hits = Arc::new(AtomicU32::new(0));
    let state = AnthropicState {
        mode,
        hits: hits.clone(),
    };
    let router = Router::new()
        .route("/v1/messages", post(anthropic_messages))
        .with_state(state);
    let base_url = spawn_router(router).await;
    MockUpstream { base_url, hits }
}

// ---------------------------------------------------------------------------
// ElevenLabs streaming TTS
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum ElevenLabsMode {
    /// Stream the fixed audio payload.
    Ok,
    /// Always fail with the given status.
    Error(u16),
}

/// Bytes returned by the elevenlabs mock.
pub const MOCK_AUDIO: &[u8] = b"ID3-fake-mpeg-audio-bytes";

#[derive(Clone)]
struct ElevenLabsState {
    mode: ElevenLabsMode,
    hits: Arc<AtomicU32>,
}

async fn elevenlabs_stream(
    State(state): State<ElevenLabsState>,
    Path(_voice_id): Path<String>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    match &state.mode {
        ElevenLabsMode::Ok => (
            [("content-type", "audio/mpeg")],
            MOCK_AUDIO.to_vec(),
        )
            .into_response(),
        ElevenLabsMode::Error(status) => (
            StatusCode::from_u16(*status).unwrap(),
            "voice not available",
        )
            .into_response(),
    }
}

pub async fn spawn_elevenlabs(mode: ElevenLabsMode) -> MockUpstream {
    let hits = Arc::new(AtomicU32::new(0));
    let state = ElevenLabsState {
        mode,
        hits: hits.clone(),
    };
    let router = Router::new()
        .route(
            "/v1/text-to-speech/{voice_id}/stream",
            post(elevenlabs_stream),
        )
        .with_state(state);
    let base_url = spawn_router(router).await;
    MockUpstream { base_url, hits }
}

// ---------------------------------------------------------------------------
// GitHub REST API
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct GitHubState {
    base_url: String,
    hits: Arc<AtomicU32>,
}

async fn github_repo(State(state): State<GitHubState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "name": "hello-world",
        "full_name": "octocat/hello-world",
        "description": "A demo repository",
        "language": "Rust",
        "stargazers_count": 42,
        "forks_count": 7,
        "topics": ["demo"],
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
    }))
    .into_response()
}

async fn github_languages(State(state): State<GitHubState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "Rust": 3000, "TOML": 1000 })).into_response()
}

async fn github_tree(
    State(state): State<GitHubState>,
    Path((_owner, _repo, branch)): Path<(String, String, String)>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if branch != "main" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "tree": [
            { "path": "src", "type": "tree" },
            { "path": "src/main.rs", "type": "blob", "size": 2048 },
            { "path": "Cargo.toml", "type": "blob", "size": 256 },
            { "path": "README.md", "type": "blob", "size": 512 },
        ]
    }))
    .into_response()
}

async fn github_readme(State(state): State<GitHubState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "download_url": format!("{}/raw/README.md", state.base_url) })).into_response()
}

async fn github_contents(
    State(state): State<GitHubState>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "download_url": format!("{}/raw/{}", state.base_url, path) })).into_response()
}

async fn github_raw(Path(path): Path<String>) -> Response {
    let content = match path.as_str() {
        "README.md" => "# Hello World\nA CLI tool for terminals.\n\n- Prints friendly greetings\n",
        "Cargo.toml" => "[package]\nname = \"hello-world\"\n\n[dependencies]\nrocket = \"0.5\"\n",
        "src/main.rs" => "fn main() {\n    println!(\"hello\");\n}\n",
        _ => "",
    };
    content.to_string().into_response()
}

/// Spawn a mock GitHub API with one repository, `octocat/hello-world`.
pub async fn spawn_github() -> MockUpstream {
    let hits = Arc::new(AtomicU32::new(0));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let state = GitHubState {
        base_url: base_url.clone(),
        hits: hits.clone(),
    };
    let router = Router::new()
        .route("/repos/{owner}/{repo}", get(github_repo))
        .route("/repos/{owner}/{repo}/languages", get(github_languages))
        .route("/repos/{owner}/{repo}/git/trees/{branch}", get(github_tree))
        .route("/repos/{owner}/{repo}/readme", get(github_readme))
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(github_contents),
        )
        .route("/raw/{*path}", get(github_raw))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockUpstream { base_url, hits }
}
