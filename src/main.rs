use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use syntaxesia_server::config::{AppConfig, CliConfig, FileConfig, ProviderCredentials};
use syntaxesia_server::github::RepoExtractor;
use syntaxesia_server::imagegen::{GeminiProvider, ImageDispatcher, ImageProvider, VertexProvider};
use syntaxesia_server::placard::PlacardComposer;
use syntaxesia_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use syntaxesia_server::speech::SpeechClient;

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Comma-separated allowed CORS origins. Falls back to the CORS_ORIGINS
    /// environment variable, then to the local dev frontend.
    #[clap(long)]
    pub cors_origins: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let credentials = ProviderCredentials::from_env();

    let cli_config = CliConfig {
        port: cli_args.port,
        logging_level: cli_args.logging_level.clone(),
        cors_origins: cli_args
            .cors_origins
            .clone()
            .or_else(|| credentials.cors_origins_env.clone()),
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  port: {}", app_config.port);
    info!("  cors_origins: {:?}", app_config.cors_origins);

    // Image backends: up to two Vertex instances, then Gemini free-tier keys
    let mut dispatcher = ImageDispatcher::new(app_config.image_retry.clone());

    for (label, creds) in [
        ("vertex-1", &credentials.vertex_primary),
        ("vertex-2", &credentials.vertex_secondary),
    ] {
        if let Some(creds) = creds {
            match VertexProvider::new(label, &creds.project_id, &creds.location, creds.key.clone())
            {
                Ok(provider) => {
                    info!("{} configured (project {})", label, creds.project_id);
                    dispatcher = dispatcher.with_primary(Arc::new(provider));
                }
                Err(e) => warn!("Failed to configure {}: {}", label, e),
            }
        }
    }

    if !credentials.gemini_keys.is_empty() {
        match GeminiProvider::new(credentials.gemini_keys.clone()) {
            Ok(provider) => {
                info!(
                    "Gemini fallback configured ({} key(s))",
                    credentials.gemini_keys.len()
                );
                let provider: Arc<dyn ImageProvider> = Arc::new(provider);
                dispatcher = dispatcher.with_fallback(provider);
            }
            Err(e) => warn!("Failed to configure Gemini fallback: {}", e),
        }
    }

    if dispatcher.backend_count() == 0 {
        warn!("No image generation credentials found; /api/generate will fail until configured");
    }

    // Placard composer requires an Anthropic key
    let placard = match credentials.anthropic_api_key {
        Some(key) => {
            info!("Placard composer configured");
            Some(Arc::new(
                PlacardComposer::new(key)?.with_retry(app_config.placard_retry.clone()),
            ))
        }
        None => {
            warn!("ANTHROPIC_API_KEY missing; /api/placard disabled");
            None
        }
    };

    // Speech proxy requires an ElevenLabs key
    let speech = match credentials.elevenlabs_api_key {
        Some(key) => {
            info!("Speech proxy configured");
            Some(Arc::new(SpeechClient::new(
                key,
                credentials.speech_defaults.clone(),
            )?))
        }
        None => {
            warn!("ELEVENLABS_API_KEY missing; /api/tts disabled");
            None
        }
    };

    let extractor = Arc::new(RepoExtractor::new(credentials.github_token.clone())?);
    if credentials.github_token.is_none() {
        info!("No GITHUB_TOKEN; extraction limited to 60 requests/hour");
    }

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        cors_origins: app_config.cors_origins.clone(),
    };

    info!("Ready to serve at port {}!", app_config.port);

    tokio::select! {
        result = run_server(server_config, Arc::new(dispatcher), placard, speech, extractor) => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            Ok(())
        }
    }
}
