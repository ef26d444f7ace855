//! Test server lifecycle management.
//!
//! Each test gets an isolated server on an ephemeral port with exactly the
//! providers it configures, everything else disabled.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

use syntaxesia_server::github::{GitHubClient, RepoExtractor};
use syntaxesia_server::imagegen::{GeminiProvider, ImageDispatcher, ImageProvider, RetryPolicy};
use syntaxesia_server::placard::PlacardComposer;
use syntaxesia_server::server::state::ServerState;
use syntaxesia_server::server::{make_app, ServerConfig};
use syntaxesia_server::speech::{SpeechClient, SpeechDefaults};

/// Millisecond-scale retry pacing so rate-limit tests finish quickly.
pub fn test_retry_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5))
}

/// Builds a ServerState with mock-backed providers.
pub struct StateBuilder {
    dispatcher: ImageDispatcher,
    placard: Option<Arc<PlacardComposer>>,
    speech: Option<Arc<SpeechClient>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            dispatcher: ImageDispatcher::new(test_retry_policy()),
            placard: None,
            speech: None,
        }
    }

    /// Add a primary image backend speaking the imagen wire format at
    /// `base_url`.
    pub fn with_primary_imagen(mut self, base_url: &str) -> Self {
        let provider: Arc<dyn ImageProvider> = Arc::new(
            GeminiProvider::new(vec!["test-key".to_string()])
                .unwrap()
                .with_base_url(base_url),
        );
        self.dispatcher = self.dispatcher.with_primary(provider);
        self
    }

    /// Set the fallback image backend.
    pub fn with_fallback_imagen(mut self, base_url: &str) -> Self {
        let provider: Arc<dyn ImageProvider> = Arc::new(
            GeminiProvider::new(vec!["test-key".to_string()])
                .unwrap()
                .with_base_url(base_url),
        );
        self.dispatcher = self.dispatcher.with_fallback(provider);
        self
    }

    pub fn with_placard(mut self, base_url: &str) -> Self {
        self.placard = Some(Arc::new(
            PlacardComposer::new("test-key".to_string())
                .unwrap()
                .with_base_url(base_url)
                .with_retry(test_retry_policy()),
        ));
        self
    }

    pub fn with_speech(mut self, base_url: &str) -> Self {
        self.speech = Some(Arc::new(
            SpeechClient::new("test-key".to_string(), SpeechDefaults::default())
                .unwrap()
                .with_base_url(base_url),
        ));
        self
    }

    pub fn build(self, github_base_url: Option<&str>) -> ServerState {
        let extractor = match github_base_url {
            Some(base_url) => RepoExtractor::with_client(
                GitHubClient::new(None).unwrap().with_base_url(base_url),
            ),
            None => RepoExtractor::new(None).unwrap(),
        };

        ServerState {
            config: ServerConfig::default(),
            start_time: Instant::now(),
            hash: "test".to_string(),
            dispatcher: Arc::new(self.dispatcher),
            placard: self.placard,
            speech: self.speech,
            extractor: Arc::new(extractor),
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running server instance bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    pub async fn spawn(state: ServerState) -> Self {
        let app = make_app(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
        }
    }
}
