use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::github::RepoExtractor;
use crate::imagegen::ImageDispatcher;
use crate::placard::PlacardComposer;
use crate::speech::SpeechClient;

use super::ServerConfig;

pub type SharedDispatcher = Arc<ImageDispatcher>;
pub type OptionalPlacardComposer = Option<Arc<PlacardComposer>>;
pub type OptionalSpeechClient = Option<Arc<SpeechClient>>;
pub type SharedExtractor = Arc<RepoExtractor>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub dispatcher: SharedDispatcher,
    pub placard: OptionalPlacardComposer,
    pub speech: OptionalSpeechClient,
    pub extractor: SharedExtractor,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for SharedDispatcher {
    fn from_ref(input: &ServerState) -> Self {
        input.dispatcher.clone()
    }
}

impl FromRef<ServerState> for OptionalPlacardComposer {
    fn from_ref(input: &ServerState) -> Self {
        input.placard.clone()
    }
}

impl FromRef<ServerState> for OptionalSpeechClient {
    fn from_ref(input: &ServerState) -> Self {
        input.speech.clone()
    }
}

impl FromRef<ServerState> for SharedExtractor {
    fn from_ref(input: &ServerState) -> Self {
        input.extractor.clone()
    }
}
