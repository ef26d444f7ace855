//! Shared e2e test infrastructure.
//!
//! Each test spawns the real server on an ephemeral port, wired to mock
//! upstream providers that are themselves small axum servers.
#![allow(dead_code)]

pub mod mocks;
pub mod server;

#[allow(unused_imports)]
pub use mocks::{
    spawn_anthropic, spawn_elevenlabs, spawn_github, spawn_imagen, AnthropicMode, ElevenLabsMode,
    ImagenMode, MockUpstream,
};
#[allow(unused_imports)]
pub use server::{test_retry_policy, StateBuilder, TestServer};
