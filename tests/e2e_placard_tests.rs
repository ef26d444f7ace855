//! End-to-end tests for /api/placard: provider reply parsing, fence
//! stripping, defaults and failure surfacing.

mod common;

use common::{spawn_anthropic, AnthropicMode, StateBuilder, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn placard_body() -> Value {
    json!({
        "imagen_prompt": "a dense abstract surface",
        "code_snippet": "fn main() { println!(\"hi\"); }",
        "file_path": "src/bin/main.rs",
        "language": "rust",
        "repo_name": "hello-world",
        "username": "octocat",
        "year": "2023",
    })
}

fn curator_reply() -> String {
    json!({
        "aestheticCategory": "Clean / Structured / Modular",
        "artistMatch": "Anni Albers",
        "artistDescription": "Anni Albers was a textile artist working in structured grids.",
        "placardDescription": "A measured surface.\n\nEvoking the structural qualities of Albers.",
    })
    .to_string()
}

async fn post_placard(server: &TestServer, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/api/placard", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn placard_parses_plain_json_reply() {
    let anthropic = spawn_anthropic(AnthropicMode::Reply(curator_reply())).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let response = post_placard(&server, placard_body()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "main.rs");
    assert_eq!(body["filename"], "main.rs");
    assert_eq!(body["artist"], "Code by @octocat");
    assert_eq!(body["medium"], "rust, 2023");
    assert_eq!(body["year"], "2023");
    assert_eq!(body["artistMatch"], "Anni Albers");
    assert_eq!(body["aestheticCategory"], "Clean / Structured / Modular");
    assert_eq!(anthropic.hits(), 1);
}

#[tokio::test]
async fn placard_parses_fenced_json_reply_identically() {
    let fenced = format!("```json\n{}\n```", curator_reply());
    let anthropic = spawn_anthropic(AnthropicMode::Reply(fenced)).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let response = post_placard(&server, placard_body()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["artistMatch"], "Anni Albers");
    assert_eq!(
        body["description"],
        "A measured surface.\n\nEvoking the structural qualities of Albers."
    );
}

#[tokio::test]
async fn placard_defaults_missing_reply_fields() {
    let partial = json!({ "artistMatch": "Tracey Emin" }).to_string();
    let anthropic = spawn_anthropic(AnthropicMode::Reply(partial)).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let response = post_placard(&server, placard_body()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["artistMatch"], "Tracey Emin");
    assert_eq!(body["description"], "");
    assert_eq!(body["aestheticCategory"], "");
}

#[tokio::test]
async fn placard_surfaces_provider_rejection() {
    let anthropic = spawn_anthropic(AnthropicMode::Error(400)).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let response = post_placard(&server, placard_body()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("400"));
    // rejected immediately, no retry
    assert_eq!(anthropic.hits(), 1);
}

#[tokio::test]
async fn placard_retries_rate_limit_up_to_budget() {
    let anthropic = spawn_anthropic(AnthropicMode::RateLimitedForever).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let response = post_placard(&server, placard_body()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(anthropic.hits(), 3);
}

#[tokio::test]
async fn placard_unparseable_reply_is_terminal_after_budget() {
    let anthropic = spawn_anthropic(AnthropicMode::Reply("not json at all".to_string())).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let response = post_placard(&server, placard_body()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(anthropic.hits(), 3);
}

#[tokio::test]
async fn placard_rejects_empty_inputs() {
    let anthropic = spawn_anthropic(AnthropicMode::Reply(curator_reply())).await;
    let state = StateBuilder::new().with_placard(&anthropic.base_url).build(None);
    let server = TestServer::spawn(state).await;

    let mut body = placard_body();
    body["imagen_prompt"] = json!("");
    let response = post_placard(&server, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(anthropic.hits(), 0);
}
