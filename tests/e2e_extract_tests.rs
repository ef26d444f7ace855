//! End-to-end tests for /api/extract against a mock GitHub API.

mod common;

use common::{spawn_github, StateBuilder, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn extract_returns_full_bundle() {
    let github = spawn_github().await;
    let state = StateBuilder::new().build(Some(&github.base_url));
    let server = TestServer::spawn(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/extract", server.base_url))
        .json(&json!({ "github_url": "https://github.com/octocat/hello-world" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["metadata"]["name"], "hello-world");
    assert_eq!(data["metadata"]["stars"], 42);
    assert_eq!(data["summary"]["total_files"], 3);
    assert_eq!(data["summary"]["total_directories"], 1);
    assert_eq!(data["languages"]["percentages"]["Rust"], 75.0);

    // Rocket shows up from the fetched Cargo.toml key file
    let frameworks = data["analysis"]["frameworks"].as_array().unwrap();
    assert!(frameworks.iter().any(|f| f == "Rocket"));

    // main.rs scores as an important entry point with a snippet attached
    let important = &data["analysis"]["important_files"];
    assert!(important.get("src/main.rs").is_some());
    assert!(important["src/main.rs"]["snippet"]
        .as_str()
        .unwrap()
        .contains("fn main"));
}

#[tokio::test]
async fn extract_reads_readme_insights() {
    let github = spawn_github().await;
    let state = StateBuilder::new().build(Some(&github.base_url));
    let server = TestServer::spawn(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/extract", server.base_url))
        .json(&json!({ "github_url": "https://github.com/octocat/hello-world" }))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    let insights = &body["data"]["analysis"]["readme_insights"];
    assert_eq!(insights["project_type"], "cli_tool");
}

#[tokio::test]
async fn extract_rejects_invalid_url() {
    let github = spawn_github().await;
    let state = StateBuilder::new().build(Some(&github.base_url));
    let server = TestServer::spawn(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/extract", server.base_url))
        .json(&json!({ "github_url": "git@github.com:octocat/hello.git" }))
        .send()
        .await
        .unwrap();

    // the endpoint only accepts https URLs even though the parser is laxer
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(github.hits(), 0);
}
