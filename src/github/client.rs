//! HTTP client for the GitHub REST API.
//!
//! Sequential requests only; an optional personal access token raises the
//! rate limit but is never required.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("syntaxesia-server/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Files fetched eagerly because they identify the stack.
pub const KEY_FILE_PATTERNS: &[&str] = &[
    "package.json",
    "requirements.txt",
    "setup.py",
    "Cargo.toml",
    "main.py",
    "index.js",
    "index.ts",
    "app.py",
    "main.go",
    "docker-compose.yml",
    "Dockerfile",
];

lazy_static! {
    static ref GITHUB_URL_RE: Regex = Regex::new(r"github\.com[:/]([^/]+)/([^/.]+)").unwrap();
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid GitHub URL")]
    InvalidUrl,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Basic repository metadata.
#[derive(Debug, Clone, Serialize)]
pub struct RepoMetadata {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub forks: u64,
    pub topics: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One entry of the repository file tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub size: u64,
}

#[derive(Deserialize)]
struct ApiRepo {
    name: String,
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Deserialize)]
struct ApiTree {
    #[serde(default)]
    tree: Vec<ApiTreeEntry>,
}

#[derive(Deserialize)]
struct ApiTreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct ApiContent {
    #[serde(default)]
    download_url: Option<String>,
}

/// Extract owner and repository name from a GitHub URL. Accepts both
/// `https://github.com/owner/repo` and `git@github.com:owner/repo.git`.
pub fn parse_github_url(url: &str) -> Result<(String, String), ExtractError> {
    let caps = GITHUB_URL_RE.captures(url).ok_or(ExtractError::InvalidUrl)?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self, ExtractError> {
        Ok(Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| ExtractError::Connection(e.to_string()))?,
            base_url: DEFAULT_API_BASE.to_string(),
            token,
        })
    }

    /// Point the client at a different API host. Test hook.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("token {}", token));
        }
        builder
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ExtractError> {
        debug!(url, "Querying GitHub API");
        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| ExtractError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(300).collect();
            return Err(ExtractError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ExtractError::Parse(e.to_string()))
    }

    /// Fetch basic repository metadata.
    pub async fn repo_metadata(&self, owner: &str, repo: &str) -> Result<RepoMetadata, ExtractError> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        let api: ApiRepo = self.get_json(&url).await?;
        Ok(RepoMetadata {
            name: api.name,
            full_name: api.full_name,
            description: api.description.unwrap_or_default(),
            language: api.language.unwrap_or_default(),
            stars: api.stargazers_count,
            forks: api.forks_count,
            topics: api.topics,
            created_at: api.created_at.unwrap_or_default(),
            updated_at: api.updated_at.unwrap_or_default(),
        })
    }

    /// Fetch the language breakdown (bytes of code per language).
    pub async fn languages(&self, owner: &str, repo: &str) -> Result<HashMap<String, u64>, ExtractError> {
        let url = format!("{}/repos/{}/{}/languages", self.base_url, owner, repo);
        self.get_json(&url).await
    }

    /// Fetch the recursive file tree, trying the requested branch then the
    /// usual default branch names. An unreadable tree yields an empty list.
    pub async fn file_tree(&self, owner: &str, repo: &str, branch: &str) -> Vec<TreeEntry> {
        for branch_name in [branch, "master", "main"] {
            let url = format!(
                "{}/repos/{}/{}/git/trees/{}?recursive=1",
                self.base_url, owner, repo, branch_name
            );
            if let Ok(api) = self.get_json::<ApiTree>(&url).await {
                return api
                    .tree
                    .into_iter()
                    .map(|e| TreeEntry {
                        path: e.path,
                        entry_type: e.entry_type,
                        size: e.size,
                    })
                    .collect();
            }
        }
        Vec::new()
    }

    /// Fetch the README content, or an empty string when none is readable.
    pub async fn readme(&self, owner: &str, repo: &str) -> String {
        let url = format!("{}/repos/{}/{}/readme", self.base_url, owner, repo);
        match self.get_json::<ApiContent>(&url).await {
            Ok(content) => match content.download_url {
                Some(raw_url) => self.fetch_raw(&raw_url).await.unwrap_or_default(),
                None => String::new(),
            },
            Err(_) => String::new(),
        }
    }

    /// Fetch one file's content, or an empty string when unreadable.
    pub async fn file_content(&self, owner: &str, repo: &str, path: &str) -> String {
        let url = format!("{}/repos/{}/{}/contents/{}", self.base_url, owner, repo, path);
        match self.get_json::<ApiContent>(&url).await {
            Ok(content) => match content.download_url {
                Some(raw_url) => self.fetch_raw(&raw_url).await.unwrap_or_default(),
                None => String::new(),
            },
            Err(_) => String::new(),
        }
    }

    /// Fetch the content of every key file present in the tree.
    pub async fn key_files(
        &self,
        owner: &str,
        repo: &str,
        tree: &[TreeEntry],
    ) -> HashMap<String, String> {
        let mut key_files = HashMap::new();
        for entry in tree {
            if entry.entry_type != "blob" {
                continue;
            }
            let filename = entry.path.rsplit('/').next().unwrap_or(&entry.path);
            if KEY_FILE_PATTERNS.contains(&filename) || KEY_FILE_PATTERNS.contains(&entry.path.as_str())
            {
                let content = self.file_content(owner, repo, &entry.path).await;
                if !content.is_empty() {
                    key_files.insert(entry.path.clone(), content);
                }
            }
        }
        key_files
    }

    async fn fetch_raw(&self, url: &str) -> Option<String> {
        let response = self.request(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }
}
