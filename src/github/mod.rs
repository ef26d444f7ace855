//! GitHub repository extraction: REST plumbing plus heuristic scoring of
//! what the repository contains.

mod analysis;
mod client;

pub use analysis::{
    analyze_complexity, analyze_readme, detect_code_smells, detect_frameworks,
    score_important_files, CodeSmell, ComplexityReport, ReadmeInsights, ScoredFile, SmellReport,
};
pub use client::{
    parse_github_url, ExtractError, GitHubClient, RepoMetadata, TreeEntry, KEY_FILE_PATTERNS,
};

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Lines of each important file included in the bundle.
const SNIPPET_LINE_LIMIT: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct LanguageBreakdown {
    pub breakdown: HashMap<String, u64>,
    pub percentages: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepoSummary {
    pub total_files: usize,
    pub total_directories: usize,
    pub main_language: String,
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportantFile {
    pub snippet: String,
    pub lines: usize,
    pub size: u64,
    pub importance_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepoAnalysis {
    pub complexity: ComplexityReport,
    pub frameworks: Vec<String>,
    pub readme_insights: ReadmeInsights,
    pub code_smells: SmellReport,
    pub important_files: HashMap<String, ImportantFile>,
}

/// Everything extracted from one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepoBundle {
    pub metadata: RepoMetadata,
    pub languages: LanguageBreakdown,
    pub file_tree: Vec<TreeEntry>,
    pub readme: String,
    pub key_files: HashMap<String, String>,
    pub summary: RepoSummary,
    pub analysis: RepoAnalysis,
}

/// Orchestrates the sequential extraction pipeline for one repository.
pub struct RepoExtractor {
    client: GitHubClient,
}

impl RepoExtractor {
    pub fn new(token: Option<String>) -> Result<Self, ExtractError> {
        Ok(Self {
            client: GitHubClient::new(token)?,
        })
    }

    pub fn with_client(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Pull metadata, tree, README, key files and derived analysis for the
    /// repository at `github_url`.
    pub async fn extract(&self, github_url: &str) -> Result<RepoBundle, ExtractError> {
        let (owner, repo) = parse_github_url(github_url)?;
        info!(owner, repo, "Extracting repository");

        let metadata = self.client.repo_metadata(&owner, &repo).await?;
        let languages = self.client.languages(&owner, &repo).await?;
        let tree = self.client.file_tree(&owner, &repo, "main").await;
        let readme = self.client.readme(&owner, &repo).await;
        let key_files = self.client.key_files(&owner, &repo, &tree).await;

        let total_bytes: u64 = languages.values().sum();
        let percentages = if total_bytes > 0 {
            languages
                .iter()
                .map(|(lang, bytes)| {
                    let pct = (*bytes as f64 / total_bytes as f64) * 10_000.0;
                    (lang.clone(), pct.round() / 100.0)
                })
                .collect()
        } else {
            HashMap::new()
        };

        let complexity = analyze_complexity(&tree);
        let frameworks = detect_frameworks(&key_files);
        let readme_insights = analyze_readme(&readme);
        let code_smells = detect_code_smells(&metadata, &complexity);

        let mut important_files = HashMap::new();
        let scored = score_important_files(&tree, &key_files);
        info!(count = scored.len(), "Extracting important files");
        for file in scored {
            let content = match key_files.get(&file.path) {
                Some(content) => content.clone(),
                None => self.client.file_content(&owner, &repo, &file.path).await,
            };
            if content.is_empty() {
                continue;
            }
            let lines: Vec<&str> = content.split('\n').collect();
            let snippet = lines
                .iter()
                .take(SNIPPET_LINE_LIMIT)
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            important_files.insert(
                file.path,
                ImportantFile {
                    snippet,
                    lines: lines.len(),
                    size: file.size,
                    importance_score: file.score,
                },
            );
        }

        let file_types: Vec<String> = tree
            .iter()
            .filter(|e| e.path.contains('.'))
            .filter_map(|e| e.path.rsplit('.').next())
            .map(|ext| ext.to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let summary = RepoSummary {
            total_files: tree.iter().filter(|e| e.entry_type == "blob").count(),
            total_directories: tree.iter().filter(|e| e.entry_type == "tree").count(),
            main_language: metadata.language.clone(),
            file_types,
        };

        Ok(RepoBundle {
            metadata,
            languages: LanguageBreakdown {
                breakdown: languages,
                percentages,
            },
            file_tree: tree,
            readme,
            key_files,
            summary,
            analysis: RepoAnalysis {
                complexity,
                frameworks,
                readme_insights,
                code_smells,
                important_files,
            },
        })
    }
}
