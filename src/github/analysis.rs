//! Heuristic scoring of repository contents: complexity, frameworks, README
//! insights, important files and code smells. Pure functions over data the
//! client already fetched.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::client::{RepoMetadata, TreeEntry};

/// Rough chars-per-line figure used to estimate lines of code from bytes.
const ESTIMATED_CHARS_PER_LINE: u64 = 50;
const IMPORTANT_FILE_LIMIT: usize = 15;
const FEATURE_LIMIT: usize = 5;
const KEY_TERM_LIMIT: usize = 10;
const TECH_KEYWORD_LIMIT: usize = 15;

const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "rs", "go", "java", "c", "cpp", "h", "hpp", "cs", "rb",
    "php", "swift", "kt", "scala", "sh", "toml", "yaml", "yml", "json", "xml", "sql", "md",
];

const IMPORTANT_NAMES: &[&str] = &[
    "main", "index", "app", "server", "client", "config", "settings", "__init__", "mod", "lib",
    "core", "utils", "helper",
];

const BOOSTED_EXTENSIONS: &[&str] = &["rs", "py", "js", "ts", "go"];

lazy_static! {
    static ref CAMEL_TERM_RE: Regex = Regex::new(r"\b[A-Z][a-z]+(?:[A-Z][a-z]+)*\b").unwrap();
}

#[derive(Debug, Clone, Serialize)]
pub struct LargeFile {
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplexityReport {
    pub largest_files: Vec<LargeFile>,
    pub average_file_size_bytes: f64,
    pub total_size_bytes: u64,
    pub estimated_lines_of_code: u64,
    pub max_directory_depth: usize,
    pub deepest_file_path: String,
    pub total_files: usize,
}

/// Size and nesting statistics over the file tree.
pub fn analyze_complexity(tree: &[TreeEntry]) -> ComplexityReport {
    let files: Vec<&TreeEntry> = tree.iter().filter(|e| e.entry_type == "blob").collect();

    let mut sorted: Vec<&&TreeEntry> = files.iter().collect();
    sorted.sort_by(|a, b| b.size.cmp(&a.size));
    let largest_files = sorted
        .iter()
        .take(5)
        .map(|f| LargeFile {
            path: f.path.clone(),
            size: f.size,
        })
        .collect();

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    let average = if files.is_empty() {
        0.0
    } else {
        let raw = total_size as f64 / files.len() as f64;
        (raw * 100.0).round() / 100.0
    };

    let mut max_depth = 0usize;
    let mut deepest_path = String::new();
    for f in &files {
        let depth = f.path.matches('/').count();
        if depth > max_depth {
            max_depth = depth;
            deepest_path = f.path.clone();
        }
    }

    ComplexityReport {
        largest_files,
        average_file_size_bytes: average,
        total_size_bytes: total_size,
        estimated_lines_of_code: total_size / ESTIMATED_CHARS_PER_LINE,
        max_directory_depth: max_depth,
        deepest_file_path: deepest_path,
        total_files: files.len(),
    }
}

/// Detect frameworks from dependency manifests.
pub fn detect_frameworks(key_files: &HashMap<String, String>) -> Vec<String> {
    let mut frameworks = Vec::new();

    if let Some(content) = key_files.get("package.json") {
        let content = content.to_lowercase();
        for (needle, name) in [
            ("react", "React"),
            ("vue", "Vue"),
            ("angular", "Angular"),
            ("express", "Express"),
            ("next", "Next.js"),
            ("svelte", "Svelte"),
        ] {
            if content.contains(needle) {
                frameworks.push(name.to_string());
            }
        }
    }

    if let Some(content) = key_files.get("requirements.txt") {
        let content = content.to_lowercase();
        for (needle, name) in [
            ("django", "Django"),
            ("flask", "Flask"),
            ("fastapi", "FastAPI"),
            ("tensorflow", "TensorFlow"),
            ("pytorch", "PyTorch"),
        ] {
            if content.contains(needle) {
                frameworks.push(name.to_string());
            }
        }
    }

    if let Some(content) = key_files.get("Cargo.toml") {
        let content = content.to_lowercase();
        for (needle, name) in [("actix", "Actix"), ("rocket", "Rocket")] {
            if content.contains(needle) {
                frameworks.push(name.to_string());
            }
        }
    }

    if key_files.contains_key("Dockerfile") || key_files.contains_key("docker-compose.yml") {
        frameworks.push("Docker".to_string());
    }

    frameworks
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadmeInsights {
    pub project_type: String,
    pub tech_keywords: Vec<String>,
    pub features: Vec<String>,
    pub key_terms: Vec<String>,
}

/// Extract project type, tech keywords, feature bullets and key terms from
/// the README.
pub fn analyze_readme(readme: &str) -> ReadmeInsights {
    if readme.is_empty() {
        return ReadmeInsights {
            project_type: "unknown".to_string(),
            tech_keywords: vec![],
            features: vec![],
            key_terms: vec![],
        };
    }

    let lower = readme.to_lowercase();

    let type_rules: &[(&[&str], &str)] = &[
        (&["web app", "web application", "dashboard", "frontend"], "web_application"),
        (&["cli tool", "command line", "terminal"], "cli_tool"),
        (&["api", "rest", "graphql", "endpoint"], "api_service"),
        (&["operating system", "kernel", "os"], "operating_system"),
        (&["framework", "library", "package"], "library"),
        (&["database", "storage", "data store"], "database"),
        (&["machine learning", "ml", "ai", "neural network"], "ml_ai"),
        (&["game", "engine", "graphics"], "game_engine"),
    ];
    let project_type = type_rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| "library".to_string());

    let tech_terms = [
        "kubernetes", "docker", "microservices", "serverless", "cloud",
        "react", "vue", "angular", "node", "typescript", "javascript",
        "python", "rust", "go", "java", "c++", "c#",
        "async", "concurrent", "parallel", "distributed",
        "security", "encryption", "authentication", "oauth",
        "api", "rest", "graphql", "grpc",
        "database", "sql", "nosql", "redis", "postgres", "mongodb",
        "machine learning", "neural network", "deep learning",
        "blockchain", "smart contract", "web3",
        "real-time", "streaming", "websocket",
        "testing", "ci/cd", "devops",
    ];
    let tech_keywords: Vec<String> = tech_terms
        .iter()
        .filter(|t| lower.contains(*t))
        .take(TECH_KEYWORD_LIMIT)
        .map(|t| t.to_string())
        .collect();

    let features: Vec<String> = readme
        .lines()
        .take(100)
        .filter_map(|line| {
            let stripped = line.trim();
            let bullet = stripped.starts_with('-')
                || stripped.starts_with('*')
                || stripped.starts_with('•')
                || stripped.starts_with('✓')
                || stripped.starts_with('✔');
            if !bullet || stripped.chars().count() <= 5 {
                return None;
            }
            let mut chars = stripped.chars();
            chars.next();
            let feature = chars.as_str().trim().to_string();
            let len = feature.chars().count();
            if len > 10 && len < 100 {
                Some(feature)
            } else {
                None
            }
        })
        .take(FEATURE_LIMIT)
        .collect();

    let common_words: HashSet<&str> = [
        "The", "This", "That", "These", "Those", "There", "Here", "What", "When", "Where",
        "Why", "How", "Who", "Which",
    ]
    .into_iter()
    .collect();
    let mut seen = HashSet::new();
    let mut key_terms = Vec::new();
    for m in CAMEL_TERM_RE.find_iter(readme) {
        let term = m.as_str();
        if term.len() <= 3 || common_words.contains(term) {
            continue;
        }
        let folded = term.to_lowercase();
        if seen.insert(folded) {
            key_terms.push(term.to_string());
            if key_terms.len() >= KEY_TERM_LIMIT {
                break;
            }
        }
    }

    ReadmeInsights {
        project_type,
        tech_keywords,
        features,
        key_terms,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredFile {
    pub path: String,
    pub size: u64,
    pub score: f64,
}

/// Score tree entries for importance and return the top candidates, best
/// first. Content fetching is left to the caller.
pub fn score_important_files(
    tree: &[TreeEntry],
    key_files: &HashMap<String, String>,
) -> Vec<ScoredFile> {
    let mut scored: Vec<ScoredFile> = tree
        .iter()
        .filter(|e| e.entry_type == "blob")
        .filter_map(|entry| {
            // very large files are likely binaries, very small ones are noise
            if entry.size > 500_000 || entry.size < 10 {
                return None;
            }

            let extension = entry.path.rsplit('.').next().unwrap_or("").to_lowercase();
            if entry.path.rfind('.').is_none() || !CODE_EXTENSIONS.contains(&extension.as_str()) {
                return None;
            }

            let mut score = (entry.size as f64 / 1000.0).min(100.0);

            let depth = entry.path.matches('/').count();
            score += (50.0 - depth as f64 * 10.0).max(0.0);

            let filename = entry.path.rsplit('/').next().unwrap_or("").to_lowercase();
            let stem = filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(&filename);
            if IMPORTANT_NAMES.iter().any(|n| stem.contains(n)) {
                score += 100.0;
            }

            if key_files.contains_key(&entry.path) {
                score += 150.0;
            }

            if BOOSTED_EXTENSIONS.contains(&extension.as_str()) {
                score += 20.0;
            }

            Some(ScoredFile {
                path: entry.path.clone(),
                size: entry.size,
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(IMPORTANT_FILE_LIMIT);
    scored
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeSmell {
    #[serde(rename = "type")]
    pub smell_type: String,
    pub description: String,
    pub severity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmellReport {
    pub smells: Vec<CodeSmell>,
    pub smell_count: usize,
    pub has_issues: bool,
}

/// Detect repository-level smells worth a satirical placard remark.
pub fn detect_code_smells(metadata: &RepoMetadata, complexity: &ComplexityReport) -> SmellReport {
    let mut smells = Vec::new();

    if let Ok(updated) = DateTime::parse_from_rfc3339(&metadata.updated_at) {
        let days = (Utc::now() - updated.with_timezone(&Utc)).num_days();
        if days > 365 {
            smells.push(CodeSmell {
                smell_type: "stale_repo".to_string(),
                description: format!("Last updated {} days ago", days),
                severity: "medium".to_string(),
            });
        }
    }

    if let Some(largest) = complexity.largest_files.first() {
        if largest.size > 100_000 {
            smells.push(CodeSmell {
                smell_type: "massive_file".to_string(),
                description: format!("Contains {} ({} bytes)", largest.path, largest.size),
                severity: "high".to_string(),
            });
        }
    }

    if complexity.max_directory_depth > 6 {
        smells.push(CodeSmell {
            smell_type: "deep_nesting".to_string(),
            description: format!(
                "Directory nesting reaches {} levels deep",
                complexity.max_directory_depth
            ),
            severity: "medium".to_string(),
        });
    }

    if metadata.stars < 5 && metadata.forks < 2 {
        smells.push(CodeSmell {
            smell_type: "low_engagement".to_string(),
            description: "Minimal community engagement".to_string(),
            severity: "low".to_string(),
        });
    }

    if complexity.total_files > 500 {
        smells.push(CodeSmell {
            smell_type: "file_bloat".to_string(),
            description: format!("Contains {} files", complexity.total_files),
            severity: "medium".to_string(),
        });
    }

    SmellReport {
        smell_count: smells.len(),
        has_issues: !smells.is_empty(),
        smells,
    }
}
