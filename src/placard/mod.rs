//! Museum placard generation for rendered artworks.

mod claude;

pub use claude::PlacardComposer;

use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters of the code snippet quoted in the curator instruction.
const SNIPPET_QUOTE_CHARS: usize = 500;

/// The aesthetic categories the curator must choose from.
pub const AESTHETIC_CATEGORIES: &[&str] = &[
    "Recursive / Pattern-heavy",
    "Clean / Structured / Modular",
    "Minimal / Comment-driven",
    "Messy / Experimental / Hacky",
    "Data-heavy / Structured / Grid Systems",
];

/// The curated artist list the curator matches against.
pub const MATCHED_ARTISTS: &[&str] = &[
    "Yayoi Kusama",
    "Zaha Hadid",
    "Jenny Holzer",
    "Tracey Emin",
    "Anni Albers",
];

/// Errors from the placard pipeline.
#[derive(Debug, Error)]
pub enum PlacardError {
    #[error("text-generation provider is not configured")]
    NotConfigured,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("text-generation provider retry limit exceeded")]
    RetryLimitExceeded,

    #[error("text-generation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unparseable provider reply: {0}")]
    Unparseable(String),
}

/// Inputs for one placard: the prompt that produced the artwork plus the code
/// context it came from.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacardRequest {
    pub imagen_prompt: String,
    pub code_snippet: String,
    pub file_path: String,
    pub language: String,
    pub repo_name: String,
    pub username: String,
    #[serde(default)]
    pub year: Option<String>,
}

/// The constrained JSON schema the provider is instructed to return. Missing
/// fields default to empty strings so a sloppy reply still yields a record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratorReply {
    #[serde(default)]
    pub aesthetic_category: String,
    #[serde(default)]
    pub artist_match: String,
    #[serde(default)]
    pub artist_description: String,
    #[serde(default)]
    pub placard_description: String,
}

/// The full display record returned to the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacardRecord {
    pub title: String,
    pub filename: String,
    pub file_path: String,
    pub artist: String,
    pub medium: String,
    pub year: String,
    pub repo_name: String,
    pub description: String,
    pub aesthetic_category: String,
    pub artist_match: String,
    pub artist_description: String,
}

lazy_static! {
    static ref FENCE_OPEN_JSON_RE: Regex = Regex::new(r"^```json\s*").unwrap();
    static ref FENCE_OPEN_RE: Regex = Regex::new(r"^```\s*").unwrap();
    static ref FENCE_CLOSE_RE: Regex = Regex::new(r"```\s*$").unwrap();
}

/// Strip Markdown code-fence wrapping from a provider reply.
pub fn strip_markdown_fences(text: &str) -> String {
    let text = text.trim();
    let text = FENCE_OPEN_JSON_RE.replace(text, "");
    let text = FENCE_OPEN_RE.replace(&text, "");
    let text = FENCE_CLOSE_RE.replace(&text, "");
    text.trim().to_string()
}

/// Build the curator instruction sent to the text-generation provider.
pub fn curator_instruction(request: &PlacardRequest) -> String {
    let snippet: String = request
        .code_snippet
        .chars()
        .take(SNIPPET_QUOTE_CHARS)
        .collect();

    format!(
        r#"You are a sophisticated museum curator writing a placard for "Syntaxesia" - an art exhibition where code is transformed into abstract post-modern artworks.

An artwork has been generated from this code file using the following Imagen prompt:
"{imagen_prompt}"

Code File Information:
- File: {file_path}
- Language: {language}
- Repository: {repo_name}
- Author: @{username}

Code Sample (first 500 chars):
{snippet}

Your task: Write a museum placard that describes this artwork. The placard should:

1. **Aesthetic Classification:**
   - Choose ONE dominant aesthetic category:
     * Recursive / Pattern-heavy (obsessive repetition, recursion, nested loops)
     * Clean / Structured / Modular (clean boundaries, composable modules)
     * Minimal / Comment-driven (text as primary medium, sparse structure)
     * Messy / Experimental / Hacky (raw, improvisational, broken conventions)
     * Data-heavy / Structured / Grid Systems (tabular logic, weaving, grids)

2. **Artist Match:**
   - Match ONE artist from this curated list:
     * Yayoi Kusama (infinite dots, mirrored recursion, repetition-as-obsession)
     * Zaha Hadid (parametric architecture, fluid geometry, precision + futurism)
     * Jenny Holzer (language-as-art, proclamation, text as visual medium)
     * Tracey Emin (raw vulnerability, confessional, imperfect expression)
     * Anni Albers (code-as-weaving, grids, structural textiles)
   - Use phrasing like: "Inspired by the aesthetic language of..." or "Evoking the structural qualities of..."
   - Do NOT say "in the style of"

3. **Placard Description:**
   - 2-4 sentences in sophisticated museum docent voice
   - Reference the artwork's visual elements (based on the Imagen prompt) AND code characteristics
   - Use art criticism language with clever observations about code quality
   - Subtly humorous tone
   - Must be two paragraphs separated by a blank line:
     * Paragraph 1: artwork description + code observations
     * Paragraph 2: artist context (1-2 sentences), referencing the matched artist

Return ONLY valid JSON in this format:
{{
  "aestheticCategory": "one of the categories above",
  "artistMatch": "one artist name from the list",
  "artistDescription": "1 sentence describing the artist's work (general, factual, non-hyperbolic)",
  "placardDescription": "your placard description here (two paragraphs separated by blank line)"
}}"#,
        imagen_prompt = request.imagen_prompt,
        file_path = request.file_path,
        language = request.language,
        repo_name = request.repo_name,
        username = request.username,
        snippet = snippet,
    )
}

/// Assemble the display record from the parsed provider reply plus the
/// pass-through request fields.
pub fn build_record(request: &PlacardRequest, reply: CuratorReply) -> PlacardRecord {
    let filename = request
        .file_path
        .rsplit('/')
        .next()
        .unwrap_or(&request.file_path)
        .to_string();

    let current_year = chrono::Utc::now().year().to_string();
    let medium_year = request.year.clone().unwrap_or(current_year);

    PlacardRecord {
        title: filename.clone(),
        filename,
        file_path: request.file_path.clone(),
        artist: format!("Code by @{}", request.username),
        medium: format!("{}, {}", request.language, medium_year),
        year: request.year.clone().unwrap_or_default(),
        repo_name: request.repo_name.clone(),
        description: reply.placard_description,
        aesthetic_category: reply.aesthetic_category,
        artist_match: reply.artist_match,
        artist_description: reply.artist_description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PlacardRequest {
        PlacardRequest {
            imagen_prompt: "abstract artwork".to_string(),
            code_snippet: "fn main() {}".to_string(),
            file_path: "src/bin/main.rs".to_string(),
            language: "rust".to_string(),
            repo_name: "demo".to_string(),
            username: "octocat".to_string(),
            year: None,
        }
    }

    #[test]
    fn fenced_and_unfenced_replies_parse_identically() {
        let raw = r#"{"aestheticCategory":"Clean / Structured / Modular","artistMatch":"Anni Albers","artistDescription":"Weaver.","placardDescription":"One.\n\nTwo."}"#;
        let fenced = format!("```json\n{}\n```", raw);

        let a: CuratorReply = serde_json::from_str(&strip_markdown_fences(raw)).unwrap();
        let b: CuratorReply = serde_json::from_str(&strip_markdown_fences(&fenced)).unwrap();

        assert_eq!(a.aesthetic_category, b.aesthetic_category);
        assert_eq!(a.artist_match, b.artist_match);
        assert_eq!(a.placard_description, b.placard_description);
    }

    #[test]
    fn bare_fences_are_stripped_too() {
        let stripped = strip_markdown_fences("```\n{\"artistMatch\":\"Zaha Hadid\"}\n```");
        assert!(stripped.starts_with('{'));
        assert!(stripped.ends_with('}'));
    }

    #[test]
    fn missing_reply_fields_default_to_empty() {
        let reply: CuratorReply = serde_json::from_str(r#"{"artistMatch":"Tracey Emin"}"#).unwrap();
        assert_eq!(reply.artist_match, "Tracey Emin");
        assert_eq!(reply.aesthetic_category, "");
        assert_eq!(reply.placard_description, "");
    }

    #[test]
    fn record_derives_display_fields() {
        let record = build_record(&request(), CuratorReply::default());
        assert_eq!(record.filename, "main.rs");
        assert_eq!(record.title, "main.rs");
        assert_eq!(record.artist, "Code by @octocat");
        assert!(record.medium.starts_with("rust, "));
        assert_eq!(record.year, "");
    }

    #[test]
    fn explicit_year_is_passed_through() {
        let mut req = request();
        req.year = Some("2019".to_string());
        let record = build_record(&req, CuratorReply::default());
        assert_eq!(record.medium, "rust, 2019");
        assert_eq!(record.year, "2019");
    }

    #[test]
    fn instruction_quotes_at_most_500_chars_of_code() {
        let mut req = request();
        req.code_snippet = "x".repeat(2000);
        let instruction = curator_instruction(&req);
        assert!(instruction.contains(&"x".repeat(500)));
        assert!(!instruction.contains(&"x".repeat(501)));
    }

    #[test]
    fn instruction_names_every_category_and_artist() {
        let instruction = curator_instruction(&request());
        for category in AESTHETIC_CATEGORIES {
            assert!(instruction.contains(category), "missing {}", category);
        }
        for artist in MATCHED_ARTISTS {
            assert!(instruction.contains(artist), "missing {}", artist);
        }
    }
}
