//! Heuristic source-language detection.
//!
//! Each candidate language carries a fixed set of signature patterns; the
//! candidate matching the most patterns wins. The candidate list is data, not
//! control flow, so adding a language means adding a table row.

use lazy_static::lazy_static;
use regex::Regex;

/// Label returned when nothing else scores convincingly.
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// A score below this is treated as a near-tie and falls back to loose
/// script-like indicators.
const MIN_CONFIDENT_SCORE: usize = 2;

struct LanguageSignature {
    label: &'static str,
    patterns: Vec<Regex>,
}

fn signature(label: &'static str, patterns: &[&str]) -> LanguageSignature {
    LanguageSignature {
        label,
        patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
    }
}

lazy_static! {
    /// Candidate order is significant: ties keep the first-declared language.
    static ref SIGNATURES: Vec<LanguageSignature> = vec![
        signature("python", &[
            r"\bdef\s+\w+\s*\(",
            r"\bimport\s+\w+",
            r"\bprint\s*\(",
            r":\s*\n\s+",
            r"\bself\b",
            r"\belif\b",
            r"\b__\w+__\b",
        ]),
        signature("rust", &[
            r"\bfn\s+\w+",
            r"\blet\s+mut\b",
            r"\bmatch\b",
            r"\bimpl\b",
            r"->",
            r"::",
            r"\bpub\s+(fn|struct|enum)",
            r"\bOption<",
            r"\bResult<",
        ]),
        signature("java", &[
            r"\bpublic\s+(static\s+)?void\b",
            r"\bSystem\.out",
            r"\bextends\b",
            r"\bimplements\b",
            r"\bpackage\s+",
            r"\b@Override\b",
        ]),
        signature("typescript", &[
            r":\s*(string|number|boolean|void)\b",
            r"\binterface\s+\w+",
            r"\b(type|enum)\s+\w+",
            r"<[A-Z]\w*>",
            r"\bas\s+\w+",
        ]),
        signature("go", &[
            r"\bfunc\s+\w+",
            r"\bpackage\s+main\b",
            r"\bfmt\.",
            r":=",
            r"\bgo\s+func",
            r"\bchan\b",
        ]),
        signature("c", &[
            r"#include\s*<",
            r"\bprintf\s*\(",
            r"\bmalloc\s*\(",
            r"\bvoid\s+\w+\s*\(",
            r"\bsizeof\s*\(",
            r"\bNULL\b",
        ]),
        signature("cpp", &[
            r"#include\s*<",
            r"\bstd::",
            r"\bcout\s*<<",
            r"\btemplate\s*<",
            r"\bnamespace\b",
            r"\bnew\s+\w+",
        ]),
        signature("ruby", &[
            r"\bdo\s*\|",
            r"\bend\b",
            r"\bputs\b",
            r"\brequire\b",
            r"\battr_(reader|writer|accessor)\b",
            r"\bdef\s+\w+.*\n.*\bend\b",
        ]),
        signature("swift", &[
            r"\bvar\s+\w+\s*:",
            r"\bguard\s+let\b",
            r"\bfunc\s+\w+.*->",
            r"\bprotocol\b",
            r"\bstruct\s+\w+",
        ]),
        signature("php", &[
            r"<\?php",
            r"\$\w+",
            r"\becho\b",
            r"->",
            r"\bfunction\s+\w+",
        ]),
        signature("html", &[
            r"<\w+[^>]*>",
            r"</\w+>",
            r"(?i)<!DOCTYPE",
            r"(?i)<html",
            r"(?i)<div",
        ]),
        signature("css", &[
            r"\{[^}]*;\s*\}",
            r"@media",
            r":\s*(flex|grid|block|none)\b",
            r"\.\w+\s*\{",
            r"#\w+\s*\{",
        ]),
    ];

    static ref LOOSE_SCRIPT_RES: Vec<Regex> = vec![
        Regex::new(r"\b(const|let|var)\b").unwrap(),
        Regex::new(r"=>\s*[{(]").unwrap(),
        Regex::new(r"\bfunction\b").unwrap(),
    ];
}

/// Guess the source language of a snippet.
///
/// Deterministic: candidates are scored in declaration order and only a
/// strictly higher score replaces the current best.
pub fn detect_language(code: &str) -> &'static str {
    let mut best = DEFAULT_LANGUAGE;
    let mut best_score = 0usize;

    for sig in SIGNATURES.iter() {
        let score = sig.patterns.iter().filter(|p| p.is_match(code)).count();
        if score > best_score {
            best_score = score;
            best = sig.label;
        }
    }

    if best_score < MIN_CONFIDENT_SCORE && LOOSE_SCRIPT_RES.iter().any(|p| p.is_match(code)) {
        return DEFAULT_LANGUAGE;
    }

    best
}
