//! Heuristic static analysis of code snippets.
//!
//! Everything here is a pure function of its input: no network access, no
//! shared state, and no failure paths (absent patterns count as zero).

mod language;
mod metrics;
mod signals;

pub use language::{detect_language, DEFAULT_LANGUAGE};
pub use metrics::{compute_metrics, CodeMetrics};
pub use signals::{analyze_signals, CodeSignals};

/// Character budget applied to snippets before analysis. Applied by callers
/// (the HTTP handlers), not by the analysis functions themselves.
pub const SNIPPET_CHAR_BUDGET: usize = 1800;

/// Truncate a snippet to the analysis budget on a character boundary.
pub fn clip_snippet(code: &str) -> &str {
    match code.char_indices().nth(SNIPPET_CHAR_BUDGET) {
        Some((byte_index, _)) => &code[..byte_index],
        None => code,
    }
}

/// Convenience pipeline: detect language (unless supplied), extract signals
/// and derive the full feature vector.
pub fn extract(code: &str, language: Option<&str>) -> CodeMetrics {
    let language = match language {
        Some(l) if !l.trim().is_empty() => l,
        _ => detect_language(code),
    };
    let signals = analyze_signals(code);
    compute_metrics(code, language, &signals)
}
