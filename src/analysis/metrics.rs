//! Derived code metrics: the fixed-schema feature vector consumed by the
//! prompt composer and echoed back to API callers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use super::signals::CodeSignals;

lazy_static! {
    static ref IMPORT_LINE_RE: Regex =
        Regex::new(r#"^\s*(import\s|const\s+\w+\s*=\s*require\(|from\s+['"])"#).unwrap();
    static ref ASYNC_RE: Regex =
        Regex::new(r"\basync\b|\bawait\b|\bPromise\b|\.then\s*\(").unwrap();
    static ref COMMENTED_STATEMENT_RE: Regex =
        Regex::new(r"^\s*//\s*(const|let|var|function|if|for|return|import)").unwrap();
}

/// Feature vector computed from one code snippet. Immutable once built and
/// never persisted; a fresh vector is derived per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeMetrics {
    pub language: String,
    pub recursion_count: u32,
    pub loop_count: u32,
    pub conditional_count: u32,
    pub class_count: u32,
    pub async_count: u32,
    pub functions: u32,
    pub cyclomatic_complexity: u32,
    pub import_count: u32,
    pub lines_of_code: u32,
    pub max_nesting_depth: u32,
    pub try_catch_count: u32,
    pub unused_code_lines: u32,
    pub comment_ratio: f64,
    pub duplicate_blocks: u32,
    pub magic_numbers: u32,
}

impl CodeMetrics {
    /// Look up a feature by its wire name. Used by the data-driven palette
    /// table so color rows can reference features without code changes.
    pub fn feature(&self, key: &str) -> Option<u32> {
        match key {
            "loop_count" => Some(self.loop_count),
            "conditional_count" => Some(self.conditional_count),
            "recursion_count" => Some(self.recursion_count),
            "functions" => Some(self.functions),
            "class_count" => Some(self.class_count),
            "async_count" => Some(self.async_count),
            "import_count" => Some(self.import_count),
            "try_catch_count" => Some(self.try_catch_count),
            "magic_numbers" => Some(self.magic_numbers),
            "duplicate_blocks" => Some(self.duplicate_blocks),
            "max_nesting_depth" => Some(self.max_nesting_depth),
            _ => None,
        }
    }
}

/// Compute the full feature vector for a snippet.
///
/// `language` is the detected (or caller-supplied) label; `signals` are the
/// keyword counts from [`super::signals::analyze_signals`].
pub fn compute_metrics(code: &str, language: &str, signals: &CodeSignals) -> CodeMetrics {
    let lines: Vec<&str> = code.split('\n').collect();

    let import_count = lines.iter().filter(|l| IMPORT_LINE_RE.is_match(l)).count() as u32;
    let async_count = ASYNC_RE.find_iter(code).count() as u32;
    let unused_code_lines = lines
        .iter()
        .filter(|l| COMMENTED_STATEMENT_RE.is_match(l))
        .count() as u32;

    CodeMetrics {
        language: language.to_string(),
        recursion_count: signals.recursion_hints,
        loop_count: signals.loop_count,
        conditional_count: signals.branch_count,
        class_count: signals.oop_hints / 3,
        async_count,
        functions: signals.functional_hints,
        cyclomatic_complexity: signals.branch_count + signals.loop_count + 1,
        import_count,
        lines_of_code: lines.len() as u32,
        max_nesting_depth: max_indentation_depth(&lines),
        try_catch_count: signals.try_catch_count,
        unused_code_lines,
        comment_ratio: signals.comment_density,
        duplicate_blocks: count_duplicate_blocks(&lines),
        magic_numbers: count_magic_numbers(code),
    }
}

/// Deepest indentation level across non-blank lines, with tabs counted as two
/// spaces and two spaces per level.
fn max_indentation_depth(lines: &[&str]) -> u32 {
    let mut max_indent = 0u32;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut spaces = 0u32;
        for c in line.chars() {
            match c {
                '\t' => spaces += 2,
                c if c.is_whitespace() => spaces += 1,
                _ => break,
            }
        }
        let indent = spaces / 2;
        if indent > max_indent {
            max_indent = indent;
        }
    }
    max_indent
}

/// Count 3-line windows (trimmed per line, joined) that appear more than once.
/// Windows of 10 characters or fewer are too trivial to count.
fn count_duplicate_blocks(lines: &[&str]) -> u32 {
    let mut block_map: HashMap<String, u32> = HashMap::new();
    for window in lines.windows(3) {
        let block = window
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");
        if block.len() > 10 {
            *block_map.entry(block).or_insert(0) += 1;
        }
    }
    block_map.values().filter(|&&c| c > 1).count() as u32
}

/// Count "magic number" literals: a run of two or more digits, or a single
/// digit in 2..=9, not preceded by `.`, `[` or a word character and not
/// followed by a word character.
///
/// The natural pattern (`(?<![.\w\[])(?:[2-9]|\d{2,})(?!\w)`) needs
/// look-around, which the `regex` crate does not support, so digit runs are
/// scanned and their neighbours inspected instead.
fn count_magic_numbers(code: &str) -> u32 {
    let bytes = code.as_bytes();
    let mut count = 0u32;
    let mut i = 0usize;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let len = i - start;

        let prev_ok = if start == 0 {
            true
        } else {
            let p = bytes[start - 1];
            p != b'.' && p != b'[' && !p.is_ascii_alphanumeric() && p != b'_'
        };
        let next_ok = if i >= bytes.len() {
            true
        } else {
            let n = bytes[i];
            !n.is_ascii_alphanumeric() && n != b'_'
        };
        let value_ok = len >= 2 || bytes[start] >= b'2';

        if prev_ok && next_ok && value_ok {
            count += 1;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_signals;

    fn metrics_for(code: &str) -> CodeMetrics {
        let signals = analyze_signals(code);
        compute_metrics(code, "javascript", &signals)
    }

    #[test]
    fn cyclomatic_complexity_identity() {
        let snippets = [
            "",
            "let x = 1;",
            "for (let i=0;i<10;i++) { if (i>5) { console.log(i); } }",
            "while (a) { if (b) {} else if (c) {} }",
            "match x { _ => 1 }",
        ];
        for code in snippets {
            let m = metrics_for(code);
            assert_eq!(
                m.cyclomatic_complexity,
                m.conditional_count + m.loop_count + 1,
                "identity violated for {:?}",
                code
            );
            assert!(m.cyclomatic_complexity >= 1);
        }
    }

    #[test]
    fn reference_snippet_counts() {
        let m = metrics_for("for (let i=0;i<10;i++) { if (i>5) { console.log(i); } }");
        assert_eq!(m.loop_count, 1);
        assert_eq!(m.conditional_count, 1);
        assert_eq!(m.cyclomatic_complexity, 3);
    }

    #[test]
    fn import_lines_counted_across_syntaxes() {
        let code = "import os\nconst fs = require('fs')\nfrom 'react'\nlet x = 1;";
        let m = metrics_for(code);
        assert_eq!(m.import_count, 3);
    }

    #[test]
    fn magic_numbers_exclude_property_access_and_identifiers() {
        // 42 counts; .5 after dot does not; x2 suffix does not; arr[0] index
        // digit is excluded by the preceding bracket; 1 is too small.
        let m = count_magic_numbers("let a = 42; let b = 0.5; let x2 = 1; arr[7]");
        assert_eq!(m, 1);
    }

    #[test]
    fn magic_numbers_single_digits_from_two() {
        assert_eq!(count_magic_numbers("a = 2"), 1);
        assert_eq!(count_magic_numbers("a = 1"), 0);
        assert_eq!(count_magic_numbers("a = 10"), 1);
    }

    #[test]
    fn nesting_depth_counts_tabs_as_two_spaces() {
        let lines = vec!["fn main() {", "\t\tdeep();", "}"];
        assert_eq!(max_indentation_depth(&lines), 2);

        let spaces = vec!["a", "      b"];
        assert_eq!(max_indentation_depth(&spaces), 3);
    }

    #[test]
    fn duplicate_blocks_require_repetition_and_length() {
        let code = "alpha();\nbeta();\ngamma();\nalpha();\nbeta();\ngamma();";
        let lines: Vec<&str> = code.split('\n').collect();
        assert_eq!(count_duplicate_blocks(&lines), 1);

        let unique = "a();\nb();\nc();\nd();";
        let lines: Vec<&str> = unique.split('\n').collect();
        assert_eq!(count_duplicate_blocks(&lines), 0);
    }

    #[test]
    fn class_count_derived_from_oop_hints() {
        let code = "class A {}\nclass B {}\nclass C {}";
        let m = metrics_for(code);
        assert_eq!(m.class_count, 1);
    }

    #[test]
    fn feature_lookup_matches_fields() {
        let m = metrics_for("for(;;){} for(;;){}");
        assert_eq!(m.feature("loop_count"), Some(m.loop_count));
        assert_eq!(m.feature("unknown"), None);
    }

    #[test]
    fn commented_out_statements_counted() {
        let code = "// const x = 1;\n// return y;\nlet z = 3;";
        let m = metrics_for(code);
        assert_eq!(m.unused_code_lines, 2);
    }
}
