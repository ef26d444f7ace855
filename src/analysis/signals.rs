//! Keyword-level signal extraction from a raw code snippet.

use lazy_static::lazy_static;
use regex::Regex;

/// How many declared function names the recursion heuristic inspects.
const MAX_RECURSION_CANDIDATES: usize = 12;

lazy_static! {
    static ref BRANCH_RE: Regex = Regex::new(r"\b(if|else if|else|switch|case|match)\b").unwrap();
    static ref LOOP_RE: Regex = Regex::new(r"\b(for|while|do)\b").unwrap();
    static ref TRY_CATCH_RE: Regex = Regex::new(r"\b(try|catch|except|finally)\b").unwrap();
    static ref COMMENT_LINE_RE: Regex = Regex::new(r"^\s*(//|#|/\*|\* )").unwrap();
    static ref FUNCTIONAL_RE: Regex = Regex::new(r"\b(map|filter|reduce|fold|compose|pipe)\b").unwrap();
    static ref ARROW_RE: Regex = Regex::new(r"=>").unwrap();
    static ref OOP_RE: Regex =
        Regex::new(r"\b(class|this|new|extends|public|private|protected)\b").unwrap();
    static ref FN_DECL_RE: Regex = Regex::new(r"\bfunction\s+([A-Za-z_]\w*)\b").unwrap();
    static ref DEF_DECL_RE: Regex = Regex::new(r"\bdef\s+([A-Za-z_]\w*)\b").unwrap();
}

/// Raw keyword counts extracted in a single pass over the snippet.
///
/// These are the inputs to [`super::metrics::compute_metrics`]; they carry no
/// derived values of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSignals {
    pub branch_count: u32,
    pub loop_count: u32,
    pub try_catch_count: u32,
    pub comment_density: f64,
    pub functional_hints: u32,
    pub oop_hints: u32,
    pub recursion_hints: u32,
}

/// Count keyword-level signals in a code snippet.
///
/// Pure and total: every pattern that fails to match contributes zero, and a
/// snippet with no non-empty lines yields a comment density of exactly 0.
pub fn analyze_signals(code: &str) -> CodeSignals {
    let non_empty: Vec<&str> = code
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .collect();

    let comment_lines = non_empty
        .iter()
        .filter(|l| COMMENT_LINE_RE.is_match(l))
        .count();
    let comment_density = if non_empty.is_empty() {
        0.0
    } else {
        comment_lines as f64 / non_empty.len() as f64
    };

    CodeSignals {
        branch_count: BRANCH_RE.find_iter(code).count() as u32,
        loop_count: LOOP_RE.find_iter(code).count() as u32,
        try_catch_count: TRY_CATCH_RE.find_iter(code).count() as u32,
        comment_density,
        functional_hints: (FUNCTIONAL_RE.find_iter(code).count()
            + ARROW_RE.find_iter(code).count()) as u32,
        oop_hints: OOP_RE.find_iter(code).count() as u32,
        recursion_hints: count_recursion_hints(code),
    }
}

/// Recursion heuristic: a declared function whose name reappears with an open
/// paren at least twice (declaration plus any call) scores one hint.
///
/// This intentionally flags ordinary multi-call functions as recursive; the
/// downstream composer depends on that looseness for visual variety.
fn count_recursion_hints(code: &str) -> u32 {
    let mut names: Vec<&str> = Vec::new();
    for caps in FN_DECL_RE.captures_iter(code) {
        if let Some(m) = caps.get(1) {
            names.push(m.as_str());
        }
    }
    for caps in DEF_DECL_RE.captures_iter(code) {
        if let Some(m) = caps.get(1) {
            names.push(m.as_str());
        }
    }

    names
        .iter()
        .take(MAX_RECURSION_CANDIDATES)
        .filter(|name| count_call_sites(code, name) >= 2)
        .count() as u32
}

/// Count occurrences of `name` followed (after optional whitespace) by `(`,
/// with a word boundary on the left.
fn count_call_sites(code: &str, name: &str) -> usize {
    let bytes = code.as_bytes();
    code.match_indices(name)
        .filter(|(start, _)| {
            // word boundary before the name
            if *start > 0 {
                let prev = bytes[start - 1] as char;
                if prev.is_ascii_alphanumeric() || prev == '_' {
                    return false;
                }
            }
            // skip whitespace after the name, require '('
            let mut rest = code[start + name.len()..].chars();
            loop {
                match rest.next() {
                    Some(c) if c.is_whitespace() => continue,
                    Some('(') => return true,
                    _ => return false,
                }
            }
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_loops_and_branches() {
        let code = "for (let i=0;i<10;i++) { if (i>5) { console.log(i); } }";
        let signals = analyze_signals(code);
        assert_eq!(signals.loop_count, 1);
        assert_eq!(signals.branch_count, 1);
    }

    #[test]
    fn empty_snippet_has_zero_density() {
        let signals = analyze_signals("");
        assert_eq!(signals.comment_density, 0.0);

        let blank = analyze_signals("\n   \n\t\n");
        assert_eq!(blank.comment_density, 0.0);
    }

    #[test]
    fn comment_density_counts_marker_lines() {
        let code = "// one\nlet x = 1;\n# two\nlet y = 2;";
        let signals = analyze_signals(code);
        assert_eq!(signals.comment_density, 0.5);
    }

    #[test]
    fn comment_density_stays_in_unit_interval() {
        let all_comments = analyze_signals("// a\n// b\n// c");
        assert_eq!(all_comments.comment_density, 1.0);

        let mixed = analyze_signals("code();\n// note");
        assert!(mixed.comment_density >= 0.0 && mixed.comment_density <= 1.0);
    }

    #[test]
    fn detects_recursive_function() {
        let code = "function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); }";
        let signals = analyze_signals(code);
        assert_eq!(signals.recursion_hints, 1);
    }

    #[test]
    fn python_def_participates_in_recursion_heuristic() {
        let code = "def walk(node):\n    for child in node:\n        walk(child)\n";
        let signals = analyze_signals(code);
        assert_eq!(signals.recursion_hints, 1);
    }

    #[test]
    fn single_call_is_not_recursion() {
        let code = "function once() { return 1; }";
        let signals = analyze_signals(code);
        assert_eq!(signals.recursion_hints, 0);
    }

    #[test]
    fn recursion_candidates_are_capped() {
        // 14 declared functions, each trivially "recursive" via a second call
        let mut code = String::new();
        for i in 0..14 {
            code.push_str(&format!("function f{i}() {{ f{i}(); }}\n"));
        }
        let signals = analyze_signals(&code);
        assert_eq!(signals.recursion_hints, 12);
    }

    #[test]
    fn functional_hints_include_arrows() {
        let code = "items.map(x => x * 2).filter(x => x > 1)";
        let signals = analyze_signals(code);
        // map + filter + two arrows
        assert_eq!(signals.functional_hints, 4);
    }

    #[test]
    fn oop_hints_counted() {
        let code = "class Foo extends Bar { constructor() { this.x = new Baz(); } }";
        let signals = analyze_signals(code);
        assert_eq!(signals.oop_hints, 4);
    }

    #[test]
    fn call_site_requires_word_boundary() {
        // "refresh(" contains "fresh(" but must not count for `fresh`
        assert_eq!(count_call_sites("refresh()", "fresh"), 0);
        assert_eq!(count_call_sites("fresh ()", "fresh"), 1);
    }
}
