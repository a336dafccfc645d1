//! Routing glob semantics
//!
//! Deliberately narrower than a filesystem glob: `*` matches any run of
//! characters (including `/`), every other character — dots included —
//! matches literally. Matching is case-sensitive and anchored to the whole
//! string. Both file patterns and target-identifier patterns use these
//! rules.

use regex::Regex;

/// Compile a routing glob into an anchored regex.
///
/// Everything except `*` is escaped, so compilation cannot fail on any
/// input string.
pub fn compile_glob(pattern: &str) -> Regex {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for ch in pattern.chars() {
        if ch == '*' {
            regex.push_str(".*");
        } else {
            regex.push_str(&regex::escape(&ch.to_string()));
        }
    }
    regex.push('$');
    Regex::new(&regex).expect("escaped glob is always a valid regex")
}

/// Whole-string, case-sensitive glob match.
pub fn glob_match(pattern: &str, value: &str) -> bool {
    compile_glob(pattern).is_match(value)
}

/// Whether any pattern in the list matches.
pub fn any_match(patterns: &[String], value: &str) -> bool {
    patterns.iter().any(|p| glob_match(p, value))
}

/// Include/exclude evaluation shared by auto-sync rules and front-matter
/// rules: exclude always wins over include, and inclusion must be explicit
/// (an empty include list matches nothing; `*` matches everything).
pub fn evaluate_targets(target: &str, include: &[String], exclude: &[String]) -> bool {
    if any_match(exclude, target) {
        return false;
    }
    any_match(include, target)
}
