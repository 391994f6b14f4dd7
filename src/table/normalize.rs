// src/table/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]").expect("disallowed-char regex should compile"));

/// Canonical lookup token for a column name:
/// lowercase, every whitespace run → `_`, then anything outside `[a-z0-9_]` removed.
pub fn normalize_column_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let underscored = WHITESPACE.replace_all(&lower, "_");
    DISALLOWED.replace_all(&underscored, "").into_owned()
}

/// True when `name` is already in canonical form.
pub fn is_normalized(name: &str) -> bool {
    normalize_column_name(name) == name
}
