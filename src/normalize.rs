//! Text cleanup for extracted abstract and keyword fields.
//!
//! Publisher pages and the CrossRef API both return text littered with markup
//! (CrossRef abstracts are JATS XML fragments), so every extracted field passes
//! through [`normalize`] before it is stored.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s.,;:()\-]").expect("charset regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Clean raw extracted text into a single-line, plain-text field.
///
/// Strips `<...>` tag spans, drops any character outside letters, digits,
/// whitespace and basic punctuation (`.,;:()-`), collapses whitespace runs to
/// a single space and trims the ends. Empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = TAG_RE.replace_all(raw, "");
    let text = DISALLOWED_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// [`normalize`] lifted over an absent value.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}
