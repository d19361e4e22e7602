use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid slug regex"));

static SHOW_POSTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bshow poster\b").expect("valid poster regex"));

/// Trim and collapse every whitespace run to a single space
pub fn norm_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accent-free, lowercase, hyphen-separated form of a title
///
/// "Open de España 2026" -> "open-de-espana-2026"
pub fn slug(s: &str) -> String {
    let ascii = strip_accents(s);
    NON_ALNUM_RUN
        .replace_all(&ascii, "-")
        .trim_matches('-')
        .to_lowercase()
}

/// Title with scraping leftovers ("Show poster") removed
pub fn clean_title(s: &str) -> String {
    let collapsed = norm_spaces(s);
    let stripped = SHOW_POSTER.replace_all(&collapsed, "");
    norm_spaces(&stripped)
}

fn strip_accents(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}
