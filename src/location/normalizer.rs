use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::text::norm_spaces;

/// Longer strings are prose, not venue names
pub const MAX_LOCATION_LEN: usize = 140;

static PAGE_CHROME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(ical|outlook|export|subscribe|add to|google|calendar|share|print|download|tickets?|prize fund|more info|read more|countdown)\b",
    )
    .expect("valid page chrome regex")
});

static DIGITS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,6}$").expect("valid digits regex"));

static TUKEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTukey\b").expect("valid typo regex"));

/// How much of a venue a location string pins down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Precision {
    None = 0,
    /// Single component, usually a country
    Coarse = 1,
    /// "City, Country" or better
    Fine = 2,
}

/// Clean a raw location candidate, or reject it
///
/// Idempotent: feeding an accepted value back in returns it unchanged.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let collapsed = norm_spaces(raw?);
    if collapsed.is_empty() {
        return None;
    }

    let corrected = TUKEY.replace_all(&collapsed, "Turkey");
    let candidate = if corrected.contains(" / ") {
        join_slash_parts(&corrected)?
    } else {
        corrected.into_owned()
    };

    if is_tba(&candidate) || is_bad_location(&candidate) {
        return None;
    }
    Some(candidate)
}

/// Ordinal precision of an (already normalized) location
pub fn precision(location: Option<&str>) -> Precision {
    match location.map(str::trim) {
        None | Some("") => Precision::None,
        Some(s) if s.contains(',') => Precision::Fine,
        Some(_) => Precision::Coarse,
    }
}

/// Markup and widget noise that is never a venue
pub fn is_bad_location(s: &str) -> bool {
    s.is_empty()
        || DIGITS_ONLY.is_match(s)
        || PAGE_CHROME.is_match(s)
        || s.chars().count() > MAX_LOCATION_LEN
        || s.starts_with('+')
        || s.starts_with('•')
}

fn is_tba(s: &str) -> bool {
    s.eq_ignore_ascii_case("TBA")
}

// "City / Country" -> "City, Country", dropping TBA halves
fn join_slash_parts(s: &str) -> Option<String> {
    let parts: Vec<&str> = s
        .split(" / ")
        .map(|part| part.trim_matches(|c: char| c.is_whitespace() || c == '/' || c == ','))
        .filter(|part| !part.is_empty() && !is_tba(part))
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(parts.join(", "))
}
