//! Venue recovery from schedule titles such as
//! "WNT Legends Manila, Philippines" where no detail page is available.

use regex::Regex;
use std::sync::LazyLock;

use super::normalizer::normalize;
use crate::text::norm_spaces;

/// Generic event wording; walking back from the end of a title stops here
pub const EVENT_STOPWORDS: &[&str] = &[
    "wnt", "open", "championship", "championships", "cup", "legends", "pool",
    "premier", "league", "ranking", "major", "non-ranking", "blue", "ribbon",
    "world", "international", "masters", "classic", "tour", "series", "women", "men",
];

pub const DEFAULT_MAX_CITY_WORDS: usize = 3;
pub const DEFAULT_MAX_TAIL_LEN: usize = 80;

static PRIZE_FUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bprize fund\b").expect("valid prize fund regex"));

static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w'\- ]+$").expect("valid trailing punctuation regex"));

static SHORT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,4}$").expect("valid number regex"));

static EVENT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(wnt|open|championship|cup|legends|pool|premier|league)\b")
        .expect("valid event word regex")
});

static VENUE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(arena|hotel|resort|centre|center|club|hall)\b")
        .expect("valid venue word regex")
});

/// Tunables of the title-tail heuristic
#[derive(Debug, Clone)]
pub struct TitleTailRules {
    pub max_city_words: usize,
    pub max_len: usize,
}

impl Default for TitleTailRules {
    fn default() -> Self {
        Self {
            max_city_words: DEFAULT_MAX_CITY_WORDS,
            max_len: DEFAULT_MAX_TAIL_LEN,
        }
    }
}

/// Location embedded in the tail of a title, e.g.
/// "Chinese Taipei Open Taipei City, Taiwan Prize Fund: $..." -> "Taipei City, Taiwan"
pub fn location_from_title(title: &str, rules: &TitleTailRules) -> Option<String> {
    let title = norm_spaces(title);
    let head = PRIZE_FUND.split(&title).next().unwrap_or_default().trim();

    let parts: Vec<&str> = head
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let assembled = match parts.as_slice() {
        [city_seg, country] => {
            let city = tail_place_words(city_seg, rules.max_city_words);
            format!("{}, {}", non_empty(city)?, country)
        }
        [.., city_seg, region, country] => {
            let city = tail_place_words(city_seg, rules.max_city_words);
            format!("{}, {}, {}", non_empty(city)?, region, country)
        }
        _ => return None,
    };

    let location = normalize(Some(assembled.as_str()))?;
    if is_suspicious(&location, rules) {
        return None;
    }
    Some(location)
}

/// Still reads like an event name rather than a place, or too long to be one
pub fn is_suspicious(location: &str, rules: &TitleTailRules) -> bool {
    let s = norm_spaces(location);
    if EVENT_WORDS.is_match(&s) && !VENUE_WORDS.is_match(&s) {
        return true;
    }
    s.chars().count() > rules.max_len
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// Up to `max_words` trailing words of a segment, stopping at event wording
fn tail_place_words(segment: &str, max_words: usize) -> String {
    let segment = norm_spaces(segment);
    let segment = TRAILING_PUNCT.replace(&segment, "");

    let mut picked = Vec::new();
    for word in segment.split(' ').filter(|w| !w.is_empty()).rev() {
        let bare = word.trim_matches(|c| matches!(c, '.' | ',' | '(' | ')'));
        let lower = bare.to_lowercase();
        if SHORT_NUMBER.is_match(&lower) {
            continue;
        }
        if EVENT_STOPWORDS.contains(&lower.as_str()) {
            break;
        }
        if bare.is_empty() {
            continue;
        }
        picked.push(bare);
        if picked.len() >= max_words {
            break;
        }
    }

    picked.reverse();
    norm_spaces(&picked.join(" "))
}
