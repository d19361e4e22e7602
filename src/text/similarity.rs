use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::slug::slug;

/// Tokens shorter than this carry no signal ("us", "9", "de")
pub const MIN_TOKEN_LEN: usize = 3;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b20\d{2}\b").expect("valid year regex"));

/// Comparable token set of a title: years dropped, slugged, short tokens removed
pub fn title_tokens(title: &str) -> HashSet<String> {
    let without_years = YEAR.replace_all(title, " ");
    slug(&without_years)
        .split('-')
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Jaccard index of the two titles' token sets, 0.0 when either is empty
pub fn jaccard(a: &str, b: &str) -> f64 {
    let tokens_a = title_tokens(a);
    let tokens_b = title_tokens(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let shared = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    shared as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_tokens_drop_years_and_short_words() {
        let tokens = title_tokens("2026 US Open 9-Ball Championship");
        let expected: HashSet<String> = ["open", "ball", "championship"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard("US Open", "US Open Qualifier"), 0.5);
        assert_eq!(jaccard("Euro Tour Treviso", "Euro Tour Treviso 2026"), 1.0);
        assert_eq!(jaccard("Treviso", "Manila"), 0.0);
    }

    #[test]
    fn test_jaccard_empty_token_set_is_zero() {
        assert_eq!(jaccard("US 2026", "US"), 0.0);
        assert_eq!(jaccard("", "Open"), 0.0);
    }
}
