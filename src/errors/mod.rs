/// Context for failed downloads
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Context for source documents that could not be understood
pub fn parse_context(what: &str, origin: &str) -> String {
    format!("Failed to parse {} from {}", what, origin)
}

/// Context for record cache reads and writes
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_messages() {
        assert_eq!(fetch_context("https://x.y"), "Failed to fetch from: https://x.y");
        assert_eq!(
            parse_context("date range", "EPBF 2026"),
            "Failed to parse date range from EPBF 2026"
        );
        assert_eq!(cache_context("load", "raw_records"), "Failed to load cache for key: raw_records");
    }
}
