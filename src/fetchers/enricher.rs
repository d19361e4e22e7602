use anyhow::Result;
use log::debug;
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::sleep;

use super::page_cache::{EnrichmentBudget, PageCache};
use super::PageFetcher;
use crate::location::extract_from_page;

static POSTER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(pdf|jpg|jpeg|png|webp)$").expect("valid poster link regex")
});

/// Fetches source documents and, within a budget, detail pages for venues
pub struct Enricher<F: PageFetcher> {
    fetcher: F,
    cache: PageCache,
    delay: Duration,
}

impl<F: PageFetcher> Enricher<F> {
    pub fn new(fetcher: F, cache: PageCache, delay: Duration) -> Self {
        Self {
            fetcher,
            cache,
            delay,
        }
    }

    /// Plain download of a listing, feed or article
    pub async fn fetch_text(&mut self, url: &str) -> Result<String> {
        self.fetcher.fetch_text(url).await
    }

    /// Location found on a detail page, spending one unit of `budget`
    ///
    /// Returns `None` without spending for poster links or an exhausted budget.
    /// A URL already visited this run is answered from the cache.
    pub async fn location_for(&mut self, url: &str, budget: &mut EnrichmentBudget) -> Option<String> {
        if is_poster_link(url) || !budget.try_spend() {
            return None;
        }

        if let Some(cached) = self.cache.get(url) {
            return cached;
        }

        let location = match self.fetcher.fetch_text(url).await {
            Ok(body) => extract_from_page(&Html::parse_document(&body)),
            Err(e) => {
                debug!("{} enrichment fetch failed for {}: {:#}", budget.source(), url, e);
                None
            }
        };
        self.cache.insert(url, location.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        location
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn into_fetcher(self) -> F {
        self.fetcher
    }
}

pub fn is_poster_link(url: &str) -> bool {
    POSTER_LINK.is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::testing::FakeFetcher;

    const DETAIL: &str = r#"<html><body>
        <div class="mec-event-location">Klagenfurt, Austria</div></body></html>"#;

    fn enricher(fetcher: FakeFetcher) -> Enricher<FakeFetcher> {
        Enricher::new(fetcher, PageCache::new(16), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_location_for_extracts_and_memoizes() {
        let fetcher = FakeFetcher::default().with_page("https://wpa/e/1", DETAIL);
        let mut enricher = enricher(fetcher);
        let mut budget = EnrichmentBudget::new("WPA", 10);

        let first = enricher.location_for("https://wpa/e/1", &mut budget).await;
        let second = enricher.location_for("https://wpa/e/1", &mut budget).await;

        assert_eq!(first.as_deref(), Some("Klagenfurt, Austria"));
        assert_eq!(second, first);
        assert_eq!(budget.used(), 2);
        assert_eq!(enricher.cache().hits(), 1);
        assert_eq!(enricher.into_fetcher().requests, vec!["https://wpa/e/1"]);
    }

    #[tokio::test]
    async fn test_failures_are_memoized_as_none() {
        let mut enricher = enricher(FakeFetcher::default());
        let mut budget = EnrichmentBudget::new("EPBF", 10);

        assert_eq!(enricher.location_for("https://epbf/missing", &mut budget).await, None);
        assert_eq!(enricher.location_for("https://epbf/missing", &mut budget).await, None);
        assert_eq!(enricher.into_fetcher().requests.len(), 1);
    }

    #[tokio::test]
    async fn test_budget_and_posters_stop_fetching() {
        let fetcher = FakeFetcher::default()
            .with_page("https://m/1", DETAIL)
            .with_page("https://m/2", DETAIL);
        let mut enricher = enricher(fetcher);
        let mut budget = EnrichmentBudget::new("Matchroom", 1);

        assert_eq!(enricher.location_for("https://m/poster.PDF", &mut budget).await, None);
        assert!(enricher.location_for("https://m/1", &mut budget).await.is_some());
        assert_eq!(enricher.location_for("https://m/2", &mut budget).await, None);
        assert_eq!(enricher.into_fetcher().requests, vec!["https://m/1"]);
    }

    #[tokio::test]
    async fn test_hot_page_survives_eviction() {
        let fetcher = FakeFetcher::default()
            .with_page("https://p/a", DETAIL)
            .with_page("https://p/b", DETAIL)
            .with_page("https://p/c", DETAIL);
        let mut enricher = Enricher::new(fetcher, PageCache::new(2), Duration::ZERO);
        let mut budget = EnrichmentBudget::new("PBS", 10);

        for url in ["https://p/a", "https://p/b", "https://p/a", "https://p/c", "https://p/a"] {
            assert!(enricher.location_for(url, &mut budget).await.is_some());
        }

        assert_eq!(enricher.cache().hits(), 2);
        assert_eq!(
            enricher.into_fetcher().requests,
            vec!["https://p/a", "https://p/b", "https://p/c"]
        );
    }
}
