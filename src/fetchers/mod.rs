//! Record builders for each tournament source, plus the page enrichment
//! machinery they share.

pub mod dates;
pub mod enricher;
pub mod epbf;
pub mod ical;
pub mod matchroom;
pub mod page_cache;
pub mod pbs;
pub mod wpa;

pub use enricher::Enricher;
pub use page_cache::{EnrichmentBudget, PageCache};

use anyhow::Result;

/// Something that can download a page as text
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch_text(&mut self, url: &str) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PageFetcher;
    use anyhow::{anyhow, Result};
    use std::collections::HashMap;

    /// Serves canned pages and records every requested URL
    #[derive(Default)]
    pub struct FakeFetcher {
        pub pages: HashMap<String, String>,
        pub requests: Vec<String>,
    }

    impl FakeFetcher {
        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl PageFetcher for FakeFetcher {
        async fn fetch_text(&mut self, url: &str) -> Result<String> {
            self.requests.push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("HTTP error: 404 Not Found"))
        }
    }
}
