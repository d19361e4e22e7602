use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Per-run memo of page URL -> extracted location
///
/// Failed or empty extractions are remembered too, so a URL is fetched at
/// most once while it stays in the cache. The least recently used entry is
/// evicted when the capacity is reached; zero capacity caches nothing.
pub struct PageCache {
    entries: Option<LruCache<String, Option<String>>>,
    hits: usize,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
        }
    }

    /// `Some(location)` when the URL was already looked at this run
    pub fn get(&mut self, url: &str) -> Option<Option<String>> {
        let cached = self.entries.as_mut()?.get(url).cloned();
        if cached.is_some() {
            self.hits += 1;
        }
        cached
    }

    pub fn insert(&mut self, url: &str, location: Option<String>) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };
        if let Some((evicted, _)) = entries.push(url.to_string(), location) {
            if evicted != url {
                debug!("Page cache full, evicting {}", evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// How many detail pages one source may still fetch for venues
#[derive(Debug, Clone)]
pub struct EnrichmentBudget {
    source: &'static str,
    limit: usize,
    used: usize,
}

impl EnrichmentBudget {
    pub fn new(source: &'static str, limit: usize) -> Self {
        Self {
            source,
            limit,
            used: 0,
        }
    }

    /// Take one fetch from the budget; false once it is exhausted
    pub fn try_spend(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.used
    }
}
