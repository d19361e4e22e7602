use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use std::time::Duration;

use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::config::sources::{get_wpa_feeds, PBS_ASSUMED_YEAR, PBS_FALLBACK_URLS};
use crate::domain::TournamentRecord;
use crate::fetchers::{epbf, matchroom, pbs, wpa};
use crate::fetchers::{Enricher, EnrichmentBudget, PageCache, PageFetcher};
use crate::http::RateLimitedClient;

/// What to collect: events ongoing or starting on/after `from`
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub from: NaiveDate,
    pub epbf_years: i32,
}

pub struct IngestionService<F: PageFetcher> {
    config: AppConfig,
    options: IngestOptions,
    cache: Cache,
    enricher: Enricher<F>,
}

impl IngestionService<RateLimitedClient> {
    pub fn new(config: AppConfig, options: IngestOptions) -> Result<Self> {
        let client = RateLimitedClient::new(&config.fetch)?;
        Self::with_fetcher(config, options, client)
    }
}

impl<F: PageFetcher> IngestionService<F> {
    pub fn with_fetcher(config: AppConfig, options: IngestOptions, fetcher: F) -> Result<Self> {
        let cache = Cache::new(&config.output.cache_dir)?;
        let enricher = Enricher::new(
            fetcher,
            PageCache::new(config.fetch.page_cache_capacity),
            Duration::from_millis(config.enrichment.sleep_ms),
        );

        Ok(Self {
            config,
            options,
            cache,
            enricher,
        })
    }

    /// Collects every source and stores the raw records for `process`
    pub async fn run(&mut self) -> Result<Vec<TournamentRecord>> {
        info!("=== Starting Data Ingestion (from {}) ===\n", self.options.from);

        let mut records = Vec::new();
        records.extend(self.fetch_wpa().await);
        records.extend(self.fetch_matchroom().await);
        records.extend(self.fetch_pbs().await);
        records.extend(self.fetch_epbf().await);

        let records = drop_malformed(records);
        info!(
            "  → Collected {} raw records ({} enrichment pages cached, {} cache hits)\n",
            records.len(),
            self.enricher.cache().len(),
            self.enricher.cache().hits()
        );

        self.cache.save_records(&records)?;
        info!("  → Saved to parsed cache\n");

        info!("=== Ingestion Complete ===");
        Ok(records)
    }

    async fn fetch_wpa(&mut self) -> Vec<TournamentRecord> {
        info!("Step 1: Reading WPA iCal feeds...");
        let mut budget = EnrichmentBudget::new("WPA", self.config.enrichment.wpa_limit);
        let records = wpa::fetch_wpa(&mut self.enricher, &get_wpa_feeds(), self.options.from, &mut budget).await;
        log_source("WPA", records.len(), &budget);
        records
    }

    async fn fetch_matchroom(&mut self) -> Vec<TournamentRecord> {
        info!("Step 2: Reading Matchroom schedule...");
        let mut budget = EnrichmentBudget::new("Matchroom", self.config.enrichment.matchroom_limit);
        let result = matchroom::fetch_matchroom(
            &mut self.enricher,
            self.options.from,
            &mut budget,
            &self.config.reconcile.title_tail,
        )
        .await;

        match result {
            Ok(records) => {
                log_source("Matchroom", records.len(), &budget);
                records
            }
            Err(e) => {
                warn!("Matchroom failed: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_epbf(&mut self) -> Vec<TournamentRecord> {
        info!("Step 4: Reading EPBF calendars...");
        // One budget across all years, always at least the starting year
        let mut budget = EnrichmentBudget::new("EPBF", self.config.enrichment.epbf_limit);
        let first_year = self.options.from.year();
        let mut records = Vec::new();

        for year in first_year..first_year + self.options.epbf_years.max(1) {
            match epbf::fetch_epbf(&mut self.enricher, year, self.options.from, &mut budget).await {
                Ok(found) => records.extend(found),
                Err(e) => warn!("EPBF {} failed: {:#}", year, e),
            }
        }

        log_source("EPBF", records.len(), &budget);
        records
    }

    async fn fetch_pbs(&mut self) -> Vec<TournamentRecord> {
        info!("Step 3: Reading PBS schedule articles...");
        let records = pbs::fetch_pbs(&mut self.enricher, PBS_FALLBACK_URLS, PBS_ASSUMED_YEAR, self.options.from).await;
        info!("  → PBS: {} records\n", records.len());
        records
    }

    pub fn into_fetcher(self) -> F {
        self.enricher.into_fetcher()
    }
}

fn log_source(source: &str, count: usize, budget: &EnrichmentBudget) {
    info!(
        "  → {}: {} records ({} enrichment fetches, {} left)\n",
        source,
        count,
        budget.used(),
        budget.remaining()
    );
}

fn drop_malformed(records: Vec<TournamentRecord>) -> Vec<TournamentRecord> {
    records
        .into_iter()
        .filter(|r| {
            let ok = r.is_well_formed();
            if !ok {
                debug!("Dropping malformed record: {:?} ({} - {})", r.title, r.start, r.end);
            }
            ok
        })
        .collect()
}
