use std::path::PathBuf;

use crate::location::TitleTailRules;
use crate::reconcile::CrossFillRules;

pub struct FetchSettings {
    pub user_agent: &'static str,
    pub accept_language: &'static str,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub page_cache_capacity: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            accept_language: "en-US,en;q=0.9,fr-FR;q=0.8,fr;q=0.7",
            timeout_secs: 25,
            rate_limit_ms: 0,
            max_retries: 4,
            backoff_factor: 0.8,
            page_cache_capacity: 1024,
        }
    }
}

/// Limits on detail-page fetches made only to recover a venue
pub struct EnrichmentSettings {
    pub wpa_limit: usize,
    pub matchroom_limit: usize,
    pub epbf_limit: usize,
    pub sleep_ms: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            wpa_limit: 250,
            matchroom_limit: 250,
            epbf_limit: 250,
            sleep_ms: 0,
        }
    }
}

#[derive(Default)]
pub struct ReconcileSettings {
    pub cross_fill: CrossFillRules,
    pub title_tail: TitleTailRules,
}

pub struct OutputSettings {
    pub cache_dir: PathBuf,
    pub database_path: PathBuf,
    pub ics_path: PathBuf,
    pub conflicts_ics_path: PathBuf,
    pub calendar_name: String,
    pub uid_domain: String,
    pub summary_limit: usize,
    pub missing_limit: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "tournaments.db".to_string());

        Self {
            cache_dir: PathBuf::from("cache"),
            database_path: PathBuf::from(database_path),
            ics_path: PathBuf::from("tournaments.ics"),
            conflicts_ics_path: PathBuf::from("tournaments-conflicts.ics"),
            calendar_name: "US Pool – Tournaments".to_string(),
            uid_domain: "uspool.local".to_string(),
            summary_limit: 25,
            missing_limit: 40,
        }
    }
}

/// Years of EPBF calendars to read, starting with the `from` year
pub const DEFAULT_EPBF_YEARS: i32 = 2;

pub struct AppConfig {
    pub fetch: FetchSettings,
    pub enrichment: EnrichmentSettings,
    pub reconcile: ReconcileSettings,
    pub output: OutputSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            fetch: FetchSettings::default(),
            enrichment: EnrichmentSettings::default(),
            reconcile: ReconcileSettings::default(),
            output: OutputSettings::default(),
        }
    }
}
