use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::Cache;
use crate::config::settings::AppConfig;
use crate::database::{self, setup::reset_database, tournaments};
use crate::domain::ReconciledRecord;
use crate::export::write_calendars;
use crate::reconcile::reconcile;

/// Counts reported at the end of a processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub raw_records: usize,
    pub events: usize,
    pub conflicts: usize,
    pub missing_location: usize,
}

pub struct ProcessingService {
    config: AppConfig,
    cache: Cache,
}

impl ProcessingService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let cache = Cache::new(&config.output.cache_dir)?;
        Ok(Self { config, cache })
    }

    pub fn run(&self) -> Result<RunSummary> {
        info!("=== Starting Data Processing (Atomic) ===\n");

        let records = self.cache.load_records()?;
        let raw_records = records.len();
        info!("  → Loaded {} raw records from cache\n", raw_records);

        let reconciled = reconcile(records, &self.config.reconcile);

        self.write_database(&reconciled)?;
        let stats = write_calendars(&reconciled, &self.config.output)?;

        let summary = RunSummary {
            raw_records,
            events: stats.events,
            conflicts: stats.conflicts,
            missing_location: missing_locations(&reconciled).count(),
        };
        self.print_summary(&reconciled, &summary);

        info!("=== Processing Complete ===");
        Ok(summary)
    }

    /// Builds the table in a temporary file and swaps it over the target
    fn write_database(&self, records: &[ReconciledRecord]) -> Result<()> {
        let db_path = &self.config.output.database_path;
        let temp_db_path = temp_path(db_path);
        info!("Target DB: {}, Temp DB: {}", db_path.display(), temp_db_path.display());

        if temp_db_path.exists() {
            fs::remove_file(&temp_db_path)
                .with_context(|| format!("Failed to remove stale {}", temp_db_path.display()))?;
        }

        {
            let pool = database::create_pool(&temp_db_path)?;
            let mut conn = database::get_connection(&pool)?;
            reset_database(&mut conn)?;
            let inserted = tournaments::insert_all(&mut conn, records)?;
            info!("  → Inserted {} tournaments", inserted);
        }

        fs::rename(&temp_db_path, db_path)
            .with_context(|| format!("Failed to move database into place: {}", db_path.display()))?;
        info!("Successfully swapped database to {}", db_path.display());
        Ok(())
    }

    fn print_summary(&self, records: &[ReconciledRecord], summary: &RunSummary) {
        let output = &self.config.output;

        println!(
            "\n{} {} events from {} raw records, {} in conflict",
            "Reconciled".green().bold(),
            summary.events,
            summary.raw_records,
            summary.conflicts.to_string().yellow()
        );

        for reconciled in records.iter().take(output.summary_limit) {
            let line = summary_line(reconciled);
            if reconciled.conflict {
                println!("  {}", line.yellow());
            } else {
                println!("  {}", line);
            }
        }
        if records.len() > output.summary_limit {
            println!("  ... {} more", records.len() - output.summary_limit);
        }

        if summary.missing_location == 0 {
            return;
        }
        println!(
            "\n{}: {} events without a location",
            "warning".yellow(),
            summary.missing_location
        );
        for reconciled in missing_locations(records).take(output.missing_limit) {
            let r = &reconciled.record;
            println!("  - [{}] {} ({})", r.organizer, r.title, r.source_url);
        }
    }
}

fn summary_line(reconciled: &ReconciledRecord) -> String {
    let r = &reconciled.record;
    format!(
        "{} → {} | {} | {} | {}",
        r.start_iso(),
        r.end_iso(),
        r.title,
        r.location.as_deref().unwrap_or("—"),
        r.organizer
    )
}

fn missing_locations(records: &[ReconciledRecord]) -> impl Iterator<Item = &ReconciledRecord> {
    records.iter().filter(|r| r.record.location.is_none())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = OsString::from(path.as_os_str());
    temp.push(".tmp");
    PathBuf::from(temp)
}
