use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::settings::{AppConfig, DEFAULT_EPBF_YEARS};
use crate::services::IngestOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Unified pool tournament calendar builder")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Fetch WPA, Matchroom, EPBF and PBS schedules into the record cache
    Ingest(IngestArgs),
    /// Reconcile cached records into the database and calendar files
    Process(ProcessArgs),
    /// Ingest, then process
    Run {
        #[command(flatten)]
        ingest: IngestArgs,
        #[command(flatten)]
        process: ProcessArgs,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct IngestArgs {
    /// Keep events ongoing or starting on/after this date (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Number of EPBF calendar years to read, starting with the --from year (at least 1)
    #[arg(long, default_value_t = DEFAULT_EPBF_YEARS)]
    pub years: i32,

    /// Detail pages fetched to recover WPA venues
    #[arg(long, default_value_t = 250)]
    pub wpa_enrich_limit: usize,

    /// Event pages fetched to recover Matchroom venues
    #[arg(long, default_value_t = 250)]
    pub matchroom_enrich_limit: usize,

    /// Event pages fetched to refine EPBF venues
    #[arg(long, default_value_t = 250)]
    pub epbf_enrich_limit: usize,

    /// Seconds to sleep after each enrichment fetch
    #[arg(long, default_value_t = 0.0)]
    pub sleep: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ProcessArgs {
    /// Calendar display name
    #[arg(long)]
    pub calname: Option<String>,

    /// Domain appended to event UIDs
    #[arg(long)]
    pub uid_domain: Option<String>,

    /// SQLite database to rebuild
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Calendar file with every event
    #[arg(long, value_name = "PATH")]
    pub ics: Option<PathBuf>,

    /// Calendar file with conflicting events only
    #[arg(long, value_name = "PATH")]
    pub ics_conflicts: Option<PathBuf>,
}

impl IngestArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        config.enrichment.wpa_limit = self.wpa_enrich_limit;
        config.enrichment.matchroom_limit = self.matchroom_enrich_limit;
        config.enrichment.epbf_limit = self.epbf_enrich_limit;
        config.enrichment.sleep_ms = (self.sleep.max(0.0) * 1000.0).round() as u64;
    }

    pub fn options(&self) -> IngestOptions {
        IngestOptions {
            from: self.from.unwrap_or_else(|| Local::now().date_naive()),
            epbf_years: self.years,
        }
    }
}

impl ProcessArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(name) = &self.calname {
            config.output.calendar_name = name.clone();
        }
        if let Some(domain) = &self.uid_domain {
            config.output.uid_domain = domain.clone();
        }
        if let Some(path) = &self.db {
            config.output.database_path = path.clone();
        }
        if let Some(path) = &self.ics {
            config.output.ics_path = path.clone();
        }
        if let Some(path) = &self.ics_conflicts {
            config.output.conflicts_ics_path = path.clone();
        }
    }
}
