use anyhow::{Context, Result};
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TournamentRecord;
use crate::errors::cache_context;

/// Key of the records collected by `ingest` and read back by `process`
pub const RAW_RECORDS_KEY: &str = "raw_records";

/// File-based JSON cache under `<cache_dir>/parsed/`
pub struct Cache {
    parsed_dir: PathBuf,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let parsed_dir = cache_dir.as_ref().join("parsed");
        fs::create_dir_all(&parsed_dir).context("Failed to create parsed cache directory")?;
        Ok(Self { parsed_dir })
    }

    pub fn save_parsed<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_parsed_path(key);
        let json = serde_json::to_string_pretty(data).with_context(|| cache_context("serialize", key))?;
        fs::write(&file_path, json).with_context(|| cache_context("write", key))?;
        info!("Saved parsed data to cache: {}", file_path.display());
        Ok(())
    }

    pub fn load_parsed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let file_path = self.build_parsed_path(key);
        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path).with_context(|| cache_context("read", key))?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                file_path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }

    // --- Raw records ---

    pub fn save_records(&self, records: &[TournamentRecord]) -> Result<()> {
        self.save_parsed(RAW_RECORDS_KEY, &records)
    }

    /// Records from the last ingestion; an error if none has run yet
    pub fn load_records(&self) -> Result<Vec<TournamentRecord>> {
        self.load_parsed(RAW_RECORDS_KEY)?.ok_or_else(|| {
            anyhow::anyhow!(
                "No raw records found in cache at {}, run `ingest` first",
                self.build_parsed_path(RAW_RECORDS_KEY).display()
            )
        })
    }

    fn build_parsed_path(&self, key: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.json", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(title: &str) -> TournamentRecord {
        let day = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        TournamentRecord {
            title: title.to_string(),
            organizer: "EPBF".to_string(),
            start: day,
            end: day,
            location: Some("Veldhoven, Netherlands".to_string()),
            tour: None,
            source: "EPBF calendar table".to_string(),
            source_url: "https://www.epbf.com/calendar/2026/".to_string(),
        }
    }

    #[test]
    fn test_records_survive_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("cache");
        let cache = Cache::new(&dir).unwrap();
        let records = vec![record("Euro Tour"), record("Dynamic Cup")];

        cache.save_records(&records).unwrap();
        assert!(dir.join("parsed").join("raw_records.json").exists());
        assert_eq!(cache.load_records().unwrap(), records);
    }

    #[test]
    fn test_missing_records_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = Cache::new(tmp.path()).unwrap();

        assert!(cache.load_records().is_err());
        assert_eq!(cache.load_parsed::<Vec<String>>("nothing").unwrap(), None);
    }
}
