use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::location::{self, Precision};
use crate::text::slug;

/// One tournament as reported by a single source
///
/// Records are values: every reconciliation step builds new records instead of
/// mutating the ones it was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub title: String,
    pub organizer: String,
    pub start: NaiveDate,
    /// Inclusive last day of the event
    pub end: NaiveDate,
    pub location: Option<String>,
    pub tour: Option<String>,
    pub source: String,
    pub source_url: String,
}

/// Key under which records from different sources collapse into one event
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub slug: String,
    pub start: NaiveDate,
}

impl TournamentRecord {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            slug: slug(&self.title),
            start: self.start,
        }
    }

    pub fn precision(&self) -> Precision {
        location::precision(self.location.as_deref())
    }

    /// Copy of this record carrying another location
    pub fn with_location(&self, location: Option<String>) -> Self {
        Self {
            location,
            ..self.clone()
        }
    }

    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    pub fn is_well_formed(&self) -> bool {
        !self.title.is_empty() && self.end >= self.start
    }

    /// Both events share at least one calendar day
    pub fn overlaps(&self, other: &TournamentRecord) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Pipeline output: the canonical record plus its calendar conflict flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    #[serde(flatten)]
    pub record: TournamentRecord,
    pub conflict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, start: (u32, u32), end: (u32, u32)) -> TournamentRecord {
        TournamentRecord {
            title: title.to_string(),
            organizer: "WPA".to_string(),
            start: NaiveDate::from_ymd_opt(2026, start.0, start.1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, end.0, end.1).unwrap(),
            location: None,
            tour: None,
            source: "test".to_string(),
            source_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_identity_key_ignores_case_and_accents() {
        let a = record("Open de España", (5, 1), (5, 3));
        let b = record("OPEN DE ESPANA", (5, 1), (5, 4));
        assert_eq!(a.identity_key(), b.identity_key());

        let c = record("Open de España", (5, 2), (5, 3));
        assert_ne!(a.identity_key(), c.identity_key());
    }

    #[test]
    fn test_with_location_leaves_original_untouched() {
        let original = record("US Open", (3, 1), (3, 5));
        let located = original.with_location(Some("Las Vegas, USA".to_string()));

        assert_eq!(original.location, None);
        assert_eq!(located.location.as_deref(), Some("Las Vegas, USA"));
        assert_eq!(located.title, original.title);
        assert_eq!(located.precision(), Precision::Fine);
    }

    #[test]
    fn test_overlaps_is_inclusive() {
        let a = record("A", (4, 10), (4, 12));
        let b = record("B", (4, 12), (4, 15));
        let c = record("C", (4, 13), (4, 15));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_iso_dates() {
        let a = record("A", (4, 1), (4, 12));
        assert_eq!(a.start_iso(), "2026-04-01");
        assert_eq!(a.end_iso(), "2026-04-12");
        assert!(a.is_well_formed());
    }
}
