use chrono::NaiveDate;
use log::debug;
use std::collections::HashMap;

use crate::domain::TournamentRecord;
use crate::location::Precision;
use crate::text::jaccard;

/// Minimum title similarity for borrowing a location (empirically tuned)
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.28;
/// Allowed difference between the two events' last days
pub const DEFAULT_END_TOLERANCE_DAYS: i64 = 1;

#[derive(Debug, Clone)]
pub struct CrossFillRules {
    pub similarity_threshold: f64,
    pub end_tolerance_days: i64,
}

impl Default for CrossFillRules {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            end_tolerance_days: DEFAULT_END_TOLERANCE_DAYS,
        }
    }
}

/// Give imprecisely located events the venue of a near-identical sibling
///
/// A sibling starts on the same day, ends within the tolerance, is located
/// precisely and has a similar title. The most similar sibling wins; ties go
/// to the earliest in input order.
pub fn cross_fill(records: &[TournamentRecord], rules: &CrossFillRules) -> Vec<TournamentRecord> {
    let by_start = index_by_start(records);
    let mut filled = 0;

    let out: Vec<TournamentRecord> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            if record.precision() == Precision::Fine {
                return record.clone();
            }
            let siblings = by_start.get(&record.start).map(Vec::as_slice).unwrap_or_default();
            match best_sibling_location(idx, record, siblings, records, rules) {
                Some(location) if record.location.as_deref() != Some(location) => {
                    filled += 1;
                    record.with_location(Some(location.to_string()))
                }
                _ => record.clone(),
            }
        })
        .collect();

    debug!("Cross-fill: upgraded {} locations", filled);
    out
}

fn index_by_start(records: &[TournamentRecord]) -> HashMap<NaiveDate, Vec<usize>> {
    let mut by_start: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        by_start.entry(record.start).or_default().push(idx);
    }
    by_start
}

fn best_sibling_location<'a>(
    idx: usize,
    target: &TournamentRecord,
    siblings: &[usize],
    records: &'a [TournamentRecord],
    rules: &CrossFillRules,
) -> Option<&'a str> {
    let mut best: Option<(f64, &'a str)> = None;

    for &sibling_idx in siblings {
        if sibling_idx == idx {
            continue;
        }
        let candidate = &records[sibling_idx];
        if !is_eligible(target, candidate, rules) {
            continue;
        }
        let similarity = jaccard(&target.title, &candidate.title);
        if similarity < rules.similarity_threshold {
            continue;
        }
        if best.is_none_or(|(score, _)| similarity > score) {
            best = candidate.location.as_deref().map(|loc| (similarity, loc));
        }
    }

    best.map(|(_, location)| location)
}

fn is_eligible(target: &TournamentRecord, candidate: &TournamentRecord, rules: &CrossFillRules) -> bool {
    candidate.precision() == Precision::Fine
        && (candidate.end - target.end).num_days().abs() <= rules.end_tolerance_days
}
