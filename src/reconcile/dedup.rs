use log::debug;

use crate::domain::{RecordCollection, TournamentRecord};

/// Collapse records describing the same event (same slugged title and start)
///
/// Output keeps the order in which each event was first seen.
pub fn resolve(records: Vec<TournamentRecord>) -> Vec<TournamentRecord> {
    let total = records.len();
    let mut collection = RecordCollection::new();

    for record in records {
        collection.merge_with(record, choose_better);
    }

    debug!("Dedup: {} records -> {} events", total, collection.len());
    collection.into_vec()
}

/// The more precisely located of two copies of one event
///
/// On equal precision the first-seen copy wins, borrowing the other's
/// location when it has none of its own.
pub fn choose_better(seen: &TournamentRecord, other: TournamentRecord) -> TournamentRecord {
    let seen_precision = seen.precision();
    let other_precision = other.precision();

    if other_precision > seen_precision {
        return other;
    }
    if seen.location.is_none() && other.location.is_some() {
        return seen.with_location(other.location);
    }
    seen.clone()
}
