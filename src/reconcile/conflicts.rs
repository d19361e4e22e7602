use std::collections::BTreeSet;

use crate::domain::{ReconciledRecord, TournamentRecord};

/// Positions (in the input slice) of records sharing a day with another record
pub type ConflictSet = BTreeSet<usize>;

/// Sweep over records sorted by (start, end, title) marking every
/// overlapping pair, shared boundary days included.
///
/// Cost is near-linear for sparse calendars and quadratic for dense clusters.
pub fn detect_conflicts(records: &[TournamentRecord]) -> ConflictSet {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&i, &j| {
        let (a, b) = (&records[i], &records[j]);
        (a.start, a.end, &a.title).cmp(&(b.start, b.end, &b.title))
    });

    let mut conflicts = ConflictSet::new();
    for (pos, &i) in order.iter().enumerate() {
        let a = &records[i];
        for &j in &order[pos + 1..] {
            let b = &records[j];
            if b.start > a.end {
                break;
            }
            if a.overlaps(b) {
                conflicts.insert(i);
                conflicts.insert(j);
            }
        }
    }
    conflicts
}

/// Attach the conflict flag to every record, keeping input order
pub fn flag_conflicts(records: Vec<TournamentRecord>) -> Vec<ReconciledRecord> {
    let conflicts = detect_conflicts(&records);
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| ReconciledRecord {
            record,
            conflict: conflicts.contains(&idx),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(title: &str, start: (u32, u32), end: (u32, u32)) -> TournamentRecord {
        TournamentRecord {
            title: title.to_string(),
            organizer: "Matchroom".to_string(),
            start: NaiveDate::from_ymd_opt(2026, start.0, start.1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, end.0, end.1).unwrap(),
            location: None,
            tour: None,
            source: "test".to_string(),
            source_url: String::new(),
        }
    }

    #[test]
    fn test_shared_boundary_day_conflicts() {
        let records = vec![
            record("A", (4, 10), (4, 12)),
            record("B", (4, 12), (4, 15)),
        ];
        assert_eq!(detect_conflicts(&records), ConflictSet::from([0, 1]));
    }

    #[test]
    fn test_adjacent_days_do_not_conflict() {
        let records = vec![
            record("A", (4, 10), (4, 12)),
            record("C", (4, 13), (4, 15)),
        ];
        assert!(detect_conflicts(&records).is_empty());
    }

    #[test]
    fn test_long_event_overlaps_later_short_ones() {
        let records = vec![
            record("Short late", (5, 20), (5, 20)),
            record("Long", (5, 1), (5, 30)),
            record("Short early", (5, 2), (5, 3)),
            record("Outside", (6, 1), (6, 2)),
        ];
        assert_eq!(detect_conflicts(&records), ConflictSet::from([0, 1, 2]));
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        let records = vec![
            record("A", (1, 1), (1, 3)),
            record("B", (1, 3), (1, 4)),
            record("C", (1, 5), (1, 5)),
            record("D", (1, 5), (1, 6)),
            record("E", (1, 8), (1, 9)),
        ];
        let conflicts = detect_conflicts(&records);
        for i in 0..records.len() {
            for j in 0..records.len() {
                if i != j && records[i].overlaps(&records[j]) {
                    assert!(conflicts.contains(&i) && conflicts.contains(&j));
                }
            }
        }
        assert_eq!(conflicts, ConflictSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn test_flag_conflicts_keeps_order() {
        let flagged = flag_conflicts(vec![
            record("A", (4, 10), (4, 12)),
            record("Z", (7, 1), (7, 2)),
            record("B", (4, 12), (4, 15)),
        ]);
        let flags: Vec<(&str, bool)> = flagged
            .iter()
            .map(|r| (r.record.title.as_str(), r.conflict))
            .collect();
        assert_eq!(flags, vec![("A", true), ("Z", false), ("B", true)]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(detect_conflicts(&[]).is_empty());
        assert!(detect_conflicts(&[record("A", (1, 1), (1, 2))]).is_empty());
    }
}
