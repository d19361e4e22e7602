//! Reconciliation pipeline: dedup -> cross-fill -> sort -> conflict flags.
//!
//! Every stage is a pure function over already fetched records.

pub mod conflicts;
pub mod cross_fill;
pub mod dedup;

pub use conflicts::{detect_conflicts, flag_conflicts, ConflictSet};
pub use cross_fill::{cross_fill, CrossFillRules};
pub use dedup::{choose_better, resolve};

use log::info;

use crate::config::settings::ReconcileSettings;
use crate::domain::{ReconciledRecord, TournamentRecord};

/// Canonical dataset from raw per-source records, sorted by (start, title)
pub fn reconcile(records: Vec<TournamentRecord>, settings: &ReconcileSettings) -> Vec<ReconciledRecord> {
    let raw_count = records.len();

    let unique = resolve(records);
    let mut filled = cross_fill(&unique, &settings.cross_fill);
    sort_for_output(&mut filled);

    let flagged = flag_conflicts(filled);
    let conflict_count = flagged.iter().filter(|r| r.conflict).count();
    info!(
        "  → Reconciled {} raw records into {} events ({} in conflict)",
        raw_count,
        flagged.len(),
        conflict_count
    );
    flagged
}

pub fn sort_for_output(records: &mut [TournamentRecord]) {
    records.sort_by(|a, b| (a.start, &a.title).cmp(&(b.start, &b.title)));
}
