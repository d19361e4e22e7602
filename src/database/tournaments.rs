use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use crate::domain::{ReconciledRecord, TournamentRecord};

const COLUMNS: &str = "title, organizer, start_date, end_date, location, tour, source, source_url, conflict";

/// Writes the reconciled table in one transaction, keeping output order
pub fn insert_all(conn: &mut DbConn, records: &[ReconciledRecord]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to start transaction")?;
    {
        let sql = format!(
            "INSERT INTO tournaments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            COLUMNS
        );
        let mut stmt = tx.prepare(&sql).context("Failed to prepare tournament insert")?;

        for reconciled in records {
            let r = &reconciled.record;
            stmt.execute(params![
                r.title,
                r.organizer,
                r.start,
                r.end,
                r.location,
                r.tour,
                r.source,
                r.source_url,
                reconciled.conflict,
            ])
            .with_context(|| format!("Failed to insert tournament: {}", r.title))?;
        }
    }
    tx.commit().context("Failed to commit tournaments")?;

    Ok(records.len())
}

pub fn count(conn: &mut DbConn) -> Result<usize> {
    conn.query_row("SELECT COUNT(*) FROM tournaments", [], |row| row.get::<_, i64>(0))
        .map(|n| n as usize)
        .context("Failed to count tournaments")
}

/// All rows in insertion order
pub fn list_all(conn: &mut DbConn) -> Result<Vec<ReconciledRecord>> {
    let sql = format!("SELECT {} FROM tournaments ORDER BY id", COLUMNS);
    let mut stmt = conn.prepare(&sql).context("Failed to prepare tournament query")?;

    let rows = stmt
        .query_map([], parse_tournament_row)
        .context("Failed to query tournaments")?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read tournament rows")
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<ReconciledRecord> {
    Ok(ReconciledRecord {
        record: TournamentRecord {
            title: row.get(0)?,
            organizer: row.get(1)?,
            start: row.get(2)?,
            end: row.get(3)?,
            location: row.get(4)?,
            tour: row.get(5)?,
            source: row.get(6)?,
            source_url: row.get(7)?,
        },
        conflict: row.get(8)?,
    })
}
