//! iCalendar export of the reconciled table: one calendar with every event and
//! one with the conflicting events only.

use anyhow::{Context, Result};
use chrono::Duration;
use log::info;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::config::settings::OutputSettings;
use crate::domain::ReconciledRecord;

const PRODID: &str = "-//US Pool Calendar//pool_calendar//EN";
const MAX_LINE_OCTETS: usize = 75;
const CONFLICT_PREFIX: &str = "⚠ ";
const CONFLICT_CATEGORY: &str = "CONFLICT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarStats {
    pub events: usize,
    pub conflicts: usize,
}

/// Writes the full and conflicts-only calendars to the configured paths
pub fn write_calendars(records: &[ReconciledRecord], output: &OutputSettings) -> Result<CalendarStats> {
    let all = render_calendar(&output.calendar_name, records.iter(), &output.uid_domain);
    write_file(&output.ics_path, &all)?;

    let conflicting: Vec<&ReconciledRecord> = records.iter().filter(|r| r.conflict).collect();
    let conflicts_name = format!("{} (Conflicts)", output.calendar_name);
    let conflicts = render_calendar(&conflicts_name, conflicting.iter().copied(), &output.uid_domain);
    write_file(&output.conflicts_ics_path, &conflicts)?;

    info!(
        "  → Wrote {} events to {} and {} conflicts to {}",
        records.len(),
        output.ics_path.display(),
        conflicting.len(),
        output.conflicts_ics_path.display()
    );

    Ok(CalendarStats {
        events: records.len(),
        conflicts: conflicting.len(),
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write calendar: {}", path.display()))
}

/// Complete VCALENDAR document with CRLF line endings
pub fn render_calendar<'a>(
    name: &str,
    records: impl Iterator<Item = &'a ReconciledRecord>,
    uid_domain: &str,
) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        format!("PRODID:{}", PRODID),
        "VERSION:2.0".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(name)),
    ];

    for record in records {
        lines.extend(event_lines(record, uid_domain));
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold_line(&line));
        out.push_str("\r\n");
    }
    out
}

fn event_lines(reconciled: &ReconciledRecord, uid_domain: &str) -> Vec<String> {
    let record = &reconciled.record;
    let mut lines = vec![
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", stable_uid(reconciled, uid_domain)),
        format!("DTSTART;VALUE=DATE:{}", record.start.format("%Y%m%d")),
        // all-day events end exclusively
        format!(
            "DTEND;VALUE=DATE:{}",
            (record.end + Duration::days(1)).format("%Y%m%d")
        ),
    ];

    if reconciled.conflict {
        lines.push(format!("SUMMARY:{}{}", CONFLICT_PREFIX, escape_text(&record.title)));
        lines.push(format!("CATEGORIES:{}", CONFLICT_CATEGORY));
    } else {
        lines.push(format!("SUMMARY:{}", escape_text(&record.title)));
    }

    if let Some(location) = record.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }

    let description = [
        format!("Organizer: {}", record.organizer),
        format!("Tour: {}", record.tour.as_deref().unwrap_or_default()),
        format!("Source: {}", record.source),
        format!("URL: {}", record.source_url),
    ]
    .join("\n");
    lines.push(format!("DESCRIPTION:{}", escape_text(&description)));

    if !record.source_url.is_empty() {
        lines.push(format!("URL:{}", record.source_url));
    }

    lines.push("END:VEVENT".to_string());
    lines
}

/// Same event, same UID across runs: sha256 of organizer|start|end|title
///
/// Not interchangeable with sha1-derived UIDs; a subscriber switching feeds
/// sees every event once per UID scheme.
pub fn stable_uid(reconciled: &ReconciledRecord, uid_domain: &str) -> String {
    let record = &reconciled.record;
    let raw = format!(
        "{}|{}|{}|{}",
        record.organizer,
        record.start_iso(),
        record.end_iso(),
        record.title
    );
    format!("{}@{}", hex::encode(Sha256::digest(raw.as_bytes())), uid_domain)
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Splits a content line into chunks of at most 75 octets, never inside a character
pub fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut octets = 0;

    for c in line.chars() {
        let width = c.len_utf8();
        if octets + width > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            octets = 1;
        }
        out.push(c);
        octets += width;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TournamentRecord;
    use chrono::NaiveDate;

    fn reconciled(title: &str, location: Option<&str>, conflict: bool) -> ReconciledRecord {
        ReconciledRecord {
            record: TournamentRecord {
                title: title.to_string(),
                organizer: "Matchroom".to_string(),
                start: NaiveDate::from_ymd_opt(2026, 12, 30).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
                location: location.map(str::to_string),
                tour: Some("WNT (Major)".to_string()),
                source: "Matchroom schedule".to_string(),
                source_url: "https://matchroompool.com/events/x/".to_string(),
            },
            conflict,
        }
    }

    #[test]
    fn test_event_dates_are_all_day_exclusive() {
        let ics = render_calendar("Pool", [reconciled("Finals", None, false)].iter(), "uspool.local");

        assert!(ics.contains("DTSTART;VALUE=DATE:20261230\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20270101\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Pool\r\n"));
        assert!(!ics.contains("LOCATION"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_conflicting_events_are_marked() {
        let ics = render_calendar(
            "Pool",
            [reconciled("Mosconi Cup", Some("Alexandra Palace, London, UK"), true)].iter(),
            "uspool.local",
        );

        assert!(ics.contains("SUMMARY:⚠ Mosconi Cup\r\n"));
        assert!(ics.contains("CATEGORIES:CONFLICT\r\n"));
        assert!(ics.contains("LOCATION:Alexandra Palace\\, London\\, UK\r\n"));
        assert!(ics.contains("DESCRIPTION:Organizer: Matchroom\\nTour: WNT (Major)\\nSource: Matchroom schedule\\nURL: https://matchroompool.com/events/x/"));
    }

    #[test]
    fn test_uid_is_stable_and_ignores_location() {
        let a = stable_uid(&reconciled("Finals", None, false), "uspool.local");
        let b = stable_uid(&reconciled("Finals", Some("Vegas, USA"), true), "uspool.local");
        let c = stable_uid(&reconciled("Finals 2", None, false), "uspool.local");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.ends_with("@uspool.local"));
        assert_eq!(a.split('@').next().unwrap().len(), 64);
    }

    #[test]
    fn test_uid_digest_is_pinned() {
        assert_eq!(
            stable_uid(&reconciled("Finals", None, false), "uspool.local"),
            "98221d60b3ef37432dc8437fcf9ba6eac131701eee2423a68d64e8edf13eea70@uspool.local"
        );
    }

    #[test]
    fn test_fold_line_respects_octets_and_chars() {
        let line = format!("SUMMARY:{}", "é".repeat(60));
        let folded = fold_line(&line);

        for physical in folded.split("\r\n") {
            assert!(physical.len() <= MAX_LINE_OCTETS);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
        assert_eq!(fold_line("short"), "short");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d\r\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn test_write_calendars() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let output = OutputSettings {
            ics_path: dir.join("all.ics"),
            conflicts_ics_path: dir.join("conflicts.ics"),
            ..OutputSettings::default()
        };
        let records = vec![reconciled("A", None, true), reconciled("B", None, false)];

        let stats = write_calendars(&records, &output).unwrap();

        assert_eq!(stats, CalendarStats { events: 2, conflicts: 1 });
        let conflicts = fs::read_to_string(&output.conflicts_ics_path).unwrap();
        assert_eq!(conflicts.matches("BEGIN:VEVENT").count(), 1);
        assert!(conflicts.contains("X-WR-CALNAME:US Pool – Tournaments (Conflicts)"));
    }
}
