use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::text::norm_spaces;

static EPBF_SAME_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2}) ([a-z]{3,9})$").expect("valid date regex"));

static EPBF_TWO_MONTHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}) ([a-z]{3,9}) - (\d{1,2}) ([a-z]{3,9})$").expect("valid date regex")
});

static EPBF_TWO_MONTHS_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}) ([a-z]{3,9}) - (\d{1,2})-(\d{1,2}) ([a-z]{3,9})$").expect("valid date regex")
});

static MATCHROOM_SAME_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+) (\d{1,2}) - (\d{1,2}) (\d{4})$").expect("valid date regex")
});

static MATCHROOM_TWO_MONTHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+) (\d{1,2}) - ([A-Za-z]+) (\d{1,2}) (\d{4})$").expect("valid date regex")
});

static SHORT_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<mon1>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\s+(?P<d1>\d{1,2})\s*-\s*(?:(?P<mon2>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\s+)?(?P<d2>\d{1,2})$",
    )
    .expect("valid date regex")
});

/// Month number from an English month name or abbreviation ("sept" included)
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let month = match lower.as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Event still worth listing on `from`: starts later or is under way
pub fn is_upcoming_or_ongoing(start: NaiveDate, end: NaiveDate, from: NaiveDate) -> bool {
    start >= from || (start < from && from <= end)
}

/// EPBF calendar cells: "4-8 mar", "28 feb - 3 mar", "28 feb - 2-3 mar"
pub fn parse_epbf_date_range(raw: &str, year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let s = norm_spaces(&normalize_dashes(&raw.to_lowercase()));

    if let Some(caps) = EPBF_SAME_MONTH.captures(&s) {
        let month = month_of(&caps, 3)?;
        return ordered_range(
            make_date(year, month, day_of(&caps, 1)?)?,
            make_date(year, month, day_of(&caps, 2)?)?,
        );
    }
    if let Some(caps) = EPBF_TWO_MONTHS.captures(&s) {
        return ordered_range(
            make_date(year, month_of(&caps, 2)?, day_of(&caps, 1)?)?,
            make_date(year, month_of(&caps, 4)?, day_of(&caps, 3)?)?,
        );
    }
    if let Some(caps) = EPBF_TWO_MONTHS_SPLIT.captures(&s) {
        return ordered_range(
            make_date(year, month_of(&caps, 2)?, day_of(&caps, 1)?)?,
            make_date(year, month_of(&caps, 5)?, day_of(&caps, 4)?)?,
        );
    }
    Err(anyhow!("Unrecognized EPBF date format: {:?}", raw))
}

/// Matchroom schedule dates: "March 3 - 8 2026", "February 27 - March 1 2026"
pub fn parse_matchroom_date_range(raw: &str) -> Result<(NaiveDate, NaiveDate)> {
    let s = norm_spaces(&normalize_dashes(raw));

    if let Some(caps) = MATCHROOM_SAME_MONTH.captures(&s) {
        let year = year_of(&caps, 4)?;
        let month = month_of(&caps, 1)?;
        return ordered_range(
            make_date(year, month, day_of(&caps, 2)?)?,
            make_date(year, month, day_of(&caps, 3)?)?,
        );
    }
    if let Some(caps) = MATCHROOM_TWO_MONTHS.captures(&s) {
        let year = year_of(&caps, 5)?;
        return ordered_range(
            make_date(year, month_of(&caps, 1)?, day_of(&caps, 2)?)?,
            make_date(year, month_of(&caps, 3)?, day_of(&caps, 4)?)?,
        );
    }
    Err(anyhow!("Unrecognized Matchroom date format: {:?}", raw))
}

/// Article schedule lines without a year: "Mar 5 - 8", "Sept 30 - Oct 4"
pub fn parse_short_range(line: &str, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let caps = SHORT_RANGE.captures(line)?;
    let month1 = month_number(caps.name("mon1")?.as_str())?;
    let month2 = caps
        .name("mon2")
        .map_or(Some(month1), |m| month_number(m.as_str()))?;
    let start = make_date(year, month1, caps.name("d1")?.as_str().parse().ok()?).ok()?;
    let end = make_date(year, month2, caps.name("d2")?.as_str().parse().ok()?).ok()?;
    ordered_range(start, end).ok()
}

pub fn normalize_dashes(s: &str) -> String {
    s.replace(['\u{2013}', '\u{2014}'], "-")
}

fn month_of(caps: &Captures, group: usize) -> Result<u32> {
    let name = &caps[group];
    month_number(name).ok_or_else(|| anyhow!("Unknown month: {:?}", name))
}

fn day_of(caps: &Captures, group: usize) -> Result<u32> {
    caps[group]
        .parse()
        .with_context(|| format!("Invalid day: {:?}", &caps[group]))
}

fn year_of(caps: &Captures, group: usize) -> Result<i32> {
    caps[group]
        .parse()
        .with_context(|| format!("Invalid year: {:?}", &caps[group]))
}

fn make_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("Invalid date: {}-{:02}-{:02}", year, month, day))
}

// A range written without years that crosses New Year ends in the next year
fn ordered_range(start: NaiveDate, end: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    if end >= start {
        return Ok((start, end));
    }
    let rolled = make_date(end.year() + 1, end.month(), end.day())?;
    Ok((start, rolled))
}
