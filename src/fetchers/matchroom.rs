use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::dates::{is_upcoming_or_ongoing, parse_matchroom_date_range};
use super::{Enricher, EnrichmentBudget, PageFetcher};
use crate::config::sources::{MATCHROOM_BASE_URL, MATCHROOM_SCHEDULE_URL};
use crate::domain::TournamentRecord;
use crate::errors::{fetch_context, parse_context};
use crate::location::{is_suspicious, location_from_title, TitleTailRules};
use crate::text::{clean_title, norm_spaces};

pub const ORGANIZER: &str = "Matchroom";
pub const SOURCE: &str = "Matchroom schedule";

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b20\d{2}\b").expect("valid year regex"));

static LEADING_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(January|February|March|April|May|June|July|August|September|October|November|December)\b",
    )
    .expect("valid month regex")
});

static DATE_AND_REST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?\b20\d{2}\b)\s+(.*)$").expect("valid schedule regex"));

static EVENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Ranking|Major|Non-Ranking|Junior|Blue Ribbon)\s+(.*)$").expect("valid event type regex")
});

/// One schedule row before venue lookup
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub record: TournamentRecord,
    pub event_url: String,
}

/// Reads the schedule page and resolves each event's venue
pub async fn fetch_matchroom<F: PageFetcher>(
    enricher: &mut Enricher<F>,
    from: NaiveDate,
    budget: &mut EnrichmentBudget,
    rules: &TitleTailRules,
) -> Result<Vec<TournamentRecord>> {
    let html = enricher
        .fetch_text(MATCHROOM_SCHEDULE_URL)
        .await
        .with_context(|| fetch_context(MATCHROOM_SCHEDULE_URL))?;

    let entries = parse_schedule(&html, from);
    info!("  → Matchroom: {} upcoming events", entries.len());

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let from_page = enricher
            .location_for(&entry.event_url, budget)
            .await
            .filter(|loc| !is_suspicious(loc, rules));

        let location = from_page.or_else(|| location_from_title(&entry.record.title, rules));
        records.push(entry.record.with_location(location));
    }

    Ok(records)
}

/// Upcoming events listed on the schedule page, without locations
pub fn parse_schedule(html: &str, from: NaiveDate) -> Vec<ScheduleEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let pieces: Vec<&str> = anchor.text().map(str::trim).filter(|t| !t.is_empty()).collect();
        let text = norm_spaces(&pieces.join(" "));

        let href = anchor.value().attr("href").map(str::trim).filter(|h| !h.is_empty());
        if let Some(entry) = schedule_entry(&text, href, from) {
            entries.push(entry);
        }
    }

    entries
}

fn schedule_entry(text: &str, href: Option<&str>, from: NaiveDate) -> Option<ScheduleEntry> {
    if !YEAR.is_match(text) || !LEADING_MONTH.is_match(text) {
        return None;
    }

    let caps = DATE_AND_REST.captures(text)?;
    let date_part = caps[1].trim();
    let rest = caps[2].trim();

    let (start, end) = match parse_matchroom_date_range(date_part) {
        Ok(range) => range,
        Err(e) => {
            debug!("Skipping Matchroom entry: {}: {:#}", parse_context("date range", text), e);
            return None;
        }
    };
    if !is_upcoming_or_ongoing(start, end, from) {
        return None;
    }

    let (tour, title) = match EVENT_TYPE.captures(rest) {
        Some(m) => (format!("WNT ({})", &m[1]), clean_title(m[2].trim())),
        None => ("WNT".to_string(), clean_title(rest)),
    };
    if title.is_empty() {
        return None;
    }

    let event_url = absolute_url(href.unwrap_or(MATCHROOM_SCHEDULE_URL));

    Some(ScheduleEntry {
        record: TournamentRecord {
            title,
            organizer: ORGANIZER.to_string(),
            start,
            end,
            location: None,
            tour: Some(tour),
            source: SOURCE.to_string(),
            source_url: event_url.clone(),
        },
        event_url,
    })
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", MATCHROOM_BASE_URL, href)
    }
}
