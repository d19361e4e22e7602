use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::dates::{is_upcoming_or_ongoing, parse_epbf_date_range};
use super::enricher::is_poster_link;
use super::{Enricher, EnrichmentBudget, PageFetcher};
use crate::config::sources::{epbf_calendar_url, EPBF_BASE_URL};
use crate::domain::TournamentRecord;
use crate::errors::{fetch_context, parse_context};
use crate::location::{normalize, precision, Precision};
use crate::text::{clean_title, norm_spaces};

pub const ORGANIZER: &str = "EPBF";
pub const TOUR: &str = "EPBF Calendar";
pub const SOURCE: &str = "EPBF calendar table";

/// Location column when the header names none
const DEFAULT_LOCATION_COLUMN: usize = 2;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").expect("valid cell selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

/// Column positions resolved from a table header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub title: usize,
    pub location: usize,
}

/// A calendar row and the event page linked from its title
#[derive(Debug, Clone)]
pub struct CalendarRow {
    pub record: TournamentRecord,
    pub link: Option<String>,
}

/// Reads one year's calendar page and upgrades coarse locations from event pages
pub async fn fetch_epbf<F: PageFetcher>(
    enricher: &mut Enricher<F>,
    year: i32,
    from: NaiveDate,
    budget: &mut EnrichmentBudget,
) -> Result<Vec<TournamentRecord>> {
    let url = epbf_calendar_url(year);
    let html = enricher
        .fetch_text(&url)
        .await
        .with_context(|| fetch_context(&url))?;

    let rows = parse_calendar(&html, year, &url, from);
    info!("  → EPBF {}: {} upcoming events", year, rows.len());

    let mut records = Vec::with_capacity(rows.len());
    for CalendarRow { record, link } in rows {
        let current = record.precision();
        let upgraded = match link {
            Some(link) if current <= Precision::Coarse => enricher
                .location_for(&link, budget)
                .await
                .filter(|found| precision(Some(found.as_str())) > current),
            _ => None,
        };

        records.push(match upgraded {
            Some(found) => record.with_location(Some(found)),
            None => record,
        });
    }

    Ok(records)
}

/// Upcoming rows of every calendar table on the page
pub fn parse_calendar(html: &str, year: i32, page_url: &str, from: NaiveDate) -> Vec<CalendarRow> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();

    for table in document.select(&TABLE) {
        let mut table_rows = table.select(&ROW);
        let Some(columns) = table_rows.next().and_then(column_map) else {
            continue;
        };

        for tr in table_rows {
            let cells: Vec<ElementRef> = tr.select(&CELL).collect();
            if let Some(row) = calendar_row(&cells, columns, year, page_url, from) {
                rows.push(row);
            }
        }
    }

    rows
}

/// Maps header labels to columns; tables without date or title columns are ignored
pub fn column_map(header: ElementRef) -> Option<ColumnMap> {
    let headers: Vec<String> = header
        .select(&CELL)
        .map(|cell| cell_text(cell).to_lowercase())
        .collect();

    let index_of = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|name| h.contains(name)))
    };

    Some(ColumnMap {
        date: index_of(&["date"])?,
        title: index_of(&["tournament", "event", "competition", "name"])?,
        location: index_of(&["place", "location", "country", "city"]).unwrap_or(DEFAULT_LOCATION_COLUMN),
    })
}

fn calendar_row(
    cells: &[ElementRef],
    columns: ColumnMap,
    year: i32,
    page_url: &str,
    from: NaiveDate,
) -> Option<CalendarRow> {
    let title_cell = cells.get(columns.title)?;
    let raw_date = cells.get(columns.date).map(|c| cell_text(*c)).unwrap_or_default();
    if raw_date.is_empty() {
        return None;
    }

    let title = clean_title(&cell_text(*title_cell));
    if title.is_empty() {
        return None;
    }

    let (start, end) = match parse_epbf_date_range(&raw_date, year) {
        Ok(range) => range,
        Err(e) => {
            debug!("Skipping EPBF row: {}: {:#}", parse_context("date range", &title), e);
            return None;
        }
    };
    if !is_upcoming_or_ongoing(start, end, from) {
        return None;
    }

    let location = cells
        .get(columns.location)
        .and_then(|c| normalize(Some(cell_text(*c).as_str())));

    Some(CalendarRow {
        record: TournamentRecord {
            title,
            organizer: ORGANIZER.to_string(),
            start,
            end,
            location,
            tour: Some(TOUR.to_string()),
            source: SOURCE.to_string(),
            source_url: page_url.to_string(),
        },
        link: event_link(*title_cell),
    })
}

/// First link to an EPBF page that is not a poster
fn event_link(title_cell: ElementRef) -> Option<String> {
    title_cell.select(&ANCHOR).find_map(|a| {
        let href = a.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let href = if href.starts_with('/') {
            format!("{}{}", EPBF_BASE_URL, href)
        } else {
            href.to_string()
        };
        (!is_poster_link(&href) && href.contains("epbf.com")).then_some(href)
    })
}

fn cell_text(cell: ElementRef) -> String {
    let pieces: Vec<&str> = cell.text().map(str::trim).filter(|t| !t.is_empty()).collect();
    norm_spaces(&pieces.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::testing::FakeFetcher;
    use crate::fetchers::PageCache;

    const PAGE_URL: &str = "https://www.epbf.com/calendar/2026/";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const CALENDAR: &str = r#"
        <table>
          <tr><th>Date</th><th>Tournament</th><th>Place</th></tr>
          <tr><td>4-8 Mar</td><td><a href="/events/euro-tour-veldhoven/">Euro Tour Veldhoven Open</a></td><td>Netherlands</td></tr>
          <tr><td>28 Apr - 3 May</td><td><a href="https://www.epbf.com/poster.pdf">European Championships</a> Show Poster</td><td>Hotel Arena, Antalya / Tukey</td></tr>
          <tr><td>TBA</td><td>Mystery Cup</td><td>Spain</td></tr>
          <tr><td>2-4 Jan</td><td>Old Event</td><td>Austria</td></tr>
        </table>
        <table><tr><td>Sponsors</td><td>Logos</td></tr></table>
    "#;

    #[test]
    fn test_parse_calendar_rows() {
        let rows = parse_calendar(CALENDAR, 2026, PAGE_URL, d(2026, 2, 1));
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].record.title, "Euro Tour Veldhoven Open");
        assert_eq!(rows[0].record.location.as_deref(), Some("Netherlands"));
        assert_eq!(
            rows[0].link.as_deref(),
            Some("https://www.epbf.com/events/euro-tour-veldhoven/")
        );

        assert_eq!(rows[1].record.title, "European Championships");
        assert_eq!(rows[1].record.start, d(2026, 4, 28));
        assert_eq!(rows[1].record.end, d(2026, 5, 3));
        assert_eq!(rows[1].record.location.as_deref(), Some("Hotel Arena, Antalya, Turkey"));
        assert_eq!(rows[1].link, None);
    }

    #[test]
    fn test_column_map_defaults_location() {
        let html = Html::parse_fragment("<table><tr><td>Event name</td><td>Dates</td></tr></table>");
        let header = html.select(&ROW).next().unwrap();
        assert_eq!(
            column_map(header),
            Some(ColumnMap {
                date: 1,
                title: 0,
                location: DEFAULT_LOCATION_COLUMN
            })
        );
    }

    #[tokio::test]
    async fn test_coarse_location_upgraded_only_when_more_precise() {
        let page = r#"<script type="application/ld+json">
            {"@type": "Event", "location": {"name": "Koningshof", "address": {"addressLocality": "Veldhoven", "addressCountry": "Netherlands"}}}
        </script>"#;
        let fetcher = FakeFetcher::default()
            .with_page(PAGE_URL, CALENDAR)
            .with_page("https://www.epbf.com/events/euro-tour-veldhoven/", page);
        let mut enricher = Enricher::new(fetcher, PageCache::new(8), std::time::Duration::ZERO);
        let mut budget = EnrichmentBudget::new("EPBF", 10);

        let records = fetch_epbf(&mut enricher, 2026, d(2026, 2, 1), &mut budget).await.unwrap();

        assert_eq!(records[0].location.as_deref(), Some("Veldhoven, Netherlands"));
        assert_eq!(records[1].location.as_deref(), Some("Hotel Arena, Antalya, Turkey"));
        assert_eq!(budget.used(), 1);
    }
}
