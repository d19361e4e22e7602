use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};
use regex::Regex;
use std::sync::LazyLock;

use super::dates::is_upcoming_or_ongoing;
use super::ical::{parse_events, CalendarEvent};
use super::{Enricher, EnrichmentBudget, PageFetcher};
use crate::config::sources::FeedConfig;
use crate::domain::TournamentRecord;
use crate::location::normalize;
use crate::text::{clean_title, norm_spaces};

pub const ORGANIZER: &str = "WPA";
pub const SOURCE: &str = "WPA iCal feed";

static DESCRIPTION_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*location\s*:\s*(.+?)\s*$").expect("valid description regex")
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s)>"]+"#).expect("valid url regex"));

/// A feed event plus the page that may name its venue
#[derive(Debug, Clone)]
pub struct FeedEvent {
    pub record: TournamentRecord,
    pub detail_url: Option<String>,
}

/// Reads every configured feed; a failing feed is logged and skipped
pub async fn fetch_wpa<F: PageFetcher>(
    enricher: &mut Enricher<F>,
    feeds: &[FeedConfig],
    from: NaiveDate,
    budget: &mut EnrichmentBudget,
) -> Vec<TournamentRecord> {
    let mut records = Vec::new();

    for feed in feeds {
        let text = match enricher.fetch_text(feed.url).await {
            Ok(text) => text,
            Err(e) => {
                warn!("WPA feed failed {}: {:#}", feed.label, e);
                continue;
            }
        };

        let events = parse_feed(&text, feed, from);
        info!("  → {}: {} upcoming events", feed.label, events.len());

        for event in events {
            records.push(enrich(enricher, event, budget).await);
        }
    }

    records
}

async fn enrich<F: PageFetcher>(
    enricher: &mut Enricher<F>,
    event: FeedEvent,
    budget: &mut EnrichmentBudget,
) -> TournamentRecord {
    let FeedEvent { record, detail_url } = event;
    if record.location.is_some() {
        return record;
    }
    let Some(url) = detail_url else {
        return record;
    };

    match enricher.location_for(&url, budget).await {
        Some(found) => record.with_location(Some(found)),
        None => record,
    }
}

/// Upcoming events of one feed with whatever location the feed itself carries
pub fn parse_feed(text: &str, feed: &FeedConfig, from: NaiveDate) -> Vec<FeedEvent> {
    parse_events(text)
        .iter()
        .filter_map(|event| {
            let parsed = feed_event(event, feed);
            if parsed.is_none() {
                debug!("Skipping unusable event in {}", feed.label);
            }
            parsed
        })
        .filter(|e| is_upcoming_or_ongoing(e.record.start, e.record.end, from))
        .collect()
}

fn feed_event(event: &CalendarEvent, feed: &FeedConfig) -> Option<FeedEvent> {
    let title = clean_title(&event.text("SUMMARY").unwrap_or_default());
    if title.is_empty() {
        return None;
    }

    let start = event.date("DTSTART")?;
    // DTEND is exclusive
    let end = event
        .date("DTEND")
        .map_or(start, |dtend| dtend - Duration::days(1));
    if end < start {
        return None;
    }

    let location = event
        .text("LOCATION")
        .and_then(|raw| normalize(Some(norm_spaces(&raw).as_str())))
        .or_else(|| location_from_description(event.text("DESCRIPTION").as_deref()));

    let record = TournamentRecord {
        title,
        organizer: ORGANIZER.to_string(),
        start,
        end,
        location,
        tour: Some(feed.label.to_string()),
        source: SOURCE.to_string(),
        source_url: feed.url.to_string(),
    };

    Some(FeedEvent {
        record,
        detail_url: detail_url(event),
    })
}

/// "Location: ..." line inside an event description
pub fn location_from_description(description: Option<&str>) -> Option<String> {
    let text = description?.replace('\r', "\n");
    let caps = DESCRIPTION_LOCATION.captures(&text)?;
    normalize(Some(&caps[1]))
}

/// Page describing the event: URL, a URL-shaped UID, then any URL mentioned
pub fn detail_url(event: &CalendarEvent) -> Option<String> {
    let direct = ["URL", "UID"].iter().find_map(|name| {
        let value = norm_spaces(&event.text(name)?);
        is_http(&value).then_some(value)
    });
    if direct.is_some() {
        return direct;
    }

    if let Some(found) = event
        .text("DESCRIPTION")
        .and_then(|d| URL_PATTERN.find(&d).map(|m| m.as_str().to_string()))
    {
        return Some(found);
    }

    event
        .properties()
        .iter()
        .find_map(|p| URL_PATTERN.find(&p.value).map(|m| m.as_str().to_string()))
}

fn is_http(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::testing::FakeFetcher;
    use crate::fetchers::PageCache;

    const FEED_URL: &str = "https://wpapool.com/?mec-ical-feed=1";

    fn feed() -> FeedConfig {
        FeedConfig::new("WPA_ALL", FEED_URL)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn calendar(events: &[&str]) -> String {
        let mut out = String::from("BEGIN:VCALENDAR\nVERSION:2.0\n");
        for event in events {
            out.push_str("BEGIN:VEVENT\n");
            out.push_str(event);
            out.push_str("END:VEVENT\n");
        }
        out.push_str("END:VCALENDAR\n");
        out
    }

    #[test]
    fn test_exclusive_dtend_and_feed_location() {
        let text = calendar(&[
            "SUMMARY:Las Vegas Open\nDTSTART;VALUE=DATE:20260310\nDTEND;VALUE=DATE:20260315\nLOCATION:Tropicana\\,  Las Vegas\\, USA\n",
        ]);
        let events = parse_feed(&text, &feed(), d(2026, 1, 1));

        assert_eq!(events.len(), 1);
        let record = &events[0].record;
        assert_eq!(record.start, d(2026, 3, 10));
        assert_eq!(record.end, d(2026, 3, 14));
        assert_eq!(record.location.as_deref(), Some("Tropicana, Las Vegas, USA"));
        assert_eq!(record.organizer, "WPA");
        assert_eq!(record.tour.as_deref(), Some("WPA_ALL"));
        assert_eq!(record.source_url, FEED_URL);
    }

    #[test]
    fn test_missing_dtend_is_single_day_and_past_events_dropped() {
        let text = calendar(&[
            "SUMMARY:One Day\nDTSTART:20260401T100000Z\n",
            "SUMMARY:Long Gone\nDTSTART:20250101\nDTEND:20250103\n",
            "DTSTART:20260401\n",
        ]);
        let events = parse_feed(&text, &feed(), d(2026, 1, 1));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record.title, "One Day");
        assert_eq!(events[0].record.end, d(2026, 4, 1));
    }

    #[test]
    fn test_location_from_description_line() {
        assert_eq!(
            location_from_description(Some("Prize fund\r\nLocation:  Fulda, Germany \r\nmore")),
            Some("Fulda, Germany".to_string())
        );
        assert_eq!(location_from_description(Some("Location: TBA")), None);
        assert_eq!(location_from_description(None), None);
    }

    #[test]
    fn test_detail_url_order() {
        let text = calendar(&[
            "SUMMARY:A\nDTSTART:20260401\nUID:abc-123@wpapool.com\nDESCRIPTION:See https://wpapool.com/events/a/ for details\n",
            "SUMMARY:B\nDTSTART:20260401\nUID:https://wpapool.com/events/b/\nURL:https://wpapool.com/b-url/\n",
            "SUMMARY:C\nDTSTART:20260401\nX-ALT-DESC:<a href=\"https://wpapool.com/events/c/\">c</a>\n",
        ]);
        let urls: Vec<_> = parse_feed(&text, &feed(), d(2026, 1, 1))
            .into_iter()
            .map(|e| e.detail_url)
            .collect();

        assert_eq!(
            urls,
            vec![
                Some("https://wpapool.com/events/a/".to_string()),
                Some("https://wpapool.com/b-url/".to_string()),
                Some("https://wpapool.com/events/c/".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_enriches_only_missing_locations() {
        let text = calendar(&[
            "SUMMARY:Known\nDTSTART:20260401\nLOCATION:Warsaw, Poland\nURL:https://wpapool.com/events/known/\n",
            "SUMMARY:Unknown\nDTSTART:20260402\nURL:https://wpapool.com/events/unknown/\n",
        ]);
        let page = r#"<div class="mec-single-event-location"><address>Hotel Arena, Fulda, Germany</address></div>"#;
        let fetcher = FakeFetcher::default()
            .with_page(FEED_URL, &text)
            .with_page("https://wpapool.com/events/unknown/", page);
        let mut enricher = Enricher::new(fetcher, PageCache::new(16), std::time::Duration::ZERO);
        let mut budget = EnrichmentBudget::new("WPA", 10);

        let records = fetch_wpa(&mut enricher, &[feed()], d(2026, 1, 1), &mut budget).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location.as_deref(), Some("Warsaw, Poland"));
        assert_eq!(records[1].location.as_deref(), Some("Hotel Arena, Fulda, Germany"));
        assert_eq!(budget.used(), 1);
    }

    #[tokio::test]
    async fn test_failed_feed_is_skipped() {
        let mut enricher = Enricher::new(FakeFetcher::default(), PageCache::new(4), std::time::Duration::ZERO);
        let mut budget = EnrichmentBudget::new("WPA", 10);

        let records = fetch_wpa(&mut enricher, &[feed()], d(2026, 1, 1), &mut budget).await;
        assert!(records.is_empty());
    }
}
