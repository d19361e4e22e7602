use chrono::NaiveDate;
use log::{info, warn};
use scraper::Html;

use super::dates::{is_upcoming_or_ongoing, normalize_dashes, parse_short_range};
use super::{Enricher, PageFetcher};
use crate::domain::TournamentRecord;
use crate::location::{extractor::flattened_text, normalize};
use crate::text::norm_spaces;

pub const ORGANIZER: &str = "Predator/PBS";
pub const SOURCE: &str = "Fallback article scrape";

const BOILERPLATE_PREFIXES: &[&str] = &["total:", "share", "related", "leave a comment"];

/// Schedule entries announced in news articles; unreachable articles are skipped
pub async fn fetch_pbs<F: PageFetcher>(
    enricher: &mut Enricher<F>,
    urls: &[&str],
    year: i32,
    from: NaiveDate,
) -> Vec<TournamentRecord> {
    let mut records = Vec::new();

    for url in urls {
        match enricher.fetch_text(url).await {
            Ok(html) => {
                let found = parse_article(&html, url, year, from);
                info!("  → PBS article {}: {} events", url, found.len());
                records.extend(found);
            }
            Err(e) => warn!("PBS fallback URL failed: {}: {:#}", url, e),
        }
    }

    records
}

/// A stop is announced as a city line followed by a "Mon D - [Mon] D" line
pub fn parse_article(html: &str, url: &str, year: i32, from: NaiveDate) -> Vec<TournamentRecord> {
    let text = flattened_text(&Html::parse_document(html));
    let mut records = Vec::new();
    let mut previous: Option<String> = None;

    for line in article_lines(&text) {
        let Some((start, end)) = parse_short_range(&line, year) else {
            previous = Some(norm_spaces(&line));
            continue;
        };

        let Some(place) = previous.as_deref() else {
            continue;
        };
        if !is_upcoming_or_ongoing(start, end, from) {
            continue;
        }

        records.push(TournamentRecord {
            title: format!("Predator Pro Billiard Series — {}", place),
            organizer: ORGANIZER.to_string(),
            start,
            end,
            location: normalize(Some(place)),
            tour: Some(format!("PBS {} (fallback)", year)),
            source: SOURCE.to_string(),
            source_url: url.to_string(),
        });
    }

    records
}

fn article_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|raw| normalize_dashes(raw.trim()))
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !BOILERPLATE_PREFIXES.iter().any(|p| lower.starts_with(p))
        })
        .collect()
}
