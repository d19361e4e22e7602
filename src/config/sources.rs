/// Source endpoints read by the ingestion step
///
/// WPA publishes one iCal feed per calendar category on its calendar page
/// (`mec_categories` ids); the label becomes the record's tour.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub label: &'static str,
    pub url: &'static str,
}

impl FeedConfig {
    pub fn new(label: &'static str, url: &'static str) -> Self {
        Self { label, url }
    }
}

pub const EPBF_CALENDAR_YEAR_URL: &str = "https://www.epbf.com/calendar/{year}/";
pub const EPBF_BASE_URL: &str = "https://www.epbf.com";
pub const MATCHROOM_SCHEDULE_URL: &str = "https://matchroompool.com/schedule/";
pub const MATCHROOM_BASE_URL: &str = "https://matchroompool.com";

/// Articles announcing the Predator Pro Billiard Series schedule
pub const PBS_FALLBACK_URLS: &[&str] = &[
    "https://77billiards.com/2025/12/10/predator-pro-billiard-series-reveals-stacked-2026-schedule/",
    "https://alison-chang.com/us-pro-billiard-series-announces-2026-season-schedule-across-four-major-cities/",
];

/// Year the PBS articles are written for
pub const PBS_ASSUMED_YEAR: i32 = 2026;

pub fn get_wpa_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig::new("WPA_ALL", "https://wpapool.com/?mec-ical-feed=1"),
        FeedConfig::new("WPA_HEYBALL", "https://wpapool.com/?mec-ical-feed=1&mec_categories=100"),
        FeedConfig::new("WPA_MATCHROOM", "https://wpapool.com/?mec-ical-feed=1&mec_categories=63"),
        FeedConfig::new("WPA_MEMBER_EVENT", "https://wpapool.com/?mec-ical-feed=1&mec_categories=60"),
        FeedConfig::new("WPA_PREDATOR", "https://wpapool.com/?mec-ical-feed=1&mec_categories=61"),
        FeedConfig::new("WPA_JUNIOR", "https://wpapool.com/?mec-ical-feed=1&mec_categories=59"),
        FeedConfig::new("WPA_RANKING_MEN", "https://wpapool.com/?mec-ical-feed=1&mec_categories=58"),
        FeedConfig::new("WPA_RANKING_MEN_WOMEN", "https://wpapool.com/?mec-ical-feed=1&mec_categories=50"),
        FeedConfig::new("WPA_RANKING_WOMEN", "https://wpapool.com/?mec-ical-feed=1&mec_categories=62"),
    ]
}

pub fn epbf_calendar_url(year: i32) -> String {
    EPBF_CALENDAR_YEAR_URL.replace("{year}", &year.to_string())
}
