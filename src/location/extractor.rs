//! Location extraction from event detail pages.
//!
//! Strategies run in priority order and the first one producing a location
//! accepted by the normalizer wins. A strategy never fails loudly; it just
//! yields nothing and lets the next one try.

use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::normalizer::normalize;
use crate::text::norm_spaces;

pub type PageStrategy = fn(&Html) -> Option<String>;

/// Page strategies, best first
pub const PAGE_STRATEGIES: [(&str, PageStrategy); 3] = [
    ("structured-data", from_structured_data),
    ("labelled-regions", from_labelled_regions),
    ("label-line", from_label_line),
];

/// Venue markup idioms (Modern Events Calendar and icon rows), best first
const LOCATION_SELECTORS: &[&str] = &[
    ".mec-single-event .mec-event-location",
    ".mec-single-event-location",
    ".mec-event-meta-item-location",
    ".mec-event-meta .mec-event-location",
    ".mec-event-location",
    "i.mec-sl-location",
    "i.mec-fa-map-marker",
    "i.fa-map-marker",
];

static SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    LOCATION_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid location selector"))
        .collect()
});

static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid json-ld selector")
});

static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(location|venue)\s*[:\-]?\s*").expect("valid label regex")
});

static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(location|venue)\s*[:\-]\s*(.+?)\s*$").expect("valid label line regex")
});

/// Best location a detail page offers
pub fn extract_from_page(html: &Html) -> Option<String> {
    PAGE_STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(html);
        if let Some(location) = &found {
            debug!("Location {:?} found via {}", location, name);
        }
        found
    })
}

// --- Structured data (schema.org Event in JSON-LD) ---

/// "City, Region, Country" assembled from a schema.org Event address
pub fn from_structured_data(html: &Html) -> Option<String> {
    html.select(&JSON_LD)
        .filter_map(|script| serde_json::from_str::<Value>(script.text().collect::<String>().trim()).ok())
        .find_map(|root| {
            let mut objects = Vec::new();
            collect_objects(&root, &mut objects);
            objects
                .into_iter()
                .filter(|obj| is_event(obj))
                .find_map(location_of_event)
        })
}

fn collect_objects<'a>(value: &'a Value, out: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Object(map) => {
            out.push(map);
            for child in map.values() {
                collect_objects(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_objects(item, out);
            }
        }
        _ => {}
    }
}

fn is_event(obj: &Map<String, Value>) -> bool {
    let type_value = obj.get("@type").or_else(|| obj.get("type"));
    let type_name = match type_value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => return false,
    };
    type_name.contains("Event")
}

fn location_of_event(event: &Map<String, Value>) -> Option<String> {
    let places: Vec<&Value> = match event.get("location") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
        None => return None,
    };

    places
        .into_iter()
        .filter_map(Value::as_object)
        .find_map(|place| {
            let (locality, region, country) = address_parts(place.get("address")?);
            assemble_address(&[locality, region, country])
        })
}

fn address_parts(address: &Value) -> (String, String, String) {
    match address {
        Value::Object(addr) => (
            string_field(addr, "addressLocality"),
            string_field(addr, "addressRegion"),
            country_name(addr.get("addressCountry")),
        ),
        Value::String(flat) => split_flat_address(flat),
        _ => Default::default(),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(norm_spaces)
        .unwrap_or_default()
}

fn country_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => norm_spaces(s),
        Some(Value::Object(obj)) => ["name", "@name", "addressCountry"]
            .iter()
            .map(|key| string_field(obj, key))
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

// "Street 1, Warsaw, Masovia, Poland" -> city/region/country read from the tail
fn split_flat_address(flat: &str) -> (String, String, String) {
    let parts: Vec<&str> = flat
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [locality, country] => (locality.to_string(), String::new(), country.to_string()),
        [locality, .., region, country] => (
            locality.to_string(),
            region.to_string(),
            country.to_string(),
        ),
        _ => Default::default(),
    }
}

fn assemble_address(components: &[String]) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();
    for component in components {
        if !component.is_empty() && !kept.contains(&component.as_str()) {
            kept.push(component);
        }
    }
    normalize(Some(kept.join(", ").as_str()))
}

// --- Labelled DOM regions ---

/// Text of the first recognised venue element, label stripped
pub fn from_labelled_regions(html: &Html) -> Option<String> {
    SELECTORS.iter().find_map(|selector| {
        let element = html.select(selector).next()?;
        let text = if element.value().name() == "i" {
            let parent = element.parent().and_then(ElementRef::wrap)?;
            element_text(parent)
        } else {
            element_text(element)
        };
        let text = LEADING_LABEL.replace(&text, "");
        normalize(Some(text.trim()))
    })
}

fn element_text(element: ElementRef) -> String {
    let pieces: Vec<&str> = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    norm_spaces(&pieces.join(" "))
}

// --- Free-text label lines ---

/// First "Location: ..." / "Venue: ..." line of the page text
pub fn from_label_line(html: &Html) -> Option<String> {
    let text = flattened_text(html);
    LABEL_LINE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(2))
        .find_map(|m| normalize(Some(m.as_str())))
}

/// Visible text nodes of the page, one per line
pub fn flattened_text(html: &Html) -> String {
    let mut lines = Vec::new();
    for node in html.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        if !hidden {
            lines.push(&**text);
        }
    }
    lines.join("\n")
}
