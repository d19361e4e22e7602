//! Minimal iCalendar reader covering what the WPA feeds publish:
//! folded lines, `VEVENT` blocks and their text and date properties.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct CalendarEvent {
    properties: Vec<Property>,
}

impl CalendarEvent {
    /// Raw value of the first property called `name`
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }

    /// Unescaped text value
    pub fn text(&self, name: &str) -> Option<String> {
        self.raw(name).map(unescape_text)
    }

    /// Date part of a DATE or DATE-TIME value
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        let value = self.raw(name)?;
        let digits = value.get(..8)?;
        NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// All `VEVENT` components in document order
///
/// Components nested inside an event (alarms) are skipped.
pub fn parse_events(text: &str) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let mut current: Option<CalendarEvent> = None;
    let mut nested = 0usize;

    for line in unfold_lines(text) {
        let Some(property) = parse_property(&line) else {
            continue;
        };

        match property.name.as_str() {
            "BEGIN" if property.value.eq_ignore_ascii_case("VEVENT") && current.is_none() => {
                current = Some(CalendarEvent::default());
                nested = 0;
            }
            "BEGIN" if current.is_some() => nested += 1,
            "END" if current.is_some() && nested > 0 => nested -= 1,
            "END" if property.value.eq_ignore_ascii_case("VEVENT") => {
                if let Some(event) = current.take() {
                    events.push(event);
                }
            }
            _ => {
                if let Some(event) = current.as_mut().filter(|_| nested == 0) {
                    event.properties.push(property);
                }
            }
        }
    }

    events
}

// Continuation lines start with a single space or tab
fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        match raw.strip_prefix([' ', '\t']) {
            Some(rest) if !lines.is_empty() => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(rest);
                }
            }
            _ => lines.push(raw.to_string()),
        }
    }
    lines
}

// NAME;PARAM=VALUE;PARAM="quoted:value":VALUE
fn parse_property(line: &str) -> Option<Property> {
    let mut in_quotes = false;
    let colon = line.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ':' if !in_quotes => Some(i),
        _ => None,
    })?;

    let head = &line[..colon];
    let name = head.split(';').next().unwrap_or(head).trim();
    if name.is_empty() {
        return None;
    }

    Some(Property {
        name: name.to_ascii_uppercase(),
        value: line[colon + 1..].to_string(),
    })
}

pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
