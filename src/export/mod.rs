pub mod ics;

pub use ics::{render_calendar, stable_uid, write_calendars, CalendarStats};
