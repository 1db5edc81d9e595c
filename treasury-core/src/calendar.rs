//! Disbursement calendar: normalize raw events, group by month, and window
//! the upcoming milestones.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::dates::{long_date_label, long_month_label, parse_optional, short_day_label};
use crate::model::CalendarEvent;

/// Label substituted for missing or garbled titles.
pub const DEFAULT_TITLE: &str = "Treasury Milestone";

/// Number of upcoming milestones shown by default.
pub const DEFAULT_UPCOMING_LIMIT: usize = 12;

/// Display-ready calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub id: String,
    pub label: String,
    pub date: DateTime<Utc>,
    /// `March 1, 2024`
    pub display_date: String,
    pub amount_ada: Option<f64>,
    pub vendor: Option<String>,
    pub pssc_addr: Option<String>,
}

impl CalendarEntry {
    /// Abbreviated contract address: first 8 and last 6 characters.
    pub fn short_address(&self) -> Option<String> {
        let addr = self.pssc_addr.as_deref()?;
        let chars: Vec<char> = addr.chars().collect();
        if chars.len() <= 14 {
            return Some(addr.to_string());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        Some(format!("{head}…{tail}"))
    }
}

/// Entries sharing a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup {
    /// `March 2024`
    pub label: String,
    pub entries: Vec<CalendarEntry>,
}

fn title_label(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.contains("undefined") => title.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// Drop undated events, derive labels and extended properties, and sort
/// ascending by date. Events on the same instant keep their input order.
pub fn normalize_events(events: &[CalendarEvent]) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = events
        .iter()
        .filter_map(|event| {
            let date = match parse_optional(event.date.as_deref()) {
                Ok(date) => date,
                Err(err) => {
                    trace!(event = %event.id, %err, "Dropping calendar event");
                    return None;
                }
            };
            let props = event.extended_props.as_ref();
            let prop_str = |key: &str| {
                props
                    .and_then(|p| p.get(key))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            Some(CalendarEntry {
                id: event.id.clone(),
                label: title_label(event.title.as_deref()),
                display_date: long_date_label(&date),
                date,
                amount_ada: props
                    .and_then(|p| p.get("amount_ada"))
                    .and_then(Value::as_f64),
                vendor: prop_str("vendor"),
                pssc_addr: prop_str("pssc_addr"),
            })
        })
        .collect();

    entries.sort_by_key(|entry| entry.date);
    entries
}

/// Stable group-by month over an already sorted sequence; groups appear in
/// the order their month is first seen.
pub fn group_by_month(entries: &[CalendarEntry]) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for entry in entries {
        let label = long_month_label(&entry.date);
        match groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.entries.push(entry.clone()),
            None => groups.push(MonthGroup {
                label,
                entries: vec![entry.clone()],
            }),
        }
    }
    groups
}

/// Entries dated on or after the start of `now`'s day (UTC), at most `limit`.
pub fn upcoming(entries: &[CalendarEntry], now: DateTime<Utc>, limit: usize) -> Vec<CalendarEntry> {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);

    entries
        .iter()
        .filter(|entry| entry.date >= start_of_day)
        .take(limit)
        .cloned()
        .collect()
}

/// `Mar 1 – Apr 5` spanning the first and last entry.
pub fn date_range_label(entries: &[CalendarEntry]) -> String {
    match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => format!(
            "{} – {}",
            short_day_label(&first.date),
            short_day_label(&last.date)
        ),
        _ => "No upcoming".to_string(),
    }
}
