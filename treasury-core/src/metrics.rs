//! Headline stat cards derived from [`TreasuryStats`], the hero overview, and
//! the calendar page cards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calendar::{date_range_label, CalendarEntry};
use crate::dates::long_date_label;
use crate::format::{format_ada, format_ada_brief, format_percent, group_thousands, PLACEHOLDER};
use crate::model::{DataVersion, TreasuryStats};

/// How the change figure should be coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_label: Option<String>,
}

impl MetricCard {
    fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_string(),
            value: PLACEHOLDER.to_string(),
            change: None,
            tone: None,
            change_label: None,
        }
    }

    fn new(title: &str, value: String, change: String, tone: Tone, change_label: &str) -> Self {
        Self {
            title: title.to_string(),
            value,
            change: Some(change),
            tone: Some(tone),
            change_label: Some(change_label.to_string()),
        }
    }
}

/// Share of the annual budget routed to TRSC, in percent. Zero when the
/// annual budget is not positive.
pub fn allocated_share(stats: &TreasuryStats) -> f64 {
    if stats.annual_budget > 0.0 {
        stats.allocated_to_trsc_ada / stats.annual_budget * 100.0
    } else {
        0.0
    }
}

/// The four dashboard cards, or placeholders while stats are unavailable.
pub fn compute_metrics(stats: Option<&TreasuryStats>) -> Vec<MetricCard> {
    let Some(stats) = stats else {
        return ["Treasury Balance", "Allocated", "Vendors Active", "Claimed %"]
            .into_iter()
            .map(MetricCard::placeholder)
            .collect();
    };

    vec![
        MetricCard::new(
            "Treasury Balance",
            format_ada(stats.treasury_balance_ada),
            format_ada(stats.remaining_treasury_ada),
            Tone::Positive,
            "Remaining",
        ),
        MetricCard::new(
            "Allocated to TRSC",
            format_ada(stats.allocated_to_trsc_ada),
            format_percent(allocated_share(stats), 1),
            Tone::Neutral,
            "of annual budget",
        ),
        MetricCard::new(
            "Active PSSC",
            group_thousands(stats.pssc_count as i64),
            format!("{} TRSC nodes", stats.trsc_count),
            Tone::Neutral,
            "routing contracts",
        ),
        MetricCard::new(
            "Claimed by Vendors",
            format_ada(stats.claimed_by_vendors_ada),
            format_percent(stats.budget_claimed_percentage, 1),
            Tone::Positive,
            "of allocated",
        ),
    ]
}

// =============================================================================
// Overview
// =============================================================================

/// Balance, allocation and last upstream change for the landing hero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub treasury_balance: String,
    pub allocated_to_trsc: String,
    /// Upstream change time; absent when the version is unknown or zero
    pub last_updated: Option<DateTime<Utc>>,
    /// `Last synced March 1, 2024 10:00 UTC`
    pub last_synced: Option<String>,
}

pub fn build_overview(stats: Option<&TreasuryStats>, version: Option<&DataVersion>) -> Overview {
    let last_updated = version
        .map(|v| v.last_modified)
        .filter(|&millis| millis != 0)
        .and_then(DateTime::from_timestamp_millis);

    Overview {
        treasury_balance: format_ada_brief(stats.map(|s| s.treasury_balance_ada)),
        allocated_to_trsc: format_ada_brief(stats.map(|s| s.allocated_to_trsc_ada)),
        last_synced: last_updated.map(|at| {
            format!("Last synced {} {}", long_date_label(&at), at.format("%H:%M UTC"))
        }),
        last_updated,
    }
}

// =============================================================================
// Calendar cards
// =============================================================================

/// Cache state of the calendar feed as shown on the "Last Sync" card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncState {
    pub has_value: bool,
    pub has_error: bool,
    pub validating: bool,
}

/// Upcoming milestones, vendors claiming, and last sync cards.
///
/// `upcoming` is the already-windowed list; `mapped_events` counts every
/// normalized event.
pub fn calendar_cards(
    upcoming: &[CalendarEntry],
    mapped_events: usize,
    stats: Option<&TreasuryStats>,
    sync: SyncState,
) -> Vec<MetricCard> {
    let vendors = stats
        .map(|s| group_thousands(s.pssc_count as i64))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    vec![
        MetricCard::new(
            "Upcoming Milestones",
            upcoming.len().to_string(),
            date_range_label(upcoming),
            Tone::Neutral,
            "Next windows",
        ),
        MetricCard::new(
            "Vendors Claiming",
            vendors,
            format!("{} events mapped", group_thousands(mapped_events as i64)),
            Tone::Neutral,
            "calendar scope",
        ),
        MetricCard {
            title: "Last Sync".to_string(),
            value: if sync.has_value { "Live" } else { PLACEHOLDER }.to_string(),
            change: Some(
                if sync.has_error { "Fetch error" } else { "Auto refresh 10 min" }.to_string(),
            ),
            tone: Some(if sync.has_error { Tone::Negative } else { Tone::Neutral }),
            change_label: sync.validating.then(|| "Refreshing…".to_string()),
        },
    ]
}
