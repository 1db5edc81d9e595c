//! The four upstream resources and their per-resource policies.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// A logical upstream document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    TreasuryData,
    TreasuryStats,
    CalendarEvents,
    DataVersion,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::TreasuryData,
        Resource::TreasuryStats,
        Resource::CalendarEvents,
        Resource::DataVersion,
    ];

    /// Path relative to the upstream base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::TreasuryData => "/treasury-data",
            Self::TreasuryStats => "/treasury-stats",
            Self::CalendarEvents => "/calendar-events",
            Self::DataVersion => "/data-version",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TreasuryData => "treasury_data",
            Self::TreasuryStats => "treasury_stats",
            Self::CalendarEvents => "calendar_events",
            Self::DataVersion => "data_version",
        }
    }

    /// How often the cache refetches unconditionally.
    pub fn refresh_interval(&self) -> Duration {
        match self {
            Self::TreasuryData | Self::TreasuryStats => Duration::from_secs(5 * 60),
            Self::CalendarEvents => Duration::from_secs(10 * 60),
            Self::DataVersion => Duration::from_secs(60),
        }
    }

    /// `Cache-Control` value for pass-through responses.
    pub fn cache_directive(&self) -> &'static str {
        match self {
            Self::TreasuryData | Self::TreasuryStats => "s-maxage=300, stale-while-revalidate=600",
            Self::CalendarEvents => "s-maxage=600, stale-while-revalidate=900",
            Self::DataVersion => "s-maxage=60, stale-while-revalidate=120",
        }
    }

    /// User-facing message when the resource cannot be loaded.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::TreasuryData => "Unable to load treasury data",
            Self::TreasuryStats => "Unable to load treasury stats",
            Self::CalendarEvents => "Unable to load calendar events",
            Self::DataVersion => "Unable to load data version",
        }
    }

    /// Reverse of [`Resource::path`].
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
