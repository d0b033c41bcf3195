use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Counts scraped from the target page. Either side may be missing.
///
/// No ordering between the two is enforced: providers occasionally publish
/// `current > limit`, which simply classifies as closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSignal {
    pub current_count: Option<u64>,
    pub limit_count: Option<u64>,
}

impl StatusSignal {
    pub fn new(current_count: Option<u64>, limit_count: Option<u64>) -> Self {
        Self {
            current_count,
            limit_count,
        }
    }

    /// Both counts, when the page yielded both.
    pub fn counts(&self) -> Option<(u64, u64)> {
        self.current_count.zip(self.limit_count)
    }
}

impl fmt::Display for StatusSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.current_count, self.limit_count) {
            (Some(c), Some(l)) => write!(f, "{c} / {l}"),
            (Some(c), None) => write!(f, "{c} / ?"),
            (None, Some(l)) => write!(f, "? / {l}"),
            (None, None) => write!(f, "no counts"),
        }
    }
}

/// Textual flags derived from the raw page on every fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageMarkers {
    /// The page is recognizably the target (not a 404, redirect, or CAPTCHA).
    pub is_expected_page: bool,
    /// The operator-configured "limit reached" sentence appears verbatim.
    pub limit_reached_phrase_present: bool,
}

impl PageMarkers {
    /// Plain, case-sensitive substring checks. Whitespace is not normalized,
    /// so a reworded page silently stops matching.
    pub fn detect(raw: &str, identity_phrase: &str, limit_reached_phrase: &str) -> Self {
        Self {
            is_expected_page: raw.contains(identity_phrase),
            limit_reached_phrase_present: raw.contains(limit_reached_phrase),
        }
    }
}

/// Everything the extractor read from one fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    pub signal: StatusSignal,
    pub markers: PageMarkers,
}

/// Tri-state classification of the monitored page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityState {
    Open,
    Closed,
    Unknown,
}

impl AvailabilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityState::Open => "open",
            AvailabilityState::Closed => "closed",
            AvailabilityState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AvailabilityState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(AvailabilityState::Open),
            "closed" => Ok(AvailabilityState::Closed),
            "unknown" => Ok(AvailabilityState::Unknown),
            _ => Err(format!("Unknown availability state: {}", s)),
        }
    }
}

/// Output of the decision engine for a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub should_notify: bool,
    pub reason: String,
    pub signal: StatusSignal,
    /// State the cycle classified, carried for the notification payload.
    pub state: AvailabilityState,
    pub observed_at: DateTime<Utc>,
}
