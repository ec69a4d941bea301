//! Timestamps as they arrive from the API, and the parsing fallback chain.
//!
//! Upstream payloads are inconsistent about datetime formatting: intraday
//! series carry a bare `HH:MM:SS` that only makes sense next to the request
//! date, sleep logs carry ISO-8601 with milliseconds (sometimes with a `Z`),
//! and daily summaries carry a bare date. Records keep the raw text and resolve
//! it lazily through [`parse_datetime`], which tries, in order:
//!
//! 1. `%Y-%m-%d %H:%M:%S` (date and time joined by a space),
//! 2. `%Y-%m-%dT%H:%M:%S%.f` (ISO-8601, optional fraction),
//! 3. `%Y-%m-%dT%H:%M:%S%.fZ` (ISO-8601 with zulu designator),
//!
//! and finally a bare `%Y-%m-%d`, which resolves to midnight. Text that matches
//! none of these stays opaque; callers decide whether that is a warning.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Combined date+time formats, tried in order.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

/// Bare date format used by daily summaries and request bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a datetime through the fallback chain.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            // `HH:MM` without seconds shows up in request-echo fields.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").ok()
        })
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parse a bare `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Point in time attached to a normalized record, kept in its source form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "form", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// A full datetime string as delivered by the API.
    Instant(String),
    /// A time-of-day from an intraday dataset paired with its request date.
    Split {
        /// `YYYY-MM-DD` of the owning sub-request.
        date: String,
        /// `HH:MM:SS` (or `HH:MM`) from the dataset entry.
        time: String,
    },
    /// A bare calendar date.
    Date(String),
}

impl Timestamp {
    /// Resolve into a naive datetime, or `None` when no format matches.
    #[must_use]
    pub fn resolve(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Instant(raw) => parse_datetime(raw),
            Self::Split { date, time } => parse_datetime(&format!("{date} {time}")),
            Self::Date(raw) => parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }

    /// Text form used when the timestamp cannot be resolved.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Instant(raw) | Self::Date(raw) => raw.clone(),
            Self::Split { date, time } => format!("{date} {time}"),
        }
    }

    /// True when the timestamp denotes a whole day rather than an instant.
    #[must_use]
    pub const fn is_date_only(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}
