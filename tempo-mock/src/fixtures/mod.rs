//! Canned Fitbit-shaped payloads.
//!
//! Every builder returns the JSON text exactly as the Web API would send it,
//! so tests exercise the real normalizers rather than pre-digested records.

use chrono::NaiveDate;
use tempo_core::{ActivitySubtype, EndpointKind, SubRequest};

pub mod activity;
pub mod devices;
pub mod sleep;
pub mod vitals;

/// Days covered by a sub-request, inclusive. Unparsable bounds yield the raw start only.
#[must_use]
pub fn days(sub: &SubRequest) -> Vec<String> {
    let Some(from) = sub.date.as_deref() else {
        return Vec::new();
    };
    let to = sub.date_to.as_deref().unwrap_or(from);
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(from), parse(to)) {
        (Some(f), Some(t)) if f <= t => f
            .iter_days()
            .take_while(|d| *d <= t)
            .take(366)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        _ => vec![from.to_string()],
    }
}

/// Deterministic successful body for any sub-request.
#[must_use]
pub fn for_sub(sub: &SubRequest) -> String {
    let day = sub.date.clone().unwrap_or_default();
    let span = days(sub);
    match sub.endpoint {
        EndpointKind::HeartRateIntraday => activity::heart_rate_intraday(
            &day,
            &[("08:00:00", 61.0), ("08:00:01", 62.0), ("08:00:02", 64.0)],
        ),
        EndpointKind::StepsIntraday => activity::intraday(
            "steps",
            &day,
            &[("07:00:00", 12.0), ("07:01:00", 40.0), ("07:02:00", 33.0)],
        ),
        EndpointKind::ActivityIntraday => activity::intraday(
            sub.activity_subtype.map_or("steps", ActivitySubtype::as_str),
            &day,
            &[("12:00:00", 1.5), ("12:01:00", 2.0)],
        ),
        EndpointKind::HeartRate => activity::heart_rate_daily(&span, 58),
        EndpointKind::Steps => activity::steps_daily(&span, 8_000),
        EndpointKind::Sleep | EndpointKind::SleepLevels => sleep::sleep_log(&day, 90),
        EndpointKind::HrvDaily => vitals::hrv_daily(&span),
        EndpointKind::HrvIntraday => vitals::hrv_intraday(&day),
        EndpointKind::SkinTemperature => vitals::skin_temperature(&span),
        EndpointKind::CoreTemperature => vitals::core_temperature(&day),
        EndpointKind::BreathingRate => vitals::breathing_rate(&span),
        EndpointKind::SpO2 => vitals::spo2(&day),
        EndpointKind::Ecg => vitals::ecg(&day),
        EndpointKind::Devices => devices::devices(),
    }
}

/// A well-formed body with no records for the endpoint.
#[must_use]
pub fn empty_for(kind: EndpointKind) -> String {
    match kind {
        EndpointKind::HeartRateIntraday => {
            r#"{"activities-heart":[],"activities-heart-intraday":{"dataset":[]}}"#.to_string()
        }
        EndpointKind::StepsIntraday | EndpointKind::ActivityIntraday => {
            r#"{"activities-steps":[],"activities-steps-intraday":{"dataset":[]}}"#.to_string()
        }
        EndpointKind::HeartRate => r#"{"activities-heart":[]}"#.to_string(),
        EndpointKind::Steps => r#"{"activities-steps":[]}"#.to_string(),
        EndpointKind::Sleep | EndpointKind::SleepLevels => {
            r#"{"sleep":[],"summary":{"totalMinutesAsleep":0,"totalTimeInBed":0}}"#.to_string()
        }
        EndpointKind::HrvDaily | EndpointKind::HrvIntraday => r#"{"hrv":[]}"#.to_string(),
        EndpointKind::SkinTemperature => r#"{"tempSkin":[]}"#.to_string(),
        EndpointKind::CoreTemperature => r#"{"tempCore":[]}"#.to_string(),
        EndpointKind::BreathingRate => r#"{"br":[]}"#.to_string(),
        EndpointKind::SpO2 => "[]".to_string(),
        EndpointKind::Ecg => r#"{"ecgReadings":[],"pagination":{}}"#.to_string(),
        EndpointKind::Devices => "[]".to_string(),
    }
}
