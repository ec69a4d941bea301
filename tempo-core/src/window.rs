//! Window splitting: turn one logical request into per-call sub-requests.
//!
//! Intraday endpoints serve at most one calendar day per call, so a range is
//! walked day by day. Everything else is a single call regardless of span.
//! Splitting is a compliance step, not a validation step: an inverted range
//! or an unparsable date yields the single unsplit call and the upstream
//! response reports the problem.

use core::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::request::{Credential, RequestSpec};
use crate::{ActivitySubtype, DetailLevel, EndpointKind, WindowPolicy};
use tempo_types::timestamp::{DATE_FORMAT, parse_date};

/// Header set sent with every call.
///
/// `Debug` redacts the authorization value.
#[derive(Clone, PartialEq, Eq)]
pub struct Headers(Vec<(&'static str, String)>);

impl Headers {
    /// `Accept: application/json` and bearer authorization.
    #[must_use]
    pub fn for_credential(credential: &Credential) -> Self {
        Self(vec![
            ("Accept", "application/json".to_string()),
            ("Authorization", credential.authorization()),
        ])
    }

    /// Iterate name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.0 {
            if k.eq_ignore_ascii_case("authorization") {
                map.entry(k, &"Bearer <redacted>");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

/// One remote call: a single calendar day of an intraday request, or the
/// whole span when no split applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRequest {
    /// Position in chronological order; results are merged by this index.
    pub index: usize,
    /// Endpoint kind.
    pub endpoint: EndpointKind,
    /// Day covered (the range start when unsplit); `None` for dateless endpoints.
    pub date: Option<String>,
    /// Range end; equals `date` for per-day slices.
    pub date_to: Option<String>,
    /// Start of the time-of-day window.
    pub time_from: Option<NaiveTime>,
    /// End of the time-of-day window.
    pub time_to: Option<NaiveTime>,
    /// Sampling resolution.
    pub detail_level: Option<DetailLevel>,
    /// Page size.
    pub limit: Option<u32>,
    /// Activity resource.
    pub activity_subtype: Option<ActivitySubtype>,
    /// Endpoint path relative to the API base URL.
    pub path: String,
    /// Headers to send.
    pub headers: Headers,
}

impl SubRequest {
    /// Short identity used in logs and warnings.
    #[must_use]
    pub fn label(&self) -> &str {
        self.date.as_deref().unwrap_or("-")
    }

    fn from_spec(
        spec: &RequestSpec,
        index: usize,
        date: Option<String>,
        date_to: Option<String>,
    ) -> Self {
        let mut sub = Self {
            index,
            endpoint: spec.endpoint(),
            date,
            date_to,
            time_from: spec.time_from(),
            time_to: spec.time_to(),
            detail_level: spec.detail_level(),
            limit: spec.limit(),
            activity_subtype: spec.activity_subtype(),
            path: String::new(),
            headers: Headers::for_credential(spec.credential()),
        };
        sub.path = render_path(&sub);
        sub
    }
}

/// Days the request must be split into, or `None` for a single unsplit call.
fn split_days(spec: &RequestSpec) -> Option<Vec<NaiveDate>> {
    if spec.endpoint().window_policy() != WindowPolicy::OneDayPerCall {
        return None;
    }
    let from = parse_date(spec.date_from()?)?;
    let to = parse_date(spec.date_to()?)?;
    if from >= to {
        return None;
    }
    Some(from.iter_days().take_while(|d| *d <= to).collect())
}

/// Partition a request into chronologically ordered sub-requests.
///
/// Behavior:
/// - Intraday endpoints spanning N > 1 calendar days yield N one-day
///   sub-requests in ascending order, each with the parent's time window,
///   detail level, and limit.
/// - Equal dates, non-intraday endpoints, an inverted range, or a date that
///   does not parse yield exactly one sub-request covering the whole spec.
#[must_use]
pub fn split(spec: &RequestSpec) -> Vec<SubRequest> {
    match split_days(spec) {
        Some(days) => days
            .into_iter()
            .enumerate()
            .map(|(i, day)| {
                let d = day.format(DATE_FORMAT).to_string();
                SubRequest::from_spec(spec, i, Some(d.clone()), Some(d))
            })
            .collect(),
        None => vec![SubRequest::from_spec(
            spec,
            0,
            spec.date_from().map(str::to_string),
            spec.date_to().map(str::to_string),
        )],
    }
}

fn hhmm(t: Option<NaiveTime>, fallback: NaiveTime) -> String {
    t.unwrap_or(fallback).format("%H:%M").to_string()
}

/// Render the endpoint path for a sub-request.
fn render_path(sub: &SubRequest) -> String {
    let from = sub.date.as_deref().unwrap_or_default();
    let to = sub.date_to.as_deref().unwrap_or(from);
    let detail = sub
        .detail_level
        .or_else(|| sub.endpoint.default_detail_level())
        .map_or("1min", DetailLevel::as_str);
    let t0 = hhmm(sub.time_from, NaiveTime::MIN);
    let t1 = hhmm(
        sub.time_to,
        NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
    );

    match sub.endpoint {
        EndpointKind::HeartRateIntraday => {
            format!("1/user/-/activities/heart/date/{from}/1d/{detail}/time/{t0}/{t1}.json")
        }
        EndpointKind::StepsIntraday => {
            format!("1/user/-/activities/steps/date/{from}/1d/{detail}/time/{t0}/{t1}.json")
        }
        EndpointKind::ActivityIntraday => {
            let resource = sub
                .activity_subtype
                .map_or("steps", ActivitySubtype::as_str);
            format!("1/user/-/activities/{resource}/date/{from}/1d/{detail}/time/{t0}/{t1}.json")
        }
        EndpointKind::HeartRate => format!("1/user/-/activities/heart/date/{from}/{to}.json"),
        EndpointKind::Steps => format!("1/user/-/activities/steps/date/{from}/{to}.json"),
        EndpointKind::Sleep | EndpointKind::SleepLevels => {
            format!("1.2/user/-/sleep/date/{from}/{to}.json")
        }
        EndpointKind::HrvDaily => format!("1/user/-/hrv/date/{from}/{to}.json"),
        EndpointKind::HrvIntraday => format!("1/user/-/hrv/date/{from}/all.json"),
        EndpointKind::SkinTemperature => format!("1/user/-/temp/skin/date/{from}/{to}.json"),
        EndpointKind::CoreTemperature => format!("1/user/-/temp/core/date/{from}/{to}.json"),
        EndpointKind::BreathingRate => format!("1/user/-/br/date/{from}/{to}.json"),
        EndpointKind::SpO2 => format!("1/user/-/spo2/date/{from}/{to}/all.json"),
        EndpointKind::Ecg => format!(
            "1/user/-/ecg/list.json?afterDate={from}&sort=asc&limit={}&offset=0",
            sub.limit.unwrap_or(crate::request::ECG_MAX_LIMIT)
        ),
        EndpointKind::Devices => "1/user/-/devices.json".to_string(),
    }
}
