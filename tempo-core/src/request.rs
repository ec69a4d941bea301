//! Logical request specification, its builder, and its cache fingerprint.

use core::fmt;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{ActivitySubtype, DetailLevel, EndpointKind, TempoError};
use tempo_types::timestamp::{DATE_FORMAT, parse_date};

/// Upper bound the API accepts for the ECG list page size.
pub const ECG_MAX_LIMIT: u32 = 10;

/// Bearer token used to authorize API calls.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a bearer access token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Process-stable digest of the token, safe to embed in keys and logs.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{}>)", self.digest())
    }
}

/// Stable key derived from every present field of a [`RequestSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Returns the serialized key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical, immutable description of one logical telemetry query.
///
/// Dates are kept as `YYYY-MM-DD` text: a malformed date is not rejected here
/// but makes the window splitter fall back to a single unsplit call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSpec {
    endpoint: EndpointKind,
    credential: Credential,
    date_from: Option<String>,
    date_to: Option<String>,
    time_from: Option<NaiveTime>,
    time_to: Option<NaiveTime>,
    detail_level: Option<DetailLevel>,
    limit: Option<u32>,
    activity_subtype: Option<ActivitySubtype>,
}

impl RequestSpec {
    /// Start building a request for `endpoint`, authorized by `credential`.
    #[must_use]
    pub const fn builder(endpoint: EndpointKind, credential: Credential) -> RequestSpecBuilder {
        RequestSpecBuilder::new(endpoint, credential)
    }

    /// Endpoint kind.
    #[must_use]
    pub const fn endpoint(&self) -> EndpointKind {
        self.endpoint
    }

    /// Bearer credential.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// First day of the range, as given.
    #[must_use]
    pub fn date_from(&self) -> Option<&str> {
        self.date_from.as_deref()
    }

    /// Last day of the range (inclusive), as given or defaulted at build time.
    #[must_use]
    pub fn date_to(&self) -> Option<&str> {
        self.date_to.as_deref()
    }

    /// Start of the time-of-day window.
    #[must_use]
    pub const fn time_from(&self) -> Option<NaiveTime> {
        self.time_from
    }

    /// End of the time-of-day window.
    #[must_use]
    pub const fn time_to(&self) -> Option<NaiveTime> {
        self.time_to
    }

    /// Sampling resolution for intraday series.
    #[must_use]
    pub const fn detail_level(&self) -> Option<DetailLevel> {
        self.detail_level
    }

    /// Page size for paginated endpoints.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Resource for the generic activity endpoint.
    #[must_use]
    pub const fn activity_subtype(&self) -> Option<ActivitySubtype> {
        self.activity_subtype
    }

    /// Cache key over the endpoint and every present field.
    ///
    /// The credential participates as a digest, so two users asking for the
    /// same span never share an entry and the token never appears in the key.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut parts = vec![
            format!("endpoint={}", self.endpoint),
            format!("credential={}", self.credential.digest()),
        ];
        if let Some(d) = &self.date_from {
            parts.push(format!("date_from={}", escape_part(d)));
        }
        if let Some(d) = &self.date_to {
            parts.push(format!("date_to={}", escape_part(d)));
        }
        if let Some(t) = self.time_from {
            parts.push(format!("time_from={}", t.format("%H:%M")));
        }
        if let Some(t) = self.time_to {
            parts.push(format!("time_to={}", t.format("%H:%M")));
        }
        if let Some(d) = self.detail_level {
            parts.push(format!("detail_level={d}"));
        }
        if let Some(l) = self.limit {
            parts.push(format!("limit={l}"));
        }
        if let Some(s) = self.activity_subtype {
            parts.push(format!("activity_subtype={s}"));
        }
        Fingerprint(parts.join("|"))
    }
}

/// Raw dates are free text; escape the separator so fields cannot run together.
fn escape_part(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('|', "\\|")
}

/// Builder for [`RequestSpec`].
///
/// Validation is deferred to [`build`](Self::build) so the chain never panics
/// on bad input.
#[derive(Debug, Clone)]
pub struct RequestSpecBuilder {
    endpoint: EndpointKind,
    credential: Credential,
    date_from: Option<String>,
    date_to: Option<String>,
    time_from: Option<NaiveTime>,
    time_to: Option<NaiveTime>,
    detail_level: Option<DetailLevel>,
    limit: Option<u32>,
    activity_subtype: Option<ActivitySubtype>,
}

impl RequestSpecBuilder {
    /// Create a new builder with no range, window, or options set.
    #[must_use]
    pub const fn new(endpoint: EndpointKind, credential: Credential) -> Self {
        Self {
            endpoint,
            credential,
            date_from: None,
            date_to: None,
            time_from: None,
            time_to: None,
            detail_level: None,
            limit: None,
            activity_subtype: None,
        }
    }

    /// Set the first day of the range.
    #[must_use]
    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    /// Set the first day of the range from text.
    ///
    /// Behavior and trade-offs:
    /// - Text that is not `YYYY-MM-DD` is accepted and forwarded as-is; the
    ///   splitter then issues one unsplit call and the upstream reports the error.
    #[must_use]
    pub fn date_from_raw(mut self, date: impl Into<String>) -> Self {
        self.date_from = Some(date.into());
        self
    }

    /// Set the last day of the range (inclusive).
    #[must_use]
    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    /// Set the last day of the range from text. See [`date_from_raw`](Self::date_from_raw).
    #[must_use]
    pub fn date_to_raw(mut self, date: impl Into<String>) -> Self {
        self.date_to = Some(date.into());
        self
    }

    /// Set a single-day range.
    #[must_use]
    pub fn on(self, date: NaiveDate) -> Self {
        self.date_from(date).date_to(date)
    }

    /// Set the start of the time-of-day window (intraday endpoints only).
    #[must_use]
    pub const fn time_from(mut self, time: NaiveTime) -> Self {
        self.time_from = Some(time);
        self
    }

    /// Set the end of the time-of-day window (intraday endpoints only).
    #[must_use]
    pub const fn time_to(mut self, time: NaiveTime) -> Self {
        self.time_to = Some(time);
        self
    }

    /// Select the sampling resolution.
    #[must_use]
    pub const fn detail_level(mut self, level: DetailLevel) -> Self {
        self.detail_level = Some(level);
        self
    }

    /// Set the page size for paginated endpoints (ECG).
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Select the resource for the generic activity endpoint.
    #[must_use]
    pub const fn activity_subtype(mut self, subtype: ActivitySubtype) -> Self {
        self.activity_subtype = Some(subtype);
        self
    }

    /// Validate and freeze the request, resolving "now" defaults from the local clock.
    ///
    /// Behavior and trade-offs:
    /// - An unset `date_to` becomes today and an unset `time_to` becomes the
    ///   current minute, evaluated here and not when the request runs. Two
    ///   builds a second apart may therefore produce different requests (and
    ///   different fingerprints).
    /// - The defaulted `time_to` applies to every day of the range, past days
    ///   included: `2024-01-01..=2024-01-03` built at 14:27 fetches 00:00 to
    ///   14:27 on each of the three days. Set `time_to` explicitly for whole
    ///   past days.
    /// - An unset `time_from` becomes midnight for endpoints with a time window.
    /// - Detail level and ECG page size fall back to per-endpoint defaults.
    ///
    /// # Errors
    /// Returns `InvalidSpecification` when a field required by the endpoint is
    /// missing, when an option does not apply to the endpoint, or when both
    /// dates parse and `date_from` is after `date_to`.
    pub fn build(self) -> Result<RequestSpec, TempoError> {
        self.build_at(Local::now().naive_local())
    }

    /// Like [`build`](Self::build) with an explicit "now".
    ///
    /// # Errors
    /// See [`build`](Self::build).
    pub fn build_at(self, now: NaiveDateTime) -> Result<RequestSpec, TempoError> {
        let kind = self.endpoint;

        if kind.requires_date() && self.date_from.is_none() {
            return Err(TempoError::invalid_spec(format!(
                "date_from is required for {kind}"
            )));
        }

        match (kind, self.activity_subtype) {
            (EndpointKind::ActivityIntraday, None) => {
                return Err(TempoError::invalid_spec(
                    "activity_subtype is required for activity-intraday",
                ));
            }
            (EndpointKind::ActivityIntraday, Some(_)) | (_, None) => {}
            (other, Some(s)) => {
                return Err(TempoError::invalid_spec(format!(
                    "activity_subtype '{s}' does not apply to {other}"
                )));
            }
        }

        if let Some(level) = self.detail_level
            && !kind.detail_levels().contains(&level)
        {
            return Err(TempoError::invalid_spec(format!(
                "detail level {level} is not offered by {kind}"
            )));
        }

        let limit = match (kind, self.limit) {
            (_, Some(0)) => return Err(TempoError::invalid_spec("limit must be positive")),
            (EndpointKind::Ecg, Some(l)) if l > ECG_MAX_LIMIT => {
                return Err(TempoError::invalid_spec(format!(
                    "ecg limit {l} exceeds the maximum of {ECG_MAX_LIMIT}"
                )));
            }
            (EndpointKind::Ecg, l) => Some(l.unwrap_or(ECG_MAX_LIMIT)),
            (_, None) => None,
            (other, Some(_)) => {
                return Err(TempoError::invalid_spec(format!(
                    "limit does not apply to {other}"
                )));
            }
        };

        if let (Some(from), Some(to)) = (&self.date_from, &self.date_to)
            && let (Some(f), Some(t)) = (parse_date(from), parse_date(to))
            && f > t
        {
            return Err(TempoError::invalid_spec(format!(
                "date_from {from} is after date_to {to}"
            )));
        }

        let date_to = match (&self.date_from, self.date_to) {
            (Some(_), None) => Some(now.date().format(DATE_FORMAT).to_string()),
            (_, to) => to,
        };

        let (time_from, time_to) = if kind.takes_time_window() {
            let midnight = NaiveTime::MIN;
            let now_minute = now
                .time()
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or_else(|| now.time());
            (
                Some(self.time_from.unwrap_or(midnight)),
                Some(self.time_to.unwrap_or(now_minute)),
            )
        } else {
            (self.time_from, self.time_to)
        };

        Ok(RequestSpec {
            endpoint: kind,
            credential: self.credential,
            date_from: self.date_from,
            date_to,
            time_from,
            time_to,
            detail_level: self.detail_level.or_else(|| kind.default_detail_level()),
            limit,
            activity_subtype: self.activity_subtype,
        })
    }
}
