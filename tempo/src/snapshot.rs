//! Current readings for one wearer: latest heart rate, recent steps, battery,
//! and last night's sleep.
//!
//! Each reading is one aggregation over a short span ending at `now`, always
//! force-refreshed so stored results are never served.

use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use tempo_core::{
    AggregationReport, Availability, Credential, EndpointKind, RequestSpec, SleepSession,
    TempoError,
};

use crate::core::Tempo;
use crate::pipeline::AggregateOptions;

const HEART_RATE_LOOKBACK_HOURS: i64 = 1;
const STEPS_LOOKBACK_HOURS: i64 = 6;

impl Tempo {
    /// Most recent heart-rate sample within the hour before `now`.
    ///
    /// Behavior and trade-offs:
    /// - The window never reaches back past midnight; shortly after midnight
    ///   only today's minutes are searched.
    /// - `Ok(None)` means the upstream answered with no samples (watch off
    ///   the wrist, not yet synced).
    ///
    /// # Errors
    /// Returns the first sub-request failure when the upstream did not answer.
    pub async fn current_heart_rate(
        &self,
        credential: Credential,
        now: NaiveDateTime,
    ) -> Result<Option<f64>, TempoError> {
        let spec = recent(
            EndpointKind::HeartRateIntraday,
            credential,
            now,
            HEART_RATE_LOOKBACK_HOURS,
        )?;
        let report = self.reading(&spec).await?;
        Ok(report.latest_sample().and_then(|s| s.value.as_f64()))
    }

    /// Step count of the last minute with movement in the six hours before `now`.
    ///
    /// # Errors
    /// Returns the first sub-request failure when the upstream did not answer.
    pub async fn current_steps(
        &self,
        credential: Credential,
        now: NaiveDateTime,
    ) -> Result<Option<f64>, TempoError> {
        let spec = recent(
            EndpointKind::StepsIntraday,
            credential,
            now,
            STEPS_LOOKBACK_HOURS,
        )?;
        let report = self.reading(&spec).await?;
        Ok(report.latest_nonzero().and_then(|s| s.value.as_f64()))
    }

    /// Battery percentage of the first paired device.
    ///
    /// # Errors
    /// Returns the sub-request failure when the device listing is unavailable.
    pub async fn battery_level(&self, credential: Credential) -> Result<Option<i64>, TempoError> {
        let spec = RequestSpec::builder(EndpointKind::Devices, credential).build()?;
        let report = self.reading(&spec).await?;
        Ok(report.first_device().and_then(|d| d.battery_level))
    }

    /// Latest sleep log attributed to yesterday or today.
    ///
    /// Use [`SleepSession::hours`] for its length.
    ///
    /// # Errors
    /// Returns the sub-request failure when the sleep log is unavailable.
    pub async fn last_sleep(
        &self,
        credential: Credential,
        now: NaiveDateTime,
    ) -> Result<Option<SleepSession>, TempoError> {
        let today = now.date();
        let yesterday = today.pred_opt().unwrap_or(today);
        let spec = RequestSpec::builder(EndpointKind::Sleep, credential)
            .date_from(yesterday)
            .date_to(today)
            .build_at(now)?;
        let report = self.reading(&spec).await?;
        Ok(report.latest_sleep().cloned())
    }

    async fn reading(&self, spec: &RequestSpec) -> Result<Arc<AggregationReport>, TempoError> {
        let (report, _) = self
            .aggregate_with(spec, AggregateOptions::new().force_refresh(true))
            .await;
        if report.availability() == Availability::Unavailable {
            return Err(report.warnings.first().cloned().unwrap_or_else(|| {
                TempoError::Other(format!("no answer for {}", spec.endpoint()))
            }));
        }
        Ok(report)
    }
}

/// Today's window of `hours` ending at the minute of `now`, clamped to midnight.
fn recent(
    kind: EndpointKind,
    credential: Credential,
    now: NaiveDateTime,
    hours: i64,
) -> Result<RequestSpec, TempoError> {
    let today = now.date();
    let since = now - TimeDelta::hours(hours);
    let start = if since.date() < today {
        NaiveTime::MIN
    } else {
        to_minute(since.time())
    };
    RequestSpec::builder(kind, credential)
        .on(today)
        .time_from(start)
        .time_to(to_minute(now.time()))
        .build_at(now)
}

fn to_minute(t: NaiveTime) -> NaiveTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
