//! Report envelopes produced by the engine.

use serde::{Deserialize, Serialize};

use crate::error::TempoError;
use crate::records::{DeviceSnapshot, NormalizedDataset, NormalizedRecord, Sample, SleepSession};

/// Per-aggregation tally of sub-request outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Sub-requests produced by the window splitter.
    pub planned: usize,
    /// Sub-requests that returned a success status.
    pub succeeded: usize,
    /// Sub-requests that failed (status, transport, or per-call timeout).
    pub failed: usize,
    /// Sub-requests abandoned by cancellation or the request deadline.
    pub cancelled: usize,
}

impl FetchOutcome {
    /// True when every planned sub-request completed successfully.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.succeeded == self.planned
    }

    /// True when the aggregation was cut short before all sub-requests ran.
    #[must_use]
    pub const fn was_interrupted(&self) -> bool {
        self.cancelled > 0
    }
}

/// What an aggregation's data means to a caller.
///
/// An empty table is ambiguous on its own; this distinguishes "the upstream
/// has nothing for that span" from "we never got an answer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// Every sub-request succeeded and records were returned.
    Complete,
    /// Some sub-requests failed or were cancelled; the rest contributed data.
    Partial,
    /// Every sub-request succeeded but the upstream returned no records.
    Empty,
    /// No sub-request succeeded; likely a systemic failure (auth, network).
    Unavailable,
}

/// Whether a report was served from the result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheStatus {
    /// Served from a previously stored (or concurrently in-flight) aggregation.
    Hit,
    /// Computed by this call.
    Miss,
    /// Lookup skipped on request; the fresh result replaced any stored one.
    Refreshed,
    /// Caching disabled in the engine configuration.
    Bypassed,
}

/// Summary of one aggregation.
///
/// Carries the merged dataset, the per-sub-request tally, and any non-fatal
/// warnings (failed days, normalization fallbacks, cancellation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Merged, normalized records.
    pub dataset: NormalizedDataset,
    /// Sub-request outcome tally.
    pub outcome: FetchOutcome,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<TempoError>,
}

impl AggregationReport {
    /// Classify the report for callers that must tell "no data" from "no answer".
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.outcome.succeeded == 0 && self.outcome.planned > 0 {
            Availability::Unavailable
        } else if !self.outcome.is_complete() {
            Availability::Partial
        } else if self.dataset.is_empty() {
            Availability::Empty
        } else {
            Availability::Complete
        }
    }

    /// Last sample carrying a numeric value, in dataset order.
    #[must_use]
    pub fn latest_sample(&self) -> Option<&Sample> {
        self.samples_newest_first()
            .find(|s| s.value.as_f64().is_some())
    }

    /// Last sample whose numeric value is above zero.
    ///
    /// Step series report idle minutes as zero; this finds the last minute
    /// with movement.
    #[must_use]
    pub fn latest_nonzero(&self) -> Option<&Sample> {
        self.samples_newest_first()
            .find(|s| s.value.as_f64().is_some_and(|v| v > 0.0))
    }

    /// Sleep session with the latest start, assuming a sorted dataset.
    #[must_use]
    pub fn latest_sleep(&self) -> Option<&SleepSession> {
        self.dataset
            .records
            .iter()
            .rev()
            .find_map(NormalizedRecord::as_sleep_session)
    }

    /// First device in the upstream listing.
    #[must_use]
    pub fn first_device(&self) -> Option<&DeviceSnapshot> {
        self.dataset.records.iter().find_map(NormalizedRecord::as_device)
    }

    fn samples_newest_first(&self) -> impl Iterator<Item = &Sample> {
        self.dataset
            .records
            .iter()
            .rev()
            .filter_map(NormalizedRecord::as_sample)
    }

    /// Failures attributable to individual sub-requests.
    pub fn sub_request_failures(&self) -> impl Iterator<Item = &TempoError> {
        self.warnings
            .iter()
            .filter(|w| w.is_sub_request_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointKind;
    use crate::records::{NormalizedRecord, Sample, SampleValue};
    use crate::timestamp::Timestamp;

    fn report(planned: usize, succeeded: usize, records: usize) -> AggregationReport {
        let mut dataset = NormalizedDataset::empty(EndpointKind::Steps);
        for i in 0..records {
            dataset.records.push(NormalizedRecord::Sample(Sample {
                timestamp: Timestamp::Date(format!("2024-01-0{}", i + 1)),
                value: SampleValue::Numeric(1.0),
                source: EndpointKind::Steps,
            }));
        }
        AggregationReport {
            dataset,
            outcome: FetchOutcome {
                planned,
                succeeded,
                failed: planned - succeeded,
                cancelled: 0,
            },
            warnings: vec![],
        }
    }

    #[test]
    fn zero_successes_is_not_the_same_as_no_data() {
        assert_eq!(report(3, 0, 0).availability(), Availability::Unavailable);
        assert_eq!(report(3, 3, 0).availability(), Availability::Empty);
        assert_eq!(report(3, 2, 2).availability(), Availability::Partial);
        assert_eq!(report(1, 1, 1).availability(), Availability::Complete);
    }
}
