//! Canonical telemetry records produced by the normalizers.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointKind;
use crate::timestamp::Timestamp;

/// Sentinel used for textual device fields missing from the source payload.
pub const NOT_AVAILABLE: &str = "N/A";

/// Measurement carried by a [`Sample`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// A single scalar (beats per minute, steps, percent, ...).
    Numeric(f64),
    /// A set of named fields (e.g. `dailyRmssd` and `deepRmssd`).
    Structured(BTreeMap<String, serde_json::Value>),
}

impl SampleValue {
    /// Scalar value, if this is a numeric sample.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Structured(_) => None,
        }
    }

    /// Named field of a structured sample.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        match self {
            Self::Numeric(_) => None,
            Self::Structured(map) => map.get(name),
        }
    }
}

/// A single timestamped measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the measurement was taken.
    pub timestamp: Timestamp,
    /// The measurement itself.
    pub value: SampleValue,
    /// Endpoint that produced the sample.
    pub source: EndpointKind,
}

/// One sleep log with its stage summary flattened into per-stage minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    /// Upstream log identifier, when present.
    pub log_id: Option<i64>,
    /// Calendar day the sleep is attributed to.
    pub date_of_sleep: String,
    /// Session start.
    pub start: Timestamp,
    /// Session end.
    pub end: Timestamp,
    /// Session length in minutes (upstream reports milliseconds).
    pub duration_minutes: f64,
    /// Sleep efficiency score.
    pub efficiency: Option<f64>,
    /// Whether this is the main sleep of the day.
    pub is_main_sleep: bool,
    /// Minutes asleep.
    pub minutes_asleep: Option<i64>,
    /// Minutes awake.
    pub minutes_awake: Option<i64>,
    /// Minutes in bed.
    pub time_in_bed: Option<i64>,
    /// Stage name (`deep`, `light`, `rem`, `wake`, `asleep`, `restless`, `awake`) to minutes.
    pub stage_minutes: BTreeMap<String, i64>,
}

impl SleepSession {
    /// Start and end, when both timestamps resolve.
    #[must_use]
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.start.resolve()?, self.end.resolve()?))
    }

    /// Wall-clock length from start to end in hours.
    ///
    /// Computed from the timestamps, not the upstream `duration`. `None` when
    /// either timestamp is unreadable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> Option<f64> {
        let (start, end) = self.span()?;
        Some((end - start).num_milliseconds() as f64 / 3_600_000.0)
    }

    /// Minutes spent in the named stage.
    #[must_use]
    pub fn stage_minutes(&self, stage: &str) -> Option<i64> {
        self.stage_minutes.get(stage).copied()
    }

    /// Flattened field lookup, e.g. `deep_minutes`.
    #[must_use]
    pub fn stage_field(&self, field: &str) -> Option<i64> {
        field
            .strip_suffix("_minutes")
            .and_then(|stage| self.stage_minutes(stage))
    }

    /// Flattened `<stage>_minutes` fields in stage-name order.
    pub fn stage_fields(&self) -> impl Iterator<Item = (String, i64)> + '_ {
        self.stage_minutes
            .iter()
            .map(|(stage, minutes)| (format!("{stage}_minutes"), *minutes))
    }
}

/// One entry of a sleep log's stage timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStage {
    /// Start of the stage.
    pub timestamp: Timestamp,
    /// Stage name as reported upstream.
    pub level: String,
    /// Length of the stage in seconds.
    pub seconds: i64,
}

/// Point-in-time snapshot of a paired device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Device identifier.
    pub id: String,
    /// Model name.
    pub version_label: String,
    /// Battery percentage, when reported.
    pub battery_level: Option<i64>,
    /// Battery state label (`High`, `Medium`, `Low`, `Empty`).
    pub battery_state: String,
    /// Last synchronization time as reported.
    pub last_sync_time: String,
    /// Device type (`TRACKER`, `SCALE`, ...).
    pub device_type: String,
    /// Hardware address.
    pub mac_address: String,
}

/// Canonical unit of telemetry after shape translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum NormalizedRecord {
    /// Timestamped measurement.
    Sample(Sample),
    /// Sleep log.
    SleepSession(SleepSession),
    /// Sleep stage transition.
    SleepStage(SleepStage),
    /// Device snapshot.
    Device(DeviceSnapshot),
}

impl NormalizedRecord {
    /// Ordering key, or `None` for records that are not time-keyed (devices).
    #[must_use]
    pub const fn timestamp(&self) -> Option<&Timestamp> {
        match self {
            Self::Sample(s) => Some(&s.timestamp),
            Self::SleepSession(s) => Some(&s.start),
            Self::SleepStage(s) => Some(&s.timestamp),
            Self::Device(_) => None,
        }
    }

    /// Inner sample, if this record is one.
    #[must_use]
    pub const fn as_sample(&self) -> Option<&Sample> {
        match self {
            Self::Sample(s) => Some(s),
            _ => None,
        }
    }

    /// Inner sleep session, if this record is one.
    #[must_use]
    pub const fn as_sleep_session(&self) -> Option<&SleepSession> {
        match self {
            Self::SleepSession(s) => Some(s),
            _ => None,
        }
    }

    /// Inner device snapshot, if this record is one.
    #[must_use]
    pub const fn as_device(&self) -> Option<&DeviceSnapshot> {
        match self {
            Self::Device(d) => Some(d),
            _ => None,
        }
    }
}

/// Ordered records for one request plus endpoint-level summary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDataset {
    /// Endpoint the records came from.
    pub endpoint: EndpointKind,
    /// Records, ascending by timestamp when `sorted` is true.
    pub records: Vec<NormalizedRecord>,
    /// Additive summary fields (e.g. `total_steps`), summed across sub-requests.
    pub summary: BTreeMap<String, f64>,
    /// False when some sort key could not be resolved and the records were
    /// left in concatenation order.
    pub sorted: bool,
}

impl NormalizedDataset {
    /// An empty, trivially ordered dataset.
    #[must_use]
    pub const fn empty(endpoint: EndpointKind) -> Self {
        Self {
            endpoint,
            records: Vec::new(),
            summary: BTreeMap::new(),
            sorted: true,
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
