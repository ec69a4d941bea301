//! Translate endpoint-specific JSON into canonical records.
//!
//! All knowledge of upstream field names lives under this module. Each
//! endpoint kind maps to exactly one normalizer in [`normalizer_for`]; the
//! rest of the engine only ever sees [`NormalizedRecord`]s.
//!
//! Normalizers never fail. A body that is not JSON, or that lacks the
//! expected top-level key, yields an empty [`Chunk`] with a warning; a single
//! malformed entry is skipped with a warning and its siblings are kept.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::window::SubRequest;
use crate::{EndpointKind, NormalizedDataset, NormalizedRecord, TempoError};

mod daily;
mod device;
mod intraday;
mod json;
mod sleep;
mod timestamped;

/// Records, summary fields, and warnings extracted from one response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chunk {
    /// Records in upstream order.
    pub records: Vec<NormalizedRecord>,
    /// Additive summary fields.
    pub summary: BTreeMap<String, f64>,
    /// Non-fatal issues.
    pub warnings: Vec<TempoError>,
}

impl Chunk {
    /// An empty chunk carrying a single warning.
    #[must_use]
    pub fn warning(warning: TempoError) -> Self {
        Self {
            warnings: vec![warning],
            ..Self::default()
        }
    }

    pub(crate) fn warn(&mut self, sub: &SubRequest, msg: impl AsRef<str>) {
        self.warnings.push(TempoError::normalization(format!(
            "{} {}: {}",
            sub.endpoint,
            sub.label(),
            msg.as_ref()
        )));
    }

    pub(crate) fn add_summary(&mut self, key: impl Into<String>, value: f64) {
        *self.summary.entry(key.into()).or_insert(0.0) += value;
    }
}

impl From<NormalizedDataset> for Chunk {
    fn from(ds: NormalizedDataset) -> Self {
        Self {
            records: ds.records,
            summary: ds.summary,
            warnings: Vec::new(),
        }
    }
}

/// Shape-specific extraction over a parsed body.
pub type NormalizeFn = fn(&SubRequest, &Value) -> Chunk;

/// Normalizer for each endpoint kind.
#[must_use]
pub const fn normalizer_for(kind: EndpointKind) -> NormalizeFn {
    match kind {
        EndpointKind::HeartRateIntraday
        | EndpointKind::StepsIntraday
        | EndpointKind::ActivityIntraday => intraday::series,
        EndpointKind::HeartRate => daily::heart_rate,
        EndpointKind::Steps => daily::steps,
        EndpointKind::HrvDaily => daily::hrv,
        EndpointKind::SkinTemperature => daily::skin_temperature,
        EndpointKind::BreathingRate => daily::breathing_rate,
        EndpointKind::HrvIntraday => timestamped::hrv_minutes,
        EndpointKind::SpO2 => timestamped::spo2,
        EndpointKind::CoreTemperature => timestamped::core_temperature,
        EndpointKind::Ecg => timestamped::ecg,
        EndpointKind::Sleep => sleep::sessions,
        EndpointKind::SleepLevels => sleep::stages,
        EndpointKind::Devices => device::snapshots,
    }
}

/// Parse `body` and normalize it according to the sub-request's endpoint.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "tempo::core::normalize",
        skip(sub, body),
        fields(endpoint = %sub.endpoint, date = sub.label(), bytes = body.len()),
    )
)]
#[must_use]
pub fn normalize(sub: &SubRequest, body: &str) -> Chunk {
    let chunk = match serde_json::from_str::<Value>(body) {
        Ok(value) => normalizer_for(sub.endpoint)(sub, &value),
        Err(e) => {
            let mut chunk = Chunk::default();
            chunk.warn(sub, format!("body is not valid JSON: {e}"));
            chunk
        }
    };

    #[cfg(feature = "tracing")]
    for w in &chunk.warnings {
        tracing::warn!(target: "tempo::normalize", index = sub.index, warning = %w, "normalization fallback");
    }

    chunk
}
