use serde_json::Value;

use super::Chunk;
use super::json;
use crate::window::SubRequest;
use crate::{NormalizedRecord, Sample, SampleValue};

/// One entry per day under `key`, each with `dateTime` and `value`.
///
/// Scalar values (including numeric strings) become numeric samples; object
/// values keep their fields as a structured sample.
fn per_day(sub: &SubRequest, body: &Value, key: &str) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(days) = json::array(body, key) else {
        chunk.warn(sub, format!("response has no '{key}' array"));
        return chunk;
    };

    for (i, day) in days.iter().enumerate() {
        let Some(raw) = json::text_field(day, "dateTime") else {
            chunk.warn(sub, format!("'{key}' entry {i} has no dateTime"));
            continue;
        };
        let value = match day.get("value") {
            Some(v @ Value::Object(_)) => json::fields(v).map(SampleValue::Structured),
            Some(v) => json::number(v).map(SampleValue::Numeric),
            None => None,
        };
        let Some(value) = value else {
            chunk.warn(sub, format!("'{key}' entry {i} ({raw}) has no usable value"));
            continue;
        };
        chunk.records.push(NormalizedRecord::Sample(Sample {
            timestamp: json::timestamp(&raw),
            value,
            source: sub.endpoint,
        }));
    }
    chunk
}

pub fn heart_rate(sub: &SubRequest, body: &Value) -> Chunk {
    per_day(sub, body, "activities-heart")
}

pub fn steps(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = per_day(sub, body, "activities-steps");
    let total: f64 = chunk
        .records
        .iter()
        .filter_map(|r| r.as_sample().and_then(|s| s.value.as_f64()))
        .sum();
    if !chunk.records.is_empty() {
        chunk.add_summary("total_steps", total);
    }
    chunk
}

pub fn hrv(sub: &SubRequest, body: &Value) -> Chunk {
    per_day(sub, body, "hrv")
}

pub fn skin_temperature(sub: &SubRequest, body: &Value) -> Chunk {
    per_day(sub, body, "tempSkin")
}

pub fn breathing_rate(sub: &SubRequest, body: &Value) -> Chunk {
    per_day(sub, body, "br")
}
