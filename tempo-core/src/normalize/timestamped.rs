use serde_json::Value;

use super::Chunk;
use super::json;
use crate::window::SubRequest;
use crate::{NormalizedRecord, Sample, SampleValue, Timestamp};

fn push(chunk: &mut Chunk, sub: &SubRequest, at: String, value: SampleValue) {
    chunk.records.push(NormalizedRecord::Sample(Sample {
        timestamp: Timestamp::Instant(at),
        value,
        source: sub.endpoint,
    }));
}

/// `minutes[{minute, value}]` under one day object; `value` is read by `read`.
fn minutes(
    chunk: &mut Chunk,
    sub: &SubRequest,
    day: &Value,
    read: fn(&Value) -> Option<SampleValue>,
) {
    let Some(entries) = json::array(day, "minutes") else {
        return;
    };
    for entry in entries {
        let Some(minute) = json::text_field(entry, "minute") else {
            chunk.warn(sub, "minute entry without 'minute'");
            continue;
        };
        match entry.get("value").and_then(read) {
            Some(v) => push(chunk, sub, minute, v),
            None => chunk.warn(sub, format!("minute {minute} has no usable value")),
        }
    }
}

/// `hrv[].minutes[{minute, value: {rmssd, coverage, hf, lf}}]`.
pub fn hrv_minutes(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(days) = json::array(body, "hrv") else {
        chunk.warn(sub, "response has no 'hrv' array");
        return chunk;
    };
    for day in days {
        minutes(&mut chunk, sub, day, |v| {
            json::fields(v).map(SampleValue::Structured)
        });
    }
    chunk
}

/// Either a single `{dateTime, minutes[]}` object or a list of them.
pub fn spo2(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let read = |v: &Value| json::number(v).map(SampleValue::Numeric);
    match body {
        Value::Array(days) => {
            for day in days {
                minutes(&mut chunk, sub, day, read);
            }
        }
        Value::Object(_) => minutes(&mut chunk, sub, body, read),
        _ => chunk.warn(sub, "response is neither an object nor an array"),
    }
    chunk
}

/// `tempCore[{dateTime, value}]`.
pub fn core_temperature(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(entries) = json::array(body, "tempCore") else {
        chunk.warn(sub, "response has no 'tempCore' array");
        return chunk;
    };
    for (i, entry) in entries.iter().enumerate() {
        match (
            json::text_field(entry, "dateTime"),
            json::number_field(entry, "value"),
        ) {
            (Some(at), Some(v)) => push(&mut chunk, sub, at, SampleValue::Numeric(v)),
            _ => chunk.warn(sub, format!("'tempCore' entry {i} is incomplete")),
        }
    }
    chunk
}

/// `ecgReadings[]` keyed by `startTime`; waveform samples are dropped.
pub fn ecg(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(readings) = json::array(body, "ecgReadings") else {
        chunk.warn(sub, "response has no 'ecgReadings' array");
        return chunk;
    };
    for (i, reading) in readings.iter().enumerate() {
        let Some(start) = json::text_field(reading, "startTime") else {
            chunk.warn(sub, format!("reading {i} has no startTime"));
            continue;
        };
        let Some(mut fields) = json::fields(reading) else {
            continue;
        };
        fields.remove("waveformSamples");
        fields.remove("startTime");
        push(&mut chunk, sub, start, SampleValue::Structured(fields));
    }
    chunk
}
