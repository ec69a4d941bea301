use std::collections::BTreeMap;

use serde_json::Value;

use super::Chunk;
use super::json;
use crate::window::SubRequest;
use crate::{NormalizedRecord, SleepSession, SleepStage};

const MS_PER_MINUTE: f64 = 60_000.0;

fn stage_minutes(log: &Value) -> BTreeMap<String, i64> {
    log.get("levels")
        .and_then(|l| l.get("summary"))
        .and_then(Value::as_object)
        .map(|stages| {
            stages
                .iter()
                .filter_map(|(stage, v)| {
                    json::integer_field(v, "minutes").map(|m| (stage.clone(), m))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn session(log: &Value) -> Option<SleepSession> {
    Some(SleepSession {
        log_id: json::integer_field(log, "logId"),
        date_of_sleep: json::text_field(log, "dateOfSleep")?,
        start: json::timestamp(&json::text_field(log, "startTime")?),
        end: json::timestamp(&json::text_field(log, "endTime")?),
        duration_minutes: json::number_field(log, "duration").unwrap_or(0.0) / MS_PER_MINUTE,
        efficiency: json::number_field(log, "efficiency"),
        is_main_sleep: log
            .get("isMainSleep")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        minutes_asleep: json::integer_field(log, "minutesAsleep"),
        minutes_awake: json::integer_field(log, "minutesAwake"),
        time_in_bed: json::integer_field(log, "timeInBed"),
        stage_minutes: stage_minutes(log),
    })
}

/// Add numeric fields of the root `summary`; nested objects flatten as `outer_inner`.
fn summarize(chunk: &mut Chunk, prefix: Option<&str>, obj: &Value) {
    let Some(map) = obj.as_object() else {
        return;
    };
    for (key, value) in map {
        let name = prefix.map_or_else(|| key.clone(), |p| format!("{p}_{key}"));
        if value.is_object() {
            summarize(chunk, Some(&name), value);
        } else if let Some(n) = value.as_f64() {
            chunk.add_summary(name, n);
        }
    }
}

/// `sleep[]` logs with flattened stage minutes plus the root `summary`.
pub fn sessions(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(logs) = json::array(body, "sleep") else {
        chunk.warn(sub, "response has no 'sleep' array");
        return chunk;
    };
    for (i, log) in logs.iter().enumerate() {
        match session(log) {
            Some(s) => chunk.records.push(NormalizedRecord::SleepSession(s)),
            None => chunk.warn(sub, format!("sleep log {i} lacks its date or bounds")),
        }
    }
    if let Some(summary) = body.get("summary") {
        summarize(&mut chunk, None, summary);
    }
    chunk
}

/// `sleep[].levels.data[{dateTime, level, seconds}]`.
pub fn stages(sub: &SubRequest, body: &Value) -> Chunk {
    let mut chunk = Chunk::default();
    let Some(logs) = json::array(body, "sleep") else {
        chunk.warn(sub, "response has no 'sleep' array");
        return chunk;
    };
    for log in logs {
        let Some(data) = log.get("levels").and_then(|l| json::array(l, "data")) else {
            continue;
        };
        for entry in data {
            let stage = json::text_field(entry, "dateTime").and_then(|at| {
                Some(SleepStage {
                    timestamp: json::timestamp(&at),
                    level: json::text_field(entry, "level")?,
                    seconds: json::integer_field(entry, "seconds")?,
                })
            });
            match stage {
                Some(s) => chunk.records.push(NormalizedRecord::SleepStage(s)),
                None => chunk.warn(sub, "stage entry lacks dateTime/level/seconds"),
            }
        }
    }
    chunk
}
