use serde_json::{Value, json};

fn dataset(samples: &[(&str, f64)]) -> Vec<Value> {
    samples
        .iter()
        .map(|(time, value)| json!({ "time": time, "value": value }))
        .collect()
}

/// Heart rate intraday for one day with the given `(HH:MM:SS, bpm)` samples.
#[must_use]
pub fn heart_rate_intraday(date: &str, samples: &[(&str, f64)]) -> String {
    json!({
        "activities-heart": [{
            "dateTime": date,
            "value": {
                "customHeartRateZones": [],
                "heartRateZones": [
                    {"name": "Out of Range", "min": 30, "max": 99, "minutes": 1200},
                    {"name": "Fat Burn", "min": 99, "max": 139, "minutes": 200}
                ],
                "restingHeartRate": 60
            }
        }],
        "activities-heart-intraday": {
            "dataset": dataset(samples),
            "datasetInterval": 1,
            "datasetType": "second"
        }
    })
    .to_string()
}

/// Intraday series for an activity resource (`steps`, `calories`, ...).
#[must_use]
pub fn intraday(resource: &str, date: &str, samples: &[(&str, f64)]) -> String {
    let total: f64 = samples.iter().map(|(_, v)| v).sum();
    let mut body = serde_json::Map::new();
    body.insert(
        format!("activities-{resource}"),
        json!([{ "dateTime": date, "value": total.to_string() }]),
    );
    body.insert(
        format!("activities-{resource}-intraday"),
        json!({
            "dataset": dataset(samples),
            "datasetInterval": 1,
            "datasetType": "minute"
        }),
    );
    Value::Object(body).to_string()
}

/// Daily heart rate summaries with a constant resting heart rate.
#[must_use]
pub fn heart_rate_daily(days: &[String], resting: i64) -> String {
    let entries: Vec<Value> = days
        .iter()
        .map(|d| {
            json!({
                "dateTime": d,
                "value": { "heartRateZones": [], "restingHeartRate": resting }
            })
        })
        .collect();
    json!({ "activities-heart": entries }).to_string()
}

/// Daily step totals, encoded as strings like the real API.
#[must_use]
pub fn steps_daily(days: &[String], base: i64) -> String {
    let entries: Vec<Value> = days
        .iter()
        .zip(0i64..)
        .map(|(d, i)| json!({ "dateTime": d, "value": (base + i * 100).to_string() }))
        .collect();
    json!({ "activities-steps": entries }).to_string()
}
