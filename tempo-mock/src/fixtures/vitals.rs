use serde_json::{Value, json};

fn per_day(key: &str, days: &[String], value: impl Fn(usize) -> Value) -> String {
    let entries: Vec<Value> = days
        .iter()
        .enumerate()
        .map(|(i, d)| json!({ "dateTime": d, "value": value(i) }))
        .collect();
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), Value::Array(entries));
    Value::Object(body).to_string()
}

/// Daily heart-rate variability.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hrv_daily(days: &[String]) -> String {
    per_day("hrv", days, |i| {
        json!({ "dailyRmssd": 34.5 + i as f64, "deepRmssd": 31.0 + i as f64 })
    })
}

/// Nightly relative skin temperature.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn skin_temperature(days: &[String]) -> String {
    per_day("tempSkin", days, |i| json!({ "nightlyRelative": -0.2 + 0.1 * i as f64 }))
}

/// Nightly breathing rate.
#[must_use]
pub fn breathing_rate(days: &[String]) -> String {
    per_day("br", days, |_| json!({ "breathingRate": 15.2 }))
}

/// Five-minute HRV readings for one night.
#[must_use]
pub fn hrv_intraday(date: &str) -> String {
    json!({
        "hrv": [{
            "dateTime": date,
            "minutes": [
                {"minute": format!("{date}T03:00:00.000"),
                 "value": {"rmssd": 30.1, "coverage": 0.96, "hf": 310.5, "lf": 790.2}},
                {"minute": format!("{date}T03:05:00.000"),
                 "value": {"rmssd": 28.4, "coverage": 0.92, "hf": 280.0, "lf": 805.7}}
            ]
        }]
    })
    .to_string()
}

/// Single-day SpO2 with per-minute readings.
#[must_use]
pub fn spo2(date: &str) -> String {
    json!({
        "dateTime": date,
        "minutes": [
            {"minute": format!("{date}T02:00:00"), "value": 95.6},
            {"minute": format!("{date}T02:01:00"), "value": 96.1}
        ]
    })
    .to_string()
}

/// Core temperature readings.
#[must_use]
pub fn core_temperature(date: &str) -> String {
    json!({
        "tempCore": [
            {"dateTime": format!("{date}T09:00:00"), "value": 37.1},
            {"dateTime": format!("{date}T13:00:00"), "value": 37.3}
        ]
    })
    .to_string()
}

/// One ECG reading with a short waveform.
#[must_use]
pub fn ecg(date: &str) -> String {
    json!({
        "ecgReadings": [{
            "startTime": format!("{date}T10:12:01.000"),
            "averageHeartRate": 72,
            "resultClassification": "Normal Sinus Rhythm",
            "waveformSamples": [130, 176, 252, 365],
            "samplingFrequencyHz": "250",
            "scalingFactor": 10922,
            "numberOfWaveformSamples": 4,
            "leadNumber": 1,
            "featureVersion": "1.2.1-2.10",
            "deviceName": "Sense"
        }],
        "pagination": {
            "afterDate": date, "limit": 1, "next": "", "offset": 0, "previous": "", "sort": "asc"
        }
    })
    .to_string()
}
