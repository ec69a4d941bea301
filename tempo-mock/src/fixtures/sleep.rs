use serde_json::{Value, json};

fn stage(date: &str, time: &str, level: &str, seconds: i64) -> Value {
    json!({ "dateTime": format!("{date}T{time}.000"), "level": level, "seconds": seconds })
}

/// One main-sleep log for `date_of_sleep` with the given deep-sleep minutes.
///
/// The session runs from midnight to 08:00 on that day; the stage summary
/// and the stage timeline are both populated so the same body serves the
/// session and stage-level endpoints.
#[must_use]
pub fn sleep_log(date_of_sleep: &str, deep_minutes: i64) -> String {
    let light = 250;
    let rem = 95;
    let wake = 480 - deep_minutes - light - rem;
    json!({
        "sleep": [{
            "logId": 26_589_710_670_i64,
            "dateOfSleep": date_of_sleep,
            "startTime": format!("{date_of_sleep}T00:00:00.000"),
            "endTime": format!("{date_of_sleep}T08:00:00.000"),
            "duration": 28_800_000,
            "efficiency": 94,
            "isMainSleep": true,
            "minutesAsleep": 480 - wake,
            "minutesAwake": wake,
            "minutesAfterWakeup": 0,
            "minutesToFallAsleep": 0,
            "timeInBed": 480,
            "type": "stages",
            "infoCode": 0,
            "levels": {
                "summary": {
                    "deep": {"count": 4, "minutes": deep_minutes, "thirtyDayAvgMinutes": 80},
                    "light": {"count": 28, "minutes": light, "thirtyDayAvgMinutes": 240},
                    "rem": {"count": 6, "minutes": rem, "thirtyDayAvgMinutes": 90},
                    "wake": {"count": 25, "minutes": wake, "thirtyDayAvgMinutes": 60}
                },
                "data": [
                    stage(date_of_sleep, "00:00:00", "wake", 300),
                    stage(date_of_sleep, "00:05:00", "light", 1800),
                    stage(date_of_sleep, "00:35:00", "deep", 2400)
                ]
            }
        }],
        "summary": {
            "stages": {"deep": deep_minutes, "light": light, "rem": rem, "wake": wake},
            "totalMinutesAsleep": 480 - wake,
            "totalSleepRecords": 1,
            "totalTimeInBed": 480
        }
    })
    .to_string()
}

/// Sleep logs with explicit bounds, newest first as the API lists them.
///
/// Each entry is `(date_of_sleep, start_time, end_time)`; bounds are passed
/// through verbatim so callers can exercise every timestamp form.
#[must_use]
pub fn sleep_logs(logs: &[(&str, &str, &str)]) -> String {
    let entries: Vec<Value> = logs
        .iter()
        .enumerate()
        .map(|(i, (day, start, end))| {
            json!({
                "logId": 26_589_710_000_i64 + i as i64,
                "dateOfSleep": day,
                "startTime": start,
                "endTime": end,
                "duration": 0,
                "isMainSleep": true,
                "type": "classic"
            })
        })
        .collect();
    json!({
        "sleep": entries,
        "summary": {"totalMinutesAsleep": 0, "totalSleepRecords": logs.len(), "totalTimeInBed": 0}
    })
    .to_string()
}
