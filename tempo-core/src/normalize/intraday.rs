use serde_json::Value;

use super::Chunk;
use super::json;
use crate::window::SubRequest;
use crate::{ActivitySubtype, EndpointKind, NormalizedRecord, Sample, SampleValue, Timestamp};

/// Resource segment used in the `activities-{resource}` keys.
fn resource(sub: &SubRequest) -> &'static str {
    match sub.endpoint {
        EndpointKind::HeartRateIntraday => "heart",
        EndpointKind::ActivityIntraday => sub
            .activity_subtype
            .map_or("steps", ActivitySubtype::as_str),
        _ => "steps",
    }
}

/// `activities-{r}-intraday.dataset[{time, value}]` plus the daily `activities-{r}` summary.
///
/// Dataset entries only carry a time of day; the date comes from the
/// sub-request, which always covers exactly one day for intraday kinds.
pub fn series(sub: &SubRequest, body: &Value) -> Chunk {
    let res = resource(sub);
    let dataset_key = format!("activities-{res}-intraday");
    let mut chunk = Chunk::default();

    let Some(dataset) = body.get(&dataset_key).and_then(|v| json::array(v, "dataset")) else {
        chunk.warn(sub, format!("response has no '{dataset_key}.dataset'"));
        return chunk;
    };

    let date = sub.date.clone().unwrap_or_default();
    for (i, entry) in dataset.iter().enumerate() {
        let timestamp = match (
            json::text_field(entry, "dateTime"),
            json::text_field(entry, "time"),
        ) {
            (Some(dt), _) if dt.len() > 10 => Timestamp::Instant(dt),
            (_, Some(time)) => Timestamp::Split {
                date: date.clone(),
                time,
            },
            _ => {
                chunk.warn(sub, format!("dataset entry {i} has no time"));
                continue;
            }
        };
        let Some(value) = json::number_field(entry, "value") else {
            chunk.warn(sub, format!("dataset entry {i} has a non-numeric value"));
            continue;
        };
        chunk.records.push(NormalizedRecord::Sample(Sample {
            timestamp,
            value: SampleValue::Numeric(value),
            source: sub.endpoint,
        }));
    }

    if let Some(days) = json::array(body, &format!("activities-{res}")) {
        for day in days {
            if let Some(total) = json::number_field(day, "value") {
                chunk.add_summary(format!("total_{res}"), total);
            }
        }
    }

    chunk
}
