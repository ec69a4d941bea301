use super::{Cell, ColumnSpec, ColumnType, Processor};
use crate::{NormalizedRecord, SampleValue, TempoError};

/// Stage names emitted as `<stage>_minutes` columns, in column order.
pub const SLEEP_STAGES: [&str; 7] = [
    "deep", "light", "rem", "wake", "asleep", "restless", "awake",
];

/// `datetime, value` for numeric series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesProcessor {
    time: ColumnType,
}

impl SeriesProcessor {
    /// Series keyed by `time` (date for daily series, datetime otherwise).
    #[must_use]
    pub const fn new(time: ColumnType) -> Self {
        Self { time }
    }
}

impl Processor for SeriesProcessor {
    fn columns(&self) -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("datetime", self.time),
            ColumnSpec::new("value", ColumnType::Float),
        ]
    }

    fn row(
        &self,
        record: &NormalizedRecord,
        warnings: &mut Vec<TempoError>,
    ) -> Option<Vec<Cell>> {
        let sample = record.as_sample()?;
        Some(vec![
            Cell::from_timestamp(&sample.timestamp, self.time, warnings),
            sample.value.as_f64().map_or(Cell::Null, Cell::Float),
        ])
    }
}

/// `datetime` plus selected fields of structured samples.
///
/// A numeric sample fills the first field column; the rest stay null.
#[derive(Debug, Clone, Copy)]
pub struct FieldsProcessor {
    time: ColumnType,
    fields: &'static [(&'static str, ColumnType)],
}

impl FieldsProcessor {
    /// Fields keyed by calendar date.
    #[must_use]
    pub const fn daily(fields: &'static [(&'static str, ColumnType)]) -> Self {
        Self {
            time: ColumnType::Date,
            fields,
        }
    }

    /// Fields keyed by full datetime.
    #[must_use]
    pub const fn intraday(fields: &'static [(&'static str, ColumnType)]) -> Self {
        Self {
            time: ColumnType::DateTime,
            fields,
        }
    }
}

impl Processor for FieldsProcessor {
    fn columns(&self) -> Vec<ColumnSpec> {
        std::iter::once(ColumnSpec::new("datetime", self.time))
            .chain(self.fields.iter().map(|(name, ty)| ColumnSpec::new(*name, *ty)))
            .collect()
    }

    fn row(
        &self,
        record: &NormalizedRecord,
        warnings: &mut Vec<TempoError>,
    ) -> Option<Vec<Cell>> {
        let sample = record.as_sample()?;
        let mut row = Vec::with_capacity(self.fields.len() + 1);
        row.push(Cell::from_timestamp(&sample.timestamp, self.time, warnings));
        match &sample.value {
            SampleValue::Structured(map) => {
                row.extend(
                    self.fields
                        .iter()
                        .map(|(name, ty)| Cell::from_json(map.get(*name), *ty)),
                );
            }
            SampleValue::Numeric(v) => {
                for (i, (_, ty)) in self.fields.iter().enumerate() {
                    row.push(if i == 0 {
                        Cell::from_json(Some(&serde_json::json!(v)), *ty)
                    } else {
                        Cell::Null
                    });
                }
            }
        }
        Some(row)
    }
}

/// One row per sleep session with stage minutes flattened into columns.
#[derive(Debug, Clone, Copy)]
pub struct SleepProcessor;

impl Processor for SleepProcessor {
    fn columns(&self) -> Vec<ColumnSpec> {
        let mut cols = vec![
            ColumnSpec::new("dateOfSleep", ColumnType::Date),
            ColumnSpec::new("startTime", ColumnType::DateTime),
            ColumnSpec::new("endTime", ColumnType::DateTime),
            ColumnSpec::new("durationMinutes", ColumnType::Float),
            ColumnSpec::new("efficiency", ColumnType::Float),
            ColumnSpec::new("isMainSleep", ColumnType::Boolean),
            ColumnSpec::new("minutesAsleep", ColumnType::Integer),
            ColumnSpec::new("minutesAwake", ColumnType::Integer),
            ColumnSpec::new("timeInBed", ColumnType::Integer),
        ];
        cols.extend(
            SLEEP_STAGES
                .iter()
                .map(|stage| ColumnSpec::new(format!("{stage}_minutes"), ColumnType::Integer)),
        );
        cols
    }

    fn row(
        &self,
        record: &NormalizedRecord,
        warnings: &mut Vec<TempoError>,
    ) -> Option<Vec<Cell>> {
        let s = record.as_sleep_session()?;
        let int = |v: Option<i64>| v.map_or(Cell::Null, Cell::Int);
        let mut row = vec![
            Cell::temporal(&s.date_of_sleep, ColumnType::Date, warnings),
            Cell::from_timestamp(&s.start, ColumnType::DateTime, warnings),
            Cell::from_timestamp(&s.end, ColumnType::DateTime, warnings),
            Cell::Float(s.duration_minutes),
            s.efficiency.map_or(Cell::Null, Cell::Float),
            Cell::Bool(s.is_main_sleep),
            int(s.minutes_asleep),
            int(s.minutes_awake),
            int(s.time_in_bed),
        ];
        row.extend(SLEEP_STAGES.iter().map(|stage| int(s.stage_minutes(stage))));
        Some(row)
    }
}

/// `datetime, level, seconds` for the sleep stage timeline.
#[derive(Debug, Clone, Copy)]
pub struct SleepStageProcessor;

impl Processor for SleepStageProcessor {
    fn columns(&self) -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("datetime", ColumnType::DateTime),
            ColumnSpec::new("level", ColumnType::Text),
            ColumnSpec::new("seconds", ColumnType::Integer),
        ]
    }

    fn row(
        &self,
        record: &NormalizedRecord,
        warnings: &mut Vec<TempoError>,
    ) -> Option<Vec<Cell>> {
        let NormalizedRecord::SleepStage(stage) = record else {
            return None;
        };
        Some(vec![
            Cell::from_timestamp(&stage.timestamp, ColumnType::DateTime, warnings),
            Cell::Text(stage.level.clone()),
            Cell::Int(stage.seconds),
        ])
    }
}

/// Device snapshots; textual gaps keep the `"N/A"` sentinel.
#[derive(Debug, Clone, Copy)]
pub struct DeviceProcessor;

impl Processor for DeviceProcessor {
    fn columns(&self) -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("id", ColumnType::Text),
            ColumnSpec::new("versionLabel", ColumnType::Text),
            ColumnSpec::new("batteryLevel", ColumnType::Integer),
            ColumnSpec::new("batteryState", ColumnType::Text),
            ColumnSpec::new("lastSyncTime", ColumnType::DateTime),
            ColumnSpec::new("type", ColumnType::Text),
            ColumnSpec::new("macAddress", ColumnType::Text),
        ]
    }

    fn row(
        &self,
        record: &NormalizedRecord,
        warnings: &mut Vec<TempoError>,
    ) -> Option<Vec<Cell>> {
        let NormalizedRecord::Device(d) = record else {
            return None;
        };
        Some(vec![
            Cell::Text(d.id.clone()),
            Cell::Text(d.version_label.clone()),
            d.battery_level.map_or(Cell::Null, Cell::Int),
            Cell::Text(d.battery_state.clone()),
            Cell::temporal(&d.last_sync_time, ColumnType::DateTime, warnings),
            Cell::Text(d.device_type.clone()),
            Cell::Text(d.mac_address.clone()),
        ])
    }
}
