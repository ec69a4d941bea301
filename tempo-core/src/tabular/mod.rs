//! Processor registry: flatten a [`NormalizedDataset`] into typed rows.
//!
//! Every endpoint kind has exactly one processor, chosen by
//! [`processor_for`]. Processors are pure and stateless: the same dataset
//! always produces the same table, and an empty dataset still yields the
//! full column schema.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    EndpointKind, NOT_AVAILABLE, NormalizedDataset, NormalizedRecord, TempoError, Timestamp,
};
use tempo_types::timestamp::{parse_date, parse_datetime};

mod processors;

#[cfg(feature = "dataframe")]
mod dataframe;
#[cfg(feature = "dataframe")]
pub use dataframe::ToDataFrame;

pub use processors::{
    DeviceProcessor, FieldsProcessor, SLEEP_STAGES, SeriesProcessor, SleepProcessor,
    SleepStageProcessor,
};

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Date and time of day.
    DateTime,
    /// Calendar date.
    Date,
    /// Signed integer.
    Integer,
    /// Floating point.
    Float,
    /// Boolean flag.
    Boolean,
    /// Free text.
    Text,
}

/// Name and type of one output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name as consumed downstream.
    pub name: String,
    /// Logical type.
    pub ty: ColumnType,
}

impl ColumnSpec {
    /// Shorthand constructor.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// One typed value in a row.
///
/// A temporal value that matched no known format is kept verbatim as
/// [`Cell::Text`] so downstream consumers still see what upstream sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Parsed date and time.
    DateTime(NaiveDateTime),
    /// Parsed date.
    Date(NaiveDate),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Text value, or an opaque temporal value.
    Text(String),
    /// Missing value.
    Null,
}

impl Cell {
    /// True for [`Cell::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a raw temporal value for a column of type `ty`.
    ///
    /// `"N/A"` and empty strings are [`Cell::Null`]. A value no format
    /// accepts becomes [`Cell::Text`] and a warning is pushed.
    pub fn temporal(raw: &str, ty: ColumnType, warnings: &mut Vec<TempoError>) -> Self {
        if raw.is_empty() || raw == NOT_AVAILABLE {
            return Self::Null;
        }
        let parsed = match ty {
            ColumnType::Date => parse_date(raw)
                .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
                .map(Self::Date),
            _ => parse_datetime(raw).map(Self::DateTime),
        };
        parsed.unwrap_or_else(|| {
            warnings.push(TempoError::normalization(format!(
                "unrecognised timestamp '{raw}', kept as text"
            )));
            Self::Text(raw.to_string())
        })
    }

    /// [`Cell::temporal`] over a record timestamp.
    pub fn from_timestamp(
        ts: &Timestamp,
        ty: ColumnType,
        warnings: &mut Vec<TempoError>,
    ) -> Self {
        match ts.resolve() {
            Some(dt) if ty == ColumnType::Date => Self::Date(dt.date()),
            Some(dt) => Self::DateTime(dt),
            None => Self::temporal(&ts.render(), ty, warnings),
        }
    }

    /// Coerce a JSON scalar to the column type; mismatches become [`Cell::Null`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_json(value: Option<&serde_json::Value>, ty: ColumnType) -> Self {
        use serde_json::Value;
        let Some(value) = value else {
            return Self::Null;
        };
        let numeric = || match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        match ty {
            ColumnType::Integer => match value {
                Value::Number(n) => n.as_i64().map_or_else(
                    || n.as_f64().map_or(Self::Null, |f| Self::Int(f.round() as i64)),
                    Self::Int,
                ),
                _ => numeric().map_or(Self::Null, |f| Self::Int(f.round() as i64)),
            },
            ColumnType::Float => numeric().map_or(Self::Null, Self::Float),
            ColumnType::Boolean => value.as_bool().map_or(Self::Null, Self::Bool),
            ColumnType::Text => match value {
                Value::String(s) => Self::Text(s.clone()),
                Value::Null => Self::Null,
                other => Self::Text(other.to_string()),
            },
            ColumnType::Date | ColumnType::DateTime => value
                .as_str()
                .map_or(Self::Null, |raw| Self::temporal(raw, ty, &mut Vec::new())),
        }
    }
}

/// Rows ready for a downstream writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    /// Endpoint the rows describe.
    pub endpoint: EndpointKind,
    /// Column schema; every row has exactly this many cells.
    pub columns: Vec<ColumnSpec>,
    /// Rows in dataset order.
    pub rows: Vec<Vec<Cell>>,
    /// Records skipped or values kept opaque while building the rows.
    pub warnings: Vec<TempoError>,
}

impl TabularResult {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell at `row` in the named column.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of the named column.
    pub fn column(&self, name: &str) -> impl Iterator<Item = &Cell> {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |r| idx.and_then(|i| r.get(i)))
    }
}

/// Flattens one endpoint's records into rows.
pub trait Processor: Send + Sync {
    /// Column schema, independent of the data.
    fn columns(&self) -> Vec<ColumnSpec>;

    /// Cells for one record, or `None` if the record does not belong to this
    /// processor's endpoint (counted as a warning by [`Processor::process`]).
    fn row(
        &self,
        record: &NormalizedRecord,
        warnings: &mut Vec<TempoError>,
    ) -> Option<Vec<Cell>>;

    /// Apply [`Processor::row`] to every record of the dataset.
    fn process(&self, dataset: &NormalizedDataset) -> TabularResult {
        let mut warnings = Vec::new();
        let mut rows = Vec::with_capacity(dataset.records.len());
        for record in &dataset.records {
            match self.row(record, &mut warnings) {
                Some(row) => rows.push(row),
                None => warnings.push(TempoError::normalization(format!(
                    "{}: skipped a record of an unexpected kind",
                    dataset.endpoint
                ))),
            }
        }
        TabularResult {
            endpoint: dataset.endpoint,
            columns: self.columns(),
            rows,
            warnings,
        }
    }
}

static SERIES: SeriesProcessor = SeriesProcessor::new(ColumnType::DateTime);
static DAILY_SERIES: SeriesProcessor = SeriesProcessor::new(ColumnType::Date);
static HEART_RATE: FieldsProcessor =
    FieldsProcessor::daily(&[("restingHeartRate", ColumnType::Integer)]);
static HRV_DAILY: FieldsProcessor = FieldsProcessor::daily(&[
    ("dailyRmssd", ColumnType::Float),
    ("deepRmssd", ColumnType::Float),
]);
static HRV_INTRADAY: FieldsProcessor = FieldsProcessor::intraday(&[
    ("rmssd", ColumnType::Float),
    ("coverage", ColumnType::Float),
    ("hf", ColumnType::Float),
    ("lf", ColumnType::Float),
]);
static SKIN_TEMPERATURE: FieldsProcessor =
    FieldsProcessor::daily(&[("nightlyRelative", ColumnType::Float)]);
static BREATHING_RATE: FieldsProcessor =
    FieldsProcessor::daily(&[("breathingRate", ColumnType::Float)]);
static ECG: FieldsProcessor = FieldsProcessor::intraday(&[
    ("averageHeartRate", ColumnType::Integer),
    ("resultClassification", ColumnType::Text),
]);
static SLEEP: SleepProcessor = SleepProcessor;
static SLEEP_LEVELS: SleepStageProcessor = SleepStageProcessor;
static DEVICES: DeviceProcessor = DeviceProcessor;

/// The processor responsible for an endpoint kind.
#[must_use]
pub fn processor_for(kind: EndpointKind) -> &'static dyn Processor {
    match kind {
        EndpointKind::HeartRateIntraday
        | EndpointKind::StepsIntraday
        | EndpointKind::ActivityIntraday
        | EndpointKind::SpO2
        | EndpointKind::CoreTemperature => &SERIES,
        EndpointKind::Steps => &DAILY_SERIES,
        EndpointKind::HeartRate => &HEART_RATE,
        EndpointKind::HrvDaily => &HRV_DAILY,
        EndpointKind::HrvIntraday => &HRV_INTRADAY,
        EndpointKind::SkinTemperature => &SKIN_TEMPERATURE,
        EndpointKind::BreathingRate => &BREATHING_RATE,
        EndpointKind::Ecg => &ECG,
        EndpointKind::Sleep => &SLEEP,
        EndpointKind::SleepLevels => &SLEEP_LEVELS,
        EndpointKind::Devices => &DEVICES,
    }
}

/// Shorthand for `processor_for(dataset.endpoint).process(dataset)`.
#[must_use]
pub fn tabulate(dataset: &NormalizedDataset) -> TabularResult {
    processor_for(dataset.endpoint).process(dataset)
}
