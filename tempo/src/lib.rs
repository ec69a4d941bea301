//! tempo
//!
//! Time-windowed aggregation over wearable telemetry APIs.
//!
//! Overview
//! - One logical request (endpoint, date range, time-of-day window, options)
//!   becomes one call per calendar day for intraday endpoints, or a single
//!   call for range endpoints.
//! - Calls run sequentially or with bounded concurrency through a single
//!   [`TelemetryConnector`]; each failure is isolated to its day.
//! - Per-endpoint normalizers turn heterogeneous JSON into canonical records,
//!   merged in chronological order regardless of completion order.
//! - Identical requests are fetched at most once per engine.
//! - Current readings for a wearer (latest heart rate, recent steps, battery,
//!   last sleep) are available as thin queries over the same pipeline.
//!
//! Key behaviors and trade-offs
//! - Partial success: failed or timed-out days are reported as warnings and
//!   contribute no records; the rest of the span is returned.
//! - Cancellation and the optional overall deadline keep completed days and
//!   count the rest as cancelled. Such reports are never cached.
//! - "Now" defaults in a request are resolved when the request is built, not
//!   when it runs.
//! - The cache has no expiry. It de-duplicates calls within a run and is not
//!   meant to track upstream changes; use a force refresh for that.
//!
//! Quickstart
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use tempo::{Credential, EndpointKind, RequestSpec, Tempo};
//! use tempo_fitbit::FitbitConnector;
//!
//! let tempo = Tempo::builder()
//!     .with_connector(Arc::new(FitbitConnector::new_default()?))
//!     .build()?;
//!
//! let spec = RequestSpec::builder(EndpointKind::HeartRateIntraday, Credential::bearer(token))
//!     .date_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
//!     .date_to(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
//!     .build()?;
//!
//! let report = tempo.aggregate(&spec).await;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! let table = tempo.table(&spec).await;
//! ```
//!
//! See the `demos` crate for runnable end-to-end demonstrations.
#![warn(missing_docs)]

mod cache;
pub(crate) mod core;
mod executor;
mod pipeline;
mod snapshot;

pub use cache::ResultCache;
pub use core::{Tempo, TempoBuilder};
pub use pipeline::AggregateOptions;

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use tempo_core::{
    ActivitySubtype, AggregationReport, Availability, CacheStatus, Cell, ColumnSpec, ColumnType,
    Credential, DetailLevel, EndpointKind, EngineConfig, FetchMode, FetchOutcome, Fingerprint,
    NormalizedDataset, NormalizedRecord, RawResponse, RequestSpec, RequestSpecBuilder, Sample,
    SampleValue, SleepSession, SleepStage, SubRequest, TabularResult, TelemetryConnector,
    TempoError, Timestamp, processor_for,
};

#[cfg(feature = "dataframe")]
pub use tempo_core::tabular::ToDataFrame;
