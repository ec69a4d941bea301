//! Tempo-specific data transfer objects and configuration primitives.
//!
//! - `endpoint`: the closed set of telemetry endpoints and their per-kind tables.
//! - `records`: canonical records and the merged `NormalizedDataset`.
//! - `timestamp`: raw timestamps and the parsing fallback chain.
//! - `reports`: the `AggregationReport` envelope returned by the engine.
#![warn(missing_docs)]

mod config;
mod endpoint;
mod error;
mod records;
mod reports;
pub mod timestamp;

pub use config::{EngineConfig, FetchMode};
pub use endpoint::{ActivitySubtype, DetailLevel, EndpointKind, WindowPolicy};
pub use error::TempoError;
pub use records::{
    DeviceSnapshot, NOT_AVAILABLE, NormalizedDataset, NormalizedRecord, Sample, SampleValue,
    SleepSession, SleepStage,
};
pub use reports::{AggregationReport, Availability, CacheStatus, FetchOutcome};
pub use timestamp::Timestamp;
