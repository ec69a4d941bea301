//! tempo-core
//!
//! Request model, window splitting, normalization, and tabular processing
//! shared by the tempo engine and its connectors.
//!
//! - `request`: the immutable `RequestSpec` and its builder and fingerprint.
//! - `window`: splitting a spec into per-day `SubRequest`s with rendered paths.
//! - `connector`: the `TelemetryConnector` transport trait.
//! - `normalize`: endpoint-specific JSON to canonical records.
//! - `merge`: ordered concatenation of normalized chunks.
//! - `tabular`: the processor registry producing typed rows.
//!
//! Everything here is synchronous and runtime-agnostic except the connector
//! trait, which is `async` via `async-trait`.
#![warn(missing_docs)]

/// The transport seam implemented by HTTP and mock connectors.
pub mod connector;
/// Merging normalized chunks into one dataset.
pub mod merge;
pub mod normalize;
/// Request specifications and their builder.
pub mod request;
pub mod tabular;
pub mod window;

pub use connector::{RawResponse, TelemetryConnector};
pub use merge::merge;
pub use normalize::{Chunk, normalize, normalizer_for};
pub use request::{Credential, ECG_MAX_LIMIT, Fingerprint, RequestSpec, RequestSpecBuilder};
pub use tabular::{Cell, ColumnSpec, ColumnType, Processor, TabularResult, processor_for, tabulate};
pub use window::{Headers, SubRequest, split};

pub use tempo_types::*;
