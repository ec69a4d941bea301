//! Configuration types shared by the engine and connectors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the sub-requests of one aggregation are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FetchMode {
    /// Issue sub-requests one after another in chronological order.
    Sequential,
    /// Keep up to `max_in_flight` sub-requests outstanding at once.
    Concurrent {
        /// Upper bound on simultaneously outstanding sub-requests (at least 1).
        max_in_flight: usize,
    },
}

impl FetchMode {
    /// Effective number of sub-requests allowed in flight.
    #[must_use]
    pub const fn permits(self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Concurrent { max_in_flight } => {
                if max_in_flight == 0 {
                    1
                } else {
                    max_in_flight
                }
            }
        }
    }
}

impl Default for FetchMode {
    fn default() -> Self {
        Self::Concurrent { max_in_flight: 4 }
    }
}

/// Global configuration for the `Tempo` engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scheduling of sub-requests within one aggregation.
    pub fetch_mode: FetchMode,
    /// Timeout applied to each individual sub-request.
    pub sub_request_timeout: Duration,
    /// Optional overall deadline for one aggregation. When it elapses the
    /// outstanding sub-requests are abandoned and completed ones are kept.
    pub request_timeout: Option<Duration>,
    /// Memoize aggregation reports by request fingerprint.
    pub cache_results: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_mode: FetchMode::default(),
            sub_request_timeout: Duration::from_secs(30),
            request_timeout: None,
            cache_results: true,
        }
    }
}
