use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the tempo workspace.
///
/// Only `InvalidSpecification` is fatal to a request. Every other variant is
/// recovered by the engine and surfaced as a warning on the aggregation report.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TempoError {
    /// The request could not be assembled (missing or contradictory fields).
    #[error("invalid specification: {0}")]
    InvalidSpecification(String),

    /// A single sub-request failed; it contributes no records.
    #[error("sub-request #{index} ({endpoint} {date}) failed{}: {msg}", status_suffix(.status))]
    SubRequestFailure {
        /// Position of the sub-request in chronological order.
        index: usize,
        /// Calendar day (or range start) the sub-request covered.
        date: String,
        /// Endpoint label.
        endpoint: String,
        /// HTTP status when the failure was a non-2xx response.
        status: Option<u16>,
        /// Human-readable error message.
        msg: String,
    },

    /// A single sub-request exceeded the configured per-call timeout.
    #[error("sub-request #{index} ({endpoint} {date}) timed out")]
    SubRequestTimeout {
        /// Position of the sub-request in chronological order.
        index: usize,
        /// Calendar day (or range start) the sub-request covered.
        date: String,
        /// Endpoint label.
        endpoint: String,
    },

    /// The caller cancelled the aggregation before every sub-request finished.
    #[error("{endpoint} aggregation cancelled with {pending} sub-request(s) outstanding")]
    Cancelled {
        /// Endpoint label.
        endpoint: String,
        /// Sub-requests that never completed.
        pending: usize,
    },

    /// The overall request deadline elapsed before every sub-request finished.
    #[error("{endpoint} aggregation timed out with {pending} sub-request(s) outstanding")]
    RequestTimeout {
        /// Endpoint label.
        endpoint: String,
        /// Sub-requests that never completed.
        pending: usize,
    },

    /// A payload or field could not be normalized; defaults were used instead.
    #[error("normalization warning: {0}")]
    Normalization(String),

    /// A connector could not complete the HTTP exchange.
    #[error("{connector} transport error: {msg}")]
    Transport {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl TempoError {
    /// Helper: build an `InvalidSpecification` error.
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidSpecification(msg.into())
    }

    /// Helper: build a `Normalization` warning.
    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    /// Helper: build a `Transport` error with the connector name and message.
    pub fn transport(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transport {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SubRequestFailure` for a non-success HTTP status.
    pub fn http_status(
        index: usize,
        date: impl Into<String>,
        endpoint: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::SubRequestFailure {
            index,
            date: date.into(),
            endpoint: endpoint.into(),
            status: Some(status),
            msg: "non-success response".to_string(),
        }
    }

    /// Helper: build a `SubRequestTimeout` error.
    pub fn sub_request_timeout(
        index: usize,
        date: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::SubRequestTimeout {
            index,
            date: date.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Returns true if the error aborts the whole request instead of being
    /// recorded as a warning.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidSpecification(_))
    }

    /// Returns true if the error marks a sub-request that contributed nothing.
    #[must_use]
    pub const fn is_sub_request_failure(&self) -> bool {
        matches!(
            self,
            Self::SubRequestFailure { .. } | Self::SubRequestTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_rendered_only_when_present() {
        let with = TempoError::http_status(1, "2024-01-02", "heart-rate-intraday", 500);
        assert_eq!(
            with.to_string(),
            "sub-request #1 (heart-rate-intraday 2024-01-02) failed with status 500: non-success response"
        );

        let without = TempoError::SubRequestFailure {
            index: 0,
            date: "2024-01-01".into(),
            endpoint: "sleep".into(),
            status: None,
            msg: "connection reset".into(),
        };
        assert_eq!(
            without.to_string(),
            "sub-request #0 (sleep 2024-01-01) failed: connection reset"
        );
    }

    #[test]
    fn only_invalid_specification_is_fatal() {
        assert!(TempoError::invalid_spec("x").is_fatal());
        assert!(!TempoError::normalization("x").is_fatal());
        assert!(!TempoError::transport("fitbit", "x").is_fatal());
        assert!(TempoError::sub_request_timeout(0, "2024-01-01", "steps").is_sub_request_failure());
    }
}
