use async_trait::async_trait;

use crate::TempoError;
use crate::window::SubRequest;

/// Unparsed payload and HTTP status returned for one sub-request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, untouched.
    pub body: String,
}

impl RawResponse {
    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A response with an arbitrary status.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses. Nothing else is treated as an error signal.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport that performs the HTTP GET for a rendered sub-request.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; the engine decides what a non-2xx means. `Err` is reserved for
/// failures where no response was received (DNS, TLS, connection reset).
#[async_trait]
pub trait TelemetryConnector: Send + Sync {
    /// Stable connector name for logs and warnings.
    fn name(&self) -> &'static str;

    /// Human-readable vendor/source label.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Perform the call described by `sub` (path and headers already rendered).
    async fn fetch(&self, sub: &SubRequest) -> Result<RawResponse, TempoError>;
}
