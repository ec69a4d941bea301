//! Mock connectors for CI-safe tests and demos.
//!
//! - [`MockConnector`] serves deterministic fixtures for every endpoint, with
//!   two magic dates that fail or stall.
//! - [`DynamicMockConnector`] defers to a controller that scripts behavior
//!   per endpoint and day and records every call.

use std::time::Duration;

use async_trait::async_trait;
use tempo_core::{RawResponse, SubRequest, TelemetryConnector, TempoError};

mod dynamic;
pub mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};

/// Sub-requests for this day answer with HTTP 500.
pub const FAIL_DATE: &str = "2000-01-01";
/// Sub-requests for this day answer after [`SLOW_DELAY`].
pub const SLOW_DATE: &str = "2000-01-02";
/// Latency applied to [`SLOW_DATE`].
pub const SLOW_DELAY: Duration = Duration::from_millis(200);

/// Mock connector for CI-safe examples. Provides deterministic data from static fixtures.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Create the fixture-backed connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TelemetryConnector for MockConnector {
    fn name(&self) -> &'static str {
        "tempo-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    async fn fetch(&self, sub: &SubRequest) -> Result<RawResponse, TempoError> {
        match sub.date.as_deref() {
            Some(FAIL_DATE) => Ok(RawResponse::with_status(
                500,
                r#"{"errors":[{"errorType":"system","message":"forced failure"}]}"#,
            )),
            Some(SLOW_DATE) => {
                tokio::time::sleep(SLOW_DELAY).await;
                Ok(RawResponse::ok(fixtures::for_sub(sub)))
            }
            _ => Ok(RawResponse::ok(fixtures::for_sub(sub))),
        }
    }
}
