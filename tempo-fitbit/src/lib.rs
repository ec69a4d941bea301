//! tempo-fitbit
//!
//! Connector that implements `TelemetryConnector` over the Fitbit Web API
//! with `reqwest`. The connector is a thin transport: it joins the rendered
//! sub-request path to its base URL, sends the prepared headers, and hands
//! back status and body untouched. Interpreting the status is the engine's
//! job.
#![warn(missing_docs)]

/// Builder for configuring base URL, timeouts, and the HTTP client.
pub mod builder;

use async_trait::async_trait;
use tempo_core::{RawResponse, SubRequest, TelemetryConnector, TempoError};
use url::Url;

pub use builder::FitbitConnectorBuilder;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.fitbit.com/";

/// Public connector type. Construct with [`FitbitConnector::builder`].
#[derive(Debug, Clone)]
pub struct FitbitConnector {
    client: reqwest::Client,
    base_url: Url,
}

impl FitbitConnector {
    /// Stable connector name used in logs and transport errors.
    pub const NAME: &'static str = "tempo-fitbit";

    /// Returns a builder targeting the production API.
    #[must_use]
    pub fn builder() -> FitbitConnectorBuilder {
        FitbitConnectorBuilder::new()
    }

    /// Connector with default settings.
    ///
    /// # Errors
    /// Returns `Transport` if the HTTP client cannot be initialised.
    pub fn new_default() -> Result<Self, TempoError> {
        Self::builder().build()
    }

    /// Base URL every sub-request path is joined to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn transport(msg: impl Into<String>) -> TempoError {
        TempoError::transport(Self::NAME, msg)
    }

    /// Absolute URL for a sub-request.
    ///
    /// # Errors
    /// Returns `Transport` if the path is not a valid relative reference.
    pub fn url_for(&self, sub: &SubRequest) -> Result<Url, TempoError> {
        self.base_url
            .join(&sub.path)
            .map_err(|e| Self::transport(format!("invalid path '{}': {e}", sub.path)))
    }
}

#[async_trait]
impl TelemetryConnector for FitbitConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Fitbit"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tempo::fitbit::fetch",
            skip(self, sub),
            fields(endpoint = %sub.endpoint, date = sub.label(), index = sub.index),
        )
    )]
    async fn fetch(&self, sub: &SubRequest) -> Result<RawResponse, TempoError> {
        let url = self.url_for(sub)?;
        let mut req = self.client.get(url);
        for (name, value) in sub.headers.iter() {
            req = req.header(name, value);
        }

        let resp = req.send().await.map_err(|e| Self::transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Self::transport(format!("reading body: {e}")))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status, bytes = body.len(), "response received");

        Ok(RawResponse { status, body })
    }
}
