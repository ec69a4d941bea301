use std::time::Duration;

use tempo_core::TempoError;
use url::Url;

use crate::{DEFAULT_BASE_URL, FitbitConnector};

/// Builder for [`FitbitConnector`].
///
/// Behavior and trade-offs:
/// - A base URL without a trailing slash gets one, so relative paths join
///   underneath it instead of replacing its last segment.
/// - An injected `reqwest::Client` wins over `timeout` and `user_agent`,
///   which only shape the client built here.
#[derive(Debug, Clone)]
pub struct FitbitConnectorBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    client: Option<reqwest::Client>,
}

impl Default for FitbitConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitbitConnectorBuilder {
    /// Builder targeting the production API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: None,
            client: None,
        }
    }

    /// Override the API root (tests point this at a local mock server).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout enforced by the HTTP client.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `User-Agent` header for every request.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Use a preconfigured client.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns `InvalidSpecification` for an unparsable base URL and
    /// `Transport` if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<FitbitConnector, TempoError> {
        let mut raw = self.base_url;
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|e| TempoError::invalid_spec(format!("invalid base url '{raw}': {e}")))?;

        let client = match self.client {
            Some(c) => c,
            None => {
                let mut b = reqwest::Client::builder().user_agent(
                    self.user_agent
                        .unwrap_or_else(|| format!("tempo/{}", env!("CARGO_PKG_VERSION"))),
                );
                if let Some(t) = self.timeout {
                    b = b.timeout(t);
                }
                b.build()
                    .map_err(|e| TempoError::transport(FitbitConnector::NAME, e.to_string()))?
            }
        };

        Ok(FitbitConnector { client, base_url })
    }
}
