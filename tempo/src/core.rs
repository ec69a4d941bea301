use std::sync::Arc;
use std::time::Duration;

use tempo_core::{
    EngineConfig, FetchMode, RequestSpec, SubRequest, TelemetryConnector, TempoError, split,
};

use crate::cache::ResultCache;

/// Aggregation engine: splits requests into per-day calls, runs them through
/// one connector, and merges the normalized results.
pub struct Tempo {
    pub(crate) connector: Arc<dyn TelemetryConnector>,
    pub(crate) cfg: EngineConfig,
    pub(crate) cache: ResultCache,
}

/// Builder for constructing a `Tempo` engine with custom configuration.
pub struct TempoBuilder {
    connector: Option<Arc<dyn TelemetryConnector>>,
    cfg: EngineConfig,
}

impl Default for TempoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoBuilder {
    /// Create a new builder with default settings.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no connector; you must register one via [`with_connector`](Self::with_connector).
    /// - Defaults: up to 4 sub-requests in flight, 30s per call, no overall
    ///   deadline, result caching on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: None,
            cfg: EngineConfig::default(),
        }
    }

    /// Register the connector that performs every call.
    ///
    /// Behavior and trade-offs:
    /// - An engine talks to exactly one upstream; registering again replaces
    ///   the previous connector.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn TelemetryConnector>) -> Self {
        self.connector = Some(c);
        self
    }

    /// Replace the whole configuration at once.
    #[must_use]
    pub fn config(mut self, cfg: EngineConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Choose sequential or bounded-concurrent scheduling of sub-requests.
    ///
    /// Behavior and trade-offs:
    /// - Either way, merged output follows sub-request order, never
    ///   completion order.
    /// - `Concurrent { max_in_flight: 0 }` is treated as 1.
    #[must_use]
    pub const fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.cfg.fetch_mode = mode;
        self
    }

    /// Set the timeout applied to each individual sub-request.
    ///
    /// Behavior and trade-offs:
    /// - A call that exceeds it is recorded as a failed sub-request and
    ///   contributes no records; its siblings are unaffected.
    #[must_use]
    pub const fn sub_request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.sub_request_timeout = timeout;
        self
    }

    /// Set an overall deadline for one aggregation.
    ///
    /// Behavior and trade-offs:
    /// - When it elapses, outstanding sub-requests are dropped and counted as
    ///   cancelled; completed ones are still merged into the report.
    /// - Reports cut short this way are never retained by the result cache.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Enable or disable memoization of reports by request fingerprint.
    #[must_use]
    pub const fn cache_results(mut self, enabled: bool) -> Self {
        self.cfg.cache_results = enabled;
        self
    }

    /// Build the `Tempo` engine.
    ///
    /// # Errors
    /// Returns `InvalidSpecification` if no connector was registered or the
    /// per-call timeout is zero.
    pub fn build(self) -> Result<Tempo, TempoError> {
        let Some(connector) = self.connector else {
            return Err(TempoError::invalid_spec(
                "no connector registered; add one via with_connector(...)",
            ));
        };
        if self.cfg.sub_request_timeout.is_zero() {
            return Err(TempoError::invalid_spec(
                "sub_request_timeout must be greater than zero",
            ));
        }
        Ok(Tempo {
            connector,
            cfg: self.cfg,
            cache: ResultCache::new(),
        })
    }
}

impl Tempo {
    /// Start building a new `Tempo` engine.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use tempo::{FetchMode, Tempo};
    /// use tempo_fitbit::FitbitConnector;
    ///
    /// let tempo = Tempo::builder()
    ///     .with_connector(Arc::new(FitbitConnector::new_default()?))
    ///     .fetch_mode(FetchMode::Concurrent { max_in_flight: 2 })
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> TempoBuilder {
        TempoBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Name of the registered connector.
    #[must_use]
    pub fn connector_name(&self) -> &'static str {
        self.connector.name()
    }

    /// The engine's result cache.
    #[must_use]
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The sub-requests an aggregation of `spec` would issue, without issuing them.
    #[must_use]
    pub fn plan(&self, spec: &RequestSpec) -> Vec<SubRequest> {
        split(spec)
    }
}
