use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use tempo_core::{
    AggregationReport, CacheStatus, EngineConfig, FetchOutcome, NormalizedDataset, RequestSpec,
    TabularResult, TelemetryConnector, merge, normalize, split, tabulate,
};

use crate::core::Tempo;
use crate::executor::{self, Interruption};

/// Per-call knobs for [`Tempo::aggregate_with`].
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    force_refresh: bool,
    cancel: Option<CancellationToken>,
}

impl AggregateOptions {
    /// Default options: cached lookup, no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the cache lookup; the fresh result still replaces the stored one.
    #[must_use]
    pub const fn force_refresh(mut self, yes: bool) -> Self {
        self.force_refresh = yes;
        self
    }

    /// Abort outstanding sub-requests when `token` is cancelled.
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl Tempo {
    /// Aggregate `spec` into one merged, chronologically ordered report.
    ///
    /// Behavior and trade-offs:
    /// - Identical specs (same fingerprint) are fetched once per engine; later
    ///   and concurrent callers share the first result.
    /// - Failed days contribute no records and appear in `warnings`; the rest
    ///   of the span is still returned. Check
    ///   [`AggregationReport::availability`] to tell an empty span from an
    ///   unreachable upstream.
    pub async fn aggregate(&self, spec: &RequestSpec) -> Arc<AggregationReport> {
        self.aggregate_with(spec, AggregateOptions::default()).await.0
    }

    /// [`aggregate`](Self::aggregate) with explicit options, also reporting how
    /// the cache was involved.
    ///
    /// Behavior and trade-offs:
    /// - Cancelling the token withdraws this call promptly. If other callers
    ///   share the same in-flight aggregation it keeps running for them, and
    ///   this call gets a report with every sub-request counted as cancelled.
    ///   Otherwise the aggregation stops and the sub-requests that completed
    ///   are returned.
    /// - A cancelled or timed-out aggregation is not stored in the cache.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tempo::aggregate",
            skip(self, spec, opts),
            fields(endpoint = %spec.endpoint(), force_refresh = opts.force_refresh),
        )
    )]
    pub async fn aggregate_with(
        &self,
        spec: &RequestSpec,
        opts: AggregateOptions,
    ) -> (Arc<AggregationReport>, CacheStatus) {
        let cancel = opts.cancel.unwrap_or_default();

        if !self.cfg.cache_results {
            let report = Arc::new(self.run(spec.clone(), cancel).await);
            return (report, CacheStatus::Bypassed);
        }

        let fp = spec.fingerprint();
        if opts.force_refresh {
            let report = Arc::new(self.run(spec.clone(), cancel).await);
            self.cache.refresh(fp, Arc::clone(&report)).await;
            return (report, CacheStatus::Refreshed);
        }

        self.cache
            .get_or_fetch(
                fp,
                &cancel,
                |flight| self.run(spec.clone(), flight),
                || withdrawn(spec),
            )
            .await
    }

    /// Aggregate `spec` and flatten the dataset through its endpoint's processor.
    ///
    /// Aggregation warnings come first in the table's `warnings`, followed by
    /// any raised while building rows.
    pub async fn table(&self, spec: &RequestSpec) -> TabularResult {
        let report = self.aggregate(spec).await;
        let mut table = tabulate(&report.dataset);
        let mut warnings = report.warnings.clone();
        warnings.append(&mut table.warnings);
        table.warnings = warnings;
        table
    }

    /// Split, fetch, normalize, and merge without touching the cache.
    ///
    /// The returned future owns everything it needs, so a shared flight can
    /// outlive the caller that started it.
    fn run(
        &self,
        spec: RequestSpec,
        cancel: CancellationToken,
    ) -> BoxFuture<'static, AggregationReport> {
        aggregate_once(Arc::clone(&self.connector), self.cfg.clone(), spec, cancel).boxed()
    }
}

async fn aggregate_once(
    connector: Arc<dyn TelemetryConnector>,
    cfg: EngineConfig,
    spec: RequestSpec,
    cancel: CancellationToken,
) -> AggregationReport {
    let endpoint = spec.endpoint();
    let subs = split(&spec);
    let execution = executor::execute(connector.as_ref(), &subs, &cfg, &cancel).await;

    let mut outcome = FetchOutcome {
        planned: subs.len(),
        ..FetchOutcome::default()
    };
    let mut warnings = Vec::new();
    let mut chunks = Vec::with_capacity(subs.len());

    for (sub, slot) in subs.iter().zip(execution.slots) {
        match slot {
            Some(Ok(resp)) => {
                outcome.succeeded += 1;
                chunks.push(normalize(sub, &resp.body));
            }
            Some(Err(e)) => {
                outcome.failed += 1;
                warnings.push(e);
            }
            None => outcome.cancelled += 1,
        }
    }

    let (dataset, merge_warnings) = merge(endpoint, chunks);
    warnings.extend(merge_warnings);
    if let Some(reason) = execution.interruption {
        warnings.push(reason.into_error(endpoint.as_str(), outcome.cancelled));
    }

    AggregationReport {
        dataset,
        outcome,
        warnings,
    }
}

/// Report for a caller that withdrew from an aggregation others still wait on.
fn withdrawn(spec: &RequestSpec) -> AggregationReport {
    let endpoint = spec.endpoint();
    let planned = split(spec).len();
    AggregationReport {
        dataset: NormalizedDataset::empty(endpoint),
        outcome: FetchOutcome {
            planned,
            cancelled: planned,
            ..FetchOutcome::default()
        },
        warnings: vec![Interruption::Cancelled.into_error(endpoint.as_str(), planned)],
    }
}
