//! Runs the sub-requests of one aggregation against a connector.

use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use tempo_core::{EngineConfig, RawResponse, SubRequest, TelemetryConnector, TempoError};

/// Outcome of one sub-request: `None` when it never completed.
pub(crate) type Slot = Option<Result<RawResponse, TempoError>>;

/// Why an execution stopped before every sub-request completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interruption {
    Cancelled,
    Deadline,
}

impl Interruption {
    pub(crate) fn into_error(self, endpoint: impl Into<String>, pending: usize) -> TempoError {
        let endpoint = endpoint.into();
        match self {
            Self::Cancelled => TempoError::Cancelled { endpoint, pending },
            Self::Deadline => TempoError::RequestTimeout { endpoint, pending },
        }
    }
}

pub(crate) struct Execution {
    /// One slot per sub-request, indexed like the input.
    pub(crate) slots: Vec<Slot>,
    pub(crate) interruption: Option<Interruption>,
}

/// Issue every sub-request with at most `cfg.fetch_mode.permits()` in flight.
///
/// Sub-requests are started in index order. Results land in their index slot
/// so completion order never leaks into the merge. Cancellation and the
/// overall deadline drop the in-flight calls and leave their slots empty.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "tempo::executor::execute",
        skip(connector, subs, cfg, cancel),
        fields(connector = connector.name(), planned = subs.len(), permits = cfg.fetch_mode.permits()),
    )
)]
pub(crate) async fn execute(
    connector: &dyn TelemetryConnector,
    subs: &[SubRequest],
    cfg: &EngineConfig,
    cancel: &CancellationToken,
) -> Execution {
    let mut slots: Vec<Slot> = (0..subs.len()).map(|_| None).collect();
    let deadline = cfg.request_timeout.map(|d| Instant::now() + d);
    let permits = cfg.fetch_mode.permits();

    let mut queued = subs.iter().enumerate();
    let mut in_flight = FuturesUnordered::new();

    let interruption = loop {
        while in_flight.len() < permits {
            let Some((slot, sub)) = queued.next() else {
                break;
            };
            in_flight.push(fetch_one(connector, slot, sub, cfg.sub_request_timeout));
        }
        if in_flight.is_empty() {
            break None;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => break Some(Interruption::Cancelled),
            () = deadline_elapsed(deadline) => break Some(Interruption::Deadline),
            Some((slot, result)) = in_flight.next() => {
                slots[slot] = Some(result);
            }
        }
    };

    #[cfg(feature = "tracing")]
    if let Some(reason) = interruption {
        tracing::warn!(
            target: "tempo::executor",
            reason = ?reason,
            pending = slots.iter().filter(|s| s.is_none()).count(),
            "aggregation interrupted"
        );
    }

    Execution {
        slots,
        interruption,
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Perform one call under the per-call timeout and classify its outcome.
async fn fetch_one(
    connector: &dyn TelemetryConnector,
    slot: usize,
    sub: &SubRequest,
    timeout: Duration,
) -> (usize, Result<RawResponse, TempoError>) {
    let date = sub.label();
    let endpoint = sub.endpoint.as_str();
    let result = match tokio::time::timeout(timeout, connector.fetch(sub)).await {
        Ok(Ok(resp)) if resp.is_success() => Ok(resp),
        Ok(Ok(resp)) => Err(TempoError::http_status(
            sub.index,
            date,
            endpoint,
            resp.status,
        )),
        Ok(Err(e)) => Err(TempoError::SubRequestFailure {
            index: sub.index,
            date: date.to_string(),
            endpoint: endpoint.to_string(),
            status: None,
            msg: e.to_string(),
        }),
        Err(_) => Err(TempoError::sub_request_timeout(sub.index, date, endpoint)),
    };

    #[cfg(feature = "tracing")]
    if let Err(e) = &result {
        tracing::warn!(
            target: "tempo::executor",
            index = sub.index,
            date = date,
            endpoint = endpoint,
            error = %e,
            "sub-request failed"
        );
    }

    (slot, result)
}
