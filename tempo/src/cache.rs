//! Within-run de-duplication of aggregations by request fingerprint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use moka::future::Cache;
use tokio_util::sync::CancellationToken;

use tempo_core::{AggregationReport, CacheStatus, Fingerprint};

type SharedReport = Shared<BoxFuture<'static, Arc<AggregationReport>>>;

/// An aggregation currently running on behalf of one or more callers.
struct Flight {
    id: u64,
    report: SharedReport,
    /// Owned by the flight; cancelled only once every waiter has left.
    cancel: CancellationToken,
    waiters: usize,
}

#[derive(Default)]
struct Flights {
    next_id: u64,
    by_fp: HashMap<Fingerprint, Flight>,
}

fn lock(flights: &Mutex<Flights>) -> MutexGuard<'_, Flights> {
    flights.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One caller's membership in a flight. Dropping it leaves the flight.
struct Waiter {
    flights: Arc<Mutex<Flights>>,
    fp: Fingerprint,
    id: u64,
    report: SharedReport,
    active: bool,
}

impl Waiter {
    /// Stop waiting on the flight.
    ///
    /// Returns true when nobody else is waiting, in which case the flight has
    /// either finished or is cancelled here, and its report resolves promptly.
    fn leave(&mut self) -> bool {
        if !std::mem::replace(&mut self.active, false) {
            return true;
        }
        let mut flights = lock(&self.flights);
        let last = match flights.by_fp.get_mut(&self.fp) {
            Some(flight) if flight.id == self.id => {
                flight.waiters -= 1;
                flight.waiters == 0
            }
            _ => return true,
        };
        if last && let Some(flight) = flights.by_fp.remove(&self.fp) {
            flight.cancel.cancel();
        }
        last
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.leave();
    }
}

/// Memoizes aggregation reports by [`Fingerprint`].
///
/// Behavior and trade-offs:
/// - Unbounded and without expiry: an entry lives as long as the cache. This
///   avoids repeating identical remote calls within one run; it does not
///   track changes upstream. Use a force refresh or a new engine for that.
/// - At most one aggregation per fingerprint is in flight. Callers arriving
///   while it runs wait for that same result instead of issuing their own.
/// - The flight belongs to no single caller. Each caller's cancellation only
///   withdraws that caller; the flight itself is cancelled when its last
///   waiter leaves, and that waiter receives the sub-requests that completed.
/// - Reports cut short by cancellation or the request deadline are never
///   stored, so the next request computes afresh.
/// - No lock is held while an aggregation runs.
#[derive(Clone)]
pub struct ResultCache {
    done: Cache<Fingerprint, Arc<AggregationReport>>,
    flights: Arc<Mutex<Flights>>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            done: Cache::builder().build(),
            flights: Arc::default(),
        }
    }

    /// Stored report for `fp`, if any.
    pub async fn get(&self, fp: &Fingerprint) -> Option<Arc<AggregationReport>> {
        self.done.get(fp).await
    }

    /// True if a report is stored for `fp`.
    #[must_use]
    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.done.contains_key(fp)
    }

    /// Number of aggregations currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        lock(&self.flights).by_fp.len()
    }

    /// Return the stored report for `fp`, join the flight computing it, or
    /// start one with `start`.
    ///
    /// `start` receives the flight's own cancellation token. The status is
    /// [`CacheStatus::Miss`] for the caller that started the flight and
    /// [`CacheStatus::Hit`] for everyone else. When `cancel` fires while
    /// others still wait on the flight, this caller returns `left_early()`
    /// and the flight keeps running for them.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tempo::cache::get_or_fetch",
            skip(self, fp, cancel, start, left_early),
            fields(fingerprint = %fp),
        )
    )]
    pub(crate) async fn get_or_fetch<S, L>(
        &self,
        fp: Fingerprint,
        cancel: &CancellationToken,
        start: S,
        left_early: L,
    ) -> (Arc<AggregationReport>, CacheStatus)
    where
        S: FnOnce(CancellationToken) -> BoxFuture<'static, AggregationReport>,
        L: FnOnce() -> AggregationReport,
    {
        let mut start = start;
        let (mut waiter, status) = loop {
            if let Some(report) = self.done.get(&fp).await {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "tempo::cache", fingerprint = %fp, "cache hit");
                return (report, CacheStatus::Hit);
            }
            match self.join(&fp, start) {
                Ok(joined) => break joined,
                Err(unused) => start = unused,
            }
        };

        #[cfg(feature = "tracing")]
        if status == CacheStatus::Hit {
            tracing::debug!(target: "tempo::cache", fingerprint = %fp, "joined in-flight aggregation");
        }

        let shared = waiter.report.clone();
        let report = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                if waiter.leave() {
                    waiter.report.clone().await
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(target: "tempo::cache", fingerprint = %fp, "left shared aggregation");
                    Arc::new(left_early())
                }
            }
            report = shared => report,
        };
        (report, status)
    }

    /// Register as a waiter on the flight for `fp`, starting it if needed.
    ///
    /// Hands `start` back when a stored report appeared in the meantime.
    fn join<S>(&self, fp: &Fingerprint, start: S) -> Result<(Waiter, CacheStatus), S>
    where
        S: FnOnce(CancellationToken) -> BoxFuture<'static, AggregationReport>,
    {
        let mut flights = lock(&self.flights);
        if let Some(flight) = flights.by_fp.get_mut(fp) {
            flight.waiters += 1;
            let waiter = self.waiter(fp, flight.id, flight.report.clone());
            return Ok((waiter, CacheStatus::Hit));
        }
        if self.done.contains_key(fp) {
            return Err(start);
        }

        let id = flights.next_id;
        flights.next_id += 1;
        let cancel = CancellationToken::new();
        let run = start(cancel.clone());

        let done = self.done.clone();
        let registry = Arc::clone(&self.flights);
        let key = fp.clone();
        let report = async move {
            let report = Arc::new(run.await);
            if !report.outcome.was_interrupted() {
                done.insert(key.clone(), Arc::clone(&report)).await;
            }
            {
                let mut flights = lock(&registry);
                if flights.by_fp.get(&key).is_some_and(|f| f.id == id) {
                    flights.by_fp.remove(&key);
                }
            }
            report
        }
        .boxed()
        .shared();

        flights.by_fp.insert(
            fp.clone(),
            Flight {
                id,
                report: report.clone(),
                cancel,
                waiters: 1,
            },
        );
        Ok((self.waiter(fp, id, report), CacheStatus::Miss))
    }

    fn waiter(&self, fp: &Fingerprint, id: u64, report: SharedReport) -> Waiter {
        Waiter {
            flights: Arc::clone(&self.flights),
            fp: fp.clone(),
            id,
            report,
            active: true,
        }
    }

    /// Store `report` under `fp`, replacing any previous entry.
    ///
    /// An interrupted report is not stored; the previous entry, if any, stays.
    pub async fn refresh(&self, fp: Fingerprint, report: Arc<AggregationReport>) {
        if !report.outcome.was_interrupted() {
            self.done.insert(fp, report).await;
        }
    }

    /// Drop the entry for `fp`.
    pub async fn invalidate(&self, fp: &Fingerprint) {
        self.done.invalidate(fp).await;
    }

    /// Drop every stored entry. Flights already running are unaffected.
    pub fn clear(&self) {
        self.done.invalidate_all();
    }
}
