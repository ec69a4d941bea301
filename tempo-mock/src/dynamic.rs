use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tempo_core::{EndpointKind, RawResponse, SubRequest, TelemetryConnector, TempoError};

use crate::fixtures;

/// Instruction for how a call should behave for a given endpoint and day.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer `200 OK` with this body.
    Return(String),
    /// Answer with an arbitrary status and body.
    Status(u16, String),
    /// Fail without a response (transport error).
    Fail(TempoError),
    /// Hang indefinitely (simulate a stalled connection).
    Hang,
    /// Wait, then behave as the inner instruction.
    Delay(Duration, Box<MockBehavior>),
}

impl MockBehavior {
    /// Shorthand for a delayed `200 OK`.
    pub fn delayed(delay: Duration, body: impl Into<String>) -> Self {
        Self::Delay(delay, Box::new(Self::Return(body.into())))
    }
}

#[derive(Default)]
struct InternalState {
    by_day: HashMap<(EndpointKind, String), MockBehavior>,
    by_endpoint: HashMap<EndpointKind, MockBehavior>,
    requests: Vec<String>,
}

#[derive(Default)]
struct Counters {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Decrements the in-flight gauge when a call finishes or is dropped mid-flight.
struct InFlight<'a>(&'a Counters);

impl<'a> InFlight<'a> {
    fn enter(counters: &'a Counters) -> Self {
        counters.calls.fetch_add(1, Ordering::SeqCst);
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    counters: Arc<Counters>,
}

impl DynamicMockController {
    /// Set the behavior for one endpoint on one day (`YYYY-MM-DD`).
    pub async fn set_day_behavior(
        &self,
        endpoint: EndpointKind,
        day: &str,
        behavior: MockBehavior,
    ) {
        let mut guard = self.state.lock().await;
        guard.by_day.insert((endpoint, day.to_string()), behavior);
    }

    /// Set the behavior for every call to an endpoint without a day-specific rule.
    pub async fn set_endpoint_behavior(&self, endpoint: EndpointKind, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.by_endpoint.insert(endpoint, behavior);
    }

    /// Number of calls received so far, including ones still in flight.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    /// Calls currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Rendered paths in the order calls arrived.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.by_day.clear();
        guard.by_endpoint.clear();
        guard.requests.clear();
    }
}

/// A connector that defers all behavior to an external controller.
///
/// Calls with no matching rule are answered from [`fixtures::for_sub`].
pub struct DynamicMockConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
    counters: Arc<Counters>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn TelemetryConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let counters = Arc::new(Counters::default());
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            counters: Arc::clone(&counters),
        };
        let me = Arc::new(Self {
            name,
            state,
            counters,
        });
        (me as Arc<dyn TelemetryConnector>, controller)
    }

    async fn play(mut behavior: MockBehavior) -> Result<RawResponse, TempoError> {
        loop {
            match behavior {
                MockBehavior::Return(body) => return Ok(RawResponse::ok(body)),
                MockBehavior::Status(status, body) => {
                    return Ok(RawResponse::with_status(status, body));
                }
                MockBehavior::Fail(e) => return Err(e),
                MockBehavior::Hang => return std::future::pending().await,
                MockBehavior::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    behavior = *inner;
                }
            }
        }
    }
}

#[async_trait]
impl TelemetryConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    async fn fetch(&self, sub: &SubRequest) -> Result<RawResponse, TempoError> {
        let _guard = InFlight::enter(&self.counters);
        // Snapshot the rule without holding the lock across the scripted wait.
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(sub.path.clone());
            sub.date
                .as_ref()
                .and_then(|d| guard.by_day.get(&(sub.endpoint, d.clone())))
                .or_else(|| guard.by_endpoint.get(&sub.endpoint))
                .cloned()
        };

        match behavior {
            Some(b) => Self::play(b).await,
            None => Ok(RawResponse::ok(fixtures::for_sub(sub))),
        }
    }
}
