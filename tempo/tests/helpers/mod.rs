// Shared builders so tests can `use crate::helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tempo::{Credential, EndpointKind, FetchMode, RequestSpec, Tempo, TelemetryConnector};
use tempo_mock::{DynamicMockConnector, DynamicMockController};

/// Token used by every test spec.
pub const TOKEN: &str = "test-token";

/// Construct a `NaiveDate` from components for readability in tests.
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("invalid date")
}

/// Fixed "now" so time-of-day defaults do not depend on the wall clock.
pub fn now() -> NaiveDateTime {
    d(2024, 6, 1).and_hms_opt(12, 0, 0).expect("invalid time")
}

/// `kind` over `from..=to`, built against [`now`].
pub fn spec(kind: EndpointKind, from: NaiveDate, to: NaiveDate) -> RequestSpec {
    RequestSpec::builder(kind, Credential::bearer(TOKEN))
        .date_from(from)
        .date_to(to)
        .build_at(now())
        .expect("valid spec")
}

/// Heart-rate intraday over `from..=to`.
pub fn heart_rate(from: NaiveDate, to: NaiveDate) -> RequestSpec {
    spec(EndpointKind::HeartRateIntraday, from, to)
}

/// Engine over `connector` with the given scheduling.
pub fn engine(connector: Arc<dyn TelemetryConnector>, mode: FetchMode) -> Tempo {
    Tempo::builder()
        .with_connector(connector)
        .fetch_mode(mode)
        .build()
        .expect("engine builds")
}

/// Engine over a fresh dynamic mock, plus its controller.
pub fn dynamic(mode: FetchMode) -> (Tempo, DynamicMockController) {
    let (connector, controller) = DynamicMockConnector::new_with_controller("dyn");
    (engine(connector, mode), controller)
}

/// Numeric sample values of a report, in dataset order.
pub fn values(report: &tempo::AggregationReport) -> Vec<f64> {
    report
        .dataset
        .records
        .iter()
        .filter_map(|r| r.as_sample().and_then(|s| s.value.as_f64()))
        .collect()
}

/// Distinct days present in a report's sample timestamps, in dataset order.
pub fn days(report: &tempo::AggregationReport) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for r in &report.dataset.records {
        if let Some(ts) = r.timestamp().and_then(|t| t.resolve()) {
            let day = ts.date().format("%Y-%m-%d").to_string();
            if out.last() != Some(&day) {
                out.push(day);
            }
        }
    }
    out
}

/// Route engine logs to the test writer; filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
