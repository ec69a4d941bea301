use std::sync::Arc;
use std::time::Duration;

use tempo::{
    Availability, Cell, Credential, EndpointKind, FetchMode, RequestSpec, Tempo, TempoError,
};
use tempo_mock::fixtures;
use tempo_mock::{MockBehavior, MockConnector};

use crate::helpers::{d, days, dynamic, heart_rate, init_tracing, now, spec, values};

#[tokio::test]
async fn three_day_heart_rate_with_one_failed_day() {
    init_tracing();
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::HeartRateIntraday,
        "2024-01-02",
        MockBehavior::Status(500, r#"{"errors":[]}"#.into()),
    )
    .await;

    let report = tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 3))).await;

    assert_eq!(report.outcome.planned, 3);
    assert_eq!(report.outcome.succeeded, 2);
    assert_eq!(report.outcome.failed, 1);
    assert_eq!(report.outcome.cancelled, 0);
    assert_eq!(report.availability(), Availability::Partial);

    let failures: Vec<_> = report.sub_request_failures().collect();
    assert_eq!(failures.len(), 1);
    match failures[0] {
        TempoError::SubRequestFailure {
            index,
            date,
            status,
            ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(date, "2024-01-02");
            assert_eq!(*status, Some(500));
        }
        other => panic!("unexpected warning: {other:?}"),
    }

    assert_eq!(days(&report), ["2024-01-01", "2024-01-03"]);
    assert_eq!(values(&report), [61.0, 62.0, 64.0, 61.0, 62.0, 64.0]);
    assert!(report.dataset.sorted);
    let instants: Vec<_> = report
        .dataset
        .records
        .iter()
        .filter_map(|r| r.timestamp().and_then(|t| t.resolve()))
        .collect();
    assert!(instants.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn sleep_night_exposes_deep_minutes() {
    let tempo = Tempo::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .build()
        .unwrap();
    let night = spec(EndpointKind::Sleep, d(2024, 1, 1), d(2024, 1, 1));

    let report = tempo.aggregate(&night).await;
    let session = report.dataset.records[0]
        .as_sleep_session()
        .expect("sleep session");
    assert_eq!(session.stage_minutes("deep"), Some(90));

    let table = tempo.table(&night).await;
    assert_eq!(table.len(), 1);
    assert_eq!(table.cell(0, "deep_minutes"), Some(&Cell::Int(90)));
    assert!(table.warnings.is_empty(), "{:?}", table.warnings);
}

#[tokio::test]
async fn transport_error_becomes_a_sub_request_failure() {
    let (tempo, ctl) = dynamic(FetchMode::Sequential);
    ctl.set_day_behavior(
        EndpointKind::StepsIntraday,
        "2024-03-02",
        MockBehavior::Fail(TempoError::transport("dyn", "connection reset")),
    )
    .await;

    let report = tempo
        .aggregate(&spec(EndpointKind::StepsIntraday, d(2024, 3, 1), d(2024, 3, 2)))
        .await;

    assert_eq!(report.outcome.failed, 1);
    let failure = report.sub_request_failures().next().expect("one failure");
    match failure {
        TempoError::SubRequestFailure { status, msg, .. } => {
            assert_eq!(*status, None);
            assert!(msg.contains("connection reset"));
        }
        other => panic!("unexpected warning: {other:?}"),
    }
    assert_eq!(report.dataset.summary.get("total_steps"), Some(&85.0));
}

#[tokio::test(start_paused = true)]
async fn per_call_timeout_isolates_the_stalled_day() {
    let (connector, ctl) = tempo_mock::DynamicMockConnector::new_with_controller("dyn");
    let tempo = Tempo::builder()
        .with_connector(connector)
        .sub_request_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    ctl.set_day_behavior(EndpointKind::HeartRateIntraday, "2024-01-02", MockBehavior::Hang)
        .await;

    let report = tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 3))).await;

    assert_eq!(report.outcome.succeeded, 2);
    assert_eq!(report.outcome.failed, 1);
    assert!(matches!(
        report.warnings[0],
        TempoError::SubRequestTimeout { index: 1, .. }
    ));
    assert_eq!(ctl.in_flight(), 0);
}

#[tokio::test]
async fn every_day_failing_is_unavailable_not_empty() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_endpoint_behavior(
        EndpointKind::HeartRateIntraday,
        MockBehavior::Status(401, r#"{"errors":[{"errorType":"expired_token"}]}"#.into()),
    )
    .await;

    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 3));
    let report = tempo.aggregate(&spec).await;
    assert_eq!(report.availability(), Availability::Unavailable);
    assert_eq!(report.sub_request_failures().count(), 3);

    let table = tempo.table(&spec).await;
    assert!(table.is_empty());
    assert_eq!(table.column_names().collect::<Vec<_>>(), ["datetime", "value"]);
}

#[tokio::test]
async fn upstream_with_no_records_is_empty() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_endpoint_behavior(
        EndpointKind::HeartRateIntraday,
        MockBehavior::Return(fixtures::empty_for(EndpointKind::HeartRateIntraday)),
    )
    .await;

    let report = tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 2))).await;
    assert_eq!(report.availability(), Availability::Empty);
    assert!(report.outcome.is_complete());
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_normalization_warning() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::HeartRateIntraday,
        "2024-01-01",
        MockBehavior::Return("<html>maintenance</html>".into()),
    )
    .await;

    let report = tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 2))).await;
    assert_eq!(report.outcome.succeeded, 2);
    assert_eq!(days(&report), ["2024-01-02"]);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, TempoError::Normalization(m) if m.contains("2024-01-01")))
    );
}

#[tokio::test]
async fn devices_are_a_single_dateless_call() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    let devices = RequestSpec::builder(EndpointKind::Devices, Credential::bearer("t"))
        .build_at(now())
        .unwrap();

    let table = tempo.table(&devices).await;
    assert_eq!(ctl.calls(), 1);
    assert_eq!(ctl.requests().await, ["1/user/-/devices.json"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(1, "macAddress"), Some(&Cell::Text("N/A".into())));
}
