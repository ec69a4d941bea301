use std::time::Duration;

use tempo::{
    AggregateOptions, Availability, CacheStatus, CancellationToken, EndpointKind, FetchMode, Tempo,
    TempoError,
};
use tempo_mock::fixtures::activity::heart_rate_intraday;
use tempo_mock::{DynamicMockConnector, DynamicMockController, MockBehavior};

use crate::helpers::{d, days, dynamic, heart_rate, values};

#[tokio::test(start_paused = true)]
async fn cancellation_keeps_completed_days() {
    let (tempo, ctl) = dynamic(FetchMode::Sequential);
    ctl.set_day_behavior(EndpointKind::HeartRateIntraday, "2024-01-02", MockBehavior::Hang)
        .await;
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 3));
    let token = CancellationToken::new();

    let ((report, status), ()) = tokio::join!(
        tempo.aggregate_with(&spec, AggregateOptions::new().cancel_on(token.clone())),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        }
    );

    assert_eq!(status, CacheStatus::Miss);
    assert_eq!(report.outcome.succeeded, 1);
    assert_eq!(report.outcome.failed, 0);
    assert_eq!(report.outcome.cancelled, 2);
    assert_eq!(report.availability(), Availability::Partial);
    assert_eq!(days(&report), ["2024-01-01"]);
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        TempoError::Cancelled { pending: 2, .. }
    )));
    // The stalled call was dropped, and day 3 never started.
    assert_eq!(ctl.in_flight(), 0);
    assert_eq!(ctl.calls(), 2);

    // Interrupted reports are not retained.
    assert!(!tempo.cache().contains(&spec.fingerprint()));
    ctl.clear_all_behaviors().await;
    let (full, status) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;
    assert_eq!(status, CacheStatus::Miss);
    assert!(full.outcome.is_complete());
}

#[tokio::test(start_paused = true)]
async fn request_deadline_counts_unfinished_days_as_cancelled() {
    let (connector, ctl) = DynamicMockConnector::new_with_controller("dyn");
    let tempo = Tempo::builder()
        .with_connector(connector)
        .fetch_mode(FetchMode::Concurrent { max_in_flight: 4 })
        .request_timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    ctl.set_day_behavior(EndpointKind::HeartRateIntraday, "2024-01-03", MockBehavior::Hang)
        .await;
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 3));

    let report = tempo.aggregate(&spec).await;

    assert_eq!(report.outcome.succeeded, 2);
    assert_eq!(report.outcome.cancelled, 1);
    assert_eq!(days(&report), ["2024-01-01", "2024-01-02"]);
    assert!(matches!(
        report.warnings.last(),
        Some(TempoError::RequestTimeout { pending: 1, .. })
    ));
    assert!(!tempo.cache().contains(&spec.fingerprint()));

    // A later caller computes afresh instead of seeing the cut-short report.
    let (again, status) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;
    assert_eq!(status, CacheStatus::Miss);
    assert_eq!(again.outcome.cancelled, 1);
    assert_eq!(ctl.calls(), 6);
    assert_eq!(tempo.cache().in_flight(), 0);
}

/// One day of heart rate that takes 20s to arrive.
async fn slow_single_day() -> (Tempo, DynamicMockController, tempo::RequestSpec) {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::HeartRateIntraday,
        "2024-01-01",
        MockBehavior::delayed(
            Duration::from_secs(20),
            heart_rate_intraday("2024-01-01", &[("06:00:00", 61.0)]),
        ),
    )
    .await;
    (tempo, ctl, heart_rate(d(2024, 1, 1), d(2024, 1, 1)))
}

#[tokio::test(start_paused = true)]
async fn joined_caller_withdraws_promptly_on_its_own_cancellation() {
    let (tempo, ctl, spec) = slow_single_day().await;
    let token = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let ((first, first_status), (second, second_status, waited)) = tokio::join!(
        tempo.aggregate_with(&spec, AggregateOptions::new()),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let ((report, status), ()) = tokio::join!(
                tempo.aggregate_with(&spec, AggregateOptions::new().cancel_on(token.clone())),
                async {
                    tokio::time::sleep(Duration::from_millis(90)).await;
                    token.cancel();
                }
            );
            (report, status, started.elapsed())
        }
    );

    assert!(waited < Duration::from_secs(1), "withdrawal took {waited:?}");
    assert_eq!(second_status, CacheStatus::Hit);
    assert_eq!(second.outcome.succeeded, 0);
    assert_eq!(second.outcome.cancelled, 1);
    assert!(second.dataset.is_empty());
    assert!(matches!(
        second.warnings.as_slice(),
        [TempoError::Cancelled { pending: 1, .. }]
    ));

    // The caller that never cancelled still gets the whole span.
    assert_eq!(first_status, CacheStatus::Miss);
    assert!(first.outcome.is_complete());
    assert!(first.warnings.is_empty());
    assert_eq!(values(&first), [61.0]);
    assert_eq!(ctl.calls(), 1);
    assert!(tempo.cache().contains(&spec.fingerprint()));
}

#[tokio::test(start_paused = true)]
async fn starting_caller_cancelling_leaves_shared_fetch_running() {
    let (tempo, ctl, spec) = slow_single_day().await;
    let token = CancellationToken::new();

    let ((first, first_status), (second, second_status), ()) = tokio::join!(
        tempo.aggregate_with(&spec, AggregateOptions::new().cancel_on(token.clone())),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tempo.aggregate_with(&spec, AggregateOptions::new()).await
        },
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        }
    );

    assert_eq!(first_status, CacheStatus::Miss);
    assert_eq!(first.outcome.cancelled, 1);
    assert!(first.dataset.is_empty());

    assert_eq!(second_status, CacheStatus::Hit);
    assert!(second.outcome.is_complete());
    assert!(!second.outcome.was_interrupted());
    assert_eq!(values(&second), [61.0]);
    assert_eq!(ctl.calls(), 1);
    assert!(tempo.cache().contains(&spec.fingerprint()));
}

#[tokio::test(start_paused = true)]
async fn fetch_abandoned_by_every_caller_is_stopped_and_not_stored() {
    let (tempo, ctl, spec) = slow_single_day().await;
    let a = CancellationToken::new();
    let b = CancellationToken::new();

    let ((first, _), (second, _), ()) = tokio::join!(
        tempo.aggregate_with(&spec, AggregateOptions::new().cancel_on(a.clone())),
        tempo.aggregate_with(&spec, AggregateOptions::new().cancel_on(b.clone())),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            a.cancel();
            tokio::time::sleep(Duration::from_millis(50)).await;
            b.cancel();
        }
    );

    assert_eq!(first.outcome.cancelled, 1);
    assert_eq!(second.outcome.cancelled, 1);
    assert_eq!(ctl.in_flight(), 0);
    assert_eq!(tempo.cache().in_flight(), 0);
    assert!(!tempo.cache().contains(&spec.fingerprint()));

    ctl.clear_all_behaviors().await;
    let (fresh, status) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;
    assert_eq!(status, CacheStatus::Miss);
    assert!(fresh.outcome.is_complete());
    assert_eq!(ctl.calls(), 2);
}

#[tokio::test]
async fn already_cancelled_token_returns_an_empty_partial_report() {
    let (tempo, _ctl) = dynamic(FetchMode::default());
    let token = CancellationToken::new();
    token.cancel();

    let (report, _) = tempo
        .aggregate_with(
            &heart_rate(d(2024, 1, 1), d(2024, 1, 3)),
            AggregateOptions::new().cancel_on(token),
        )
        .await;

    assert_eq!(report.outcome.succeeded, 0);
    assert_eq!(report.outcome.cancelled, 3);
    assert_eq!(report.availability(), Availability::Unavailable);
    assert!(report.dataset.is_empty());
}
