use std::time::Duration;

use tempo::{EndpointKind, FetchMode};
use tempo_mock::MockBehavior;
use tempo_mock::fixtures::activity::heart_rate_intraday;

use crate::helpers::{d, days, dynamic, heart_rate, values};

#[tokio::test(start_paused = true)]
async fn completion_order_does_not_leak_into_the_merge() {
    let (tempo, ctl) = dynamic(FetchMode::Concurrent { max_in_flight: 3 });
    // Day 1 finishes last, day 3 first.
    for (day, delay_ms, bpm) in [
        ("2024-01-01", 300, 1.0),
        ("2024-01-02", 100, 2.0),
        ("2024-01-03", 0, 3.0),
    ] {
        ctl.set_day_behavior(
            EndpointKind::HeartRateIntraday,
            day,
            MockBehavior::delayed(
                Duration::from_millis(delay_ms),
                heart_rate_intraday(day, &[("10:00:00", bpm)]),
            ),
        )
        .await;
    }

    let report = tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 3))).await;

    assert_eq!(ctl.max_in_flight(), 3);
    assert_eq!(values(&report), [1.0, 2.0, 3.0]);
    assert_eq!(days(&report), ["2024-01-01", "2024-01-02", "2024-01-03"]);
}

#[tokio::test(start_paused = true)]
async fn sequential_mode_issues_one_call_at_a_time_in_day_order() {
    let (tempo, ctl) = dynamic(FetchMode::Sequential);
    ctl.set_endpoint_behavior(
        EndpointKind::StepsIntraday,
        MockBehavior::Delay(
            Duration::from_millis(20),
            Box::new(MockBehavior::Return(
                tempo_mock::fixtures::empty_for(EndpointKind::StepsIntraday),
            )),
        ),
    )
    .await;
    let spec = crate::helpers::spec(EndpointKind::StepsIntraday, d(2024, 2, 27), d(2024, 3, 2));

    let report = tempo.aggregate(&spec).await;

    assert_eq!(report.outcome.planned, 5);
    assert_eq!(ctl.max_in_flight(), 1);
    let planned: Vec<String> = tempo.plan(&spec).into_iter().map(|s| s.path).collect();
    assert_eq!(ctl.requests().await, planned);
    assert!(planned[2].contains("2024-02-29"));
}

#[tokio::test(start_paused = true)]
async fn concurrency_never_exceeds_the_configured_bound() {
    let (tempo, ctl) = dynamic(FetchMode::Concurrent { max_in_flight: 2 });
    ctl.set_endpoint_behavior(
        EndpointKind::HeartRateIntraday,
        MockBehavior::delayed(
            Duration::from_millis(50),
            heart_rate_intraday("2024-01-01", &[("00:00:00", 1.0)]),
        ),
    )
    .await;

    let report = tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 6))).await;

    assert!(report.outcome.is_complete());
    assert_eq!(ctl.calls(), 6);
    assert_eq!(ctl.max_in_flight(), 2);
}

#[tokio::test]
async fn range_endpoints_are_a_single_call() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    let spec = crate::helpers::spec(EndpointKind::Steps, d(2024, 1, 1), d(2024, 1, 31));

    let report = tempo.aggregate(&spec).await;

    assert_eq!(ctl.calls(), 1);
    assert_eq!(
        ctl.requests().await,
        ["1/user/-/activities/steps/date/2024-01-01/2024-01-31.json"]
    );
    assert_eq!(report.dataset.len(), 31);
    assert_eq!(report.dataset.summary.get("total_steps"), Some(&294_500.0));
}
