use std::sync::Arc;
use std::time::Duration;

use tempo::{
    AggregateOptions, CacheStatus, Credential, EndpointKind, FetchMode, RequestSpec, Tempo,
};
use tempo_mock::{DynamicMockConnector, MockBehavior, fixtures};

use crate::helpers::{d, dynamic, heart_rate, now, values};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_specs_fetch_once() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_endpoint_behavior(
        EndpointKind::HeartRateIntraday,
        MockBehavior::delayed(
            Duration::from_millis(50),
            fixtures::activity::heart_rate_intraday("2024-01-01", &[("08:00:00", 70.0)]),
        ),
    )
    .await;
    let tempo = Arc::new(tempo);
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 3));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let tempo = Arc::clone(&tempo);
        let spec = spec.clone();
        handles.push(tokio::spawn(async move {
            tempo.aggregate_with(&spec, AggregateOptions::new()).await
        }));
    }
    let mut results = Vec::new();
    for h in handles {
        results.push(h.await.unwrap());
    }

    assert_eq!(ctl.calls(), 3, "one call per day, not per caller");
    let misses = results
        .iter()
        .filter(|(_, s)| *s == CacheStatus::Miss)
        .count();
    assert_eq!(misses, 1);
    let first = &results[0].0;
    assert!(results.iter().all(|(r, _)| Arc::ptr_eq(r, first)));
}

#[tokio::test]
async fn repeated_spec_is_served_from_cache() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 2));

    let (a, s1) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;
    let (b, s2) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;

    assert_eq!((s1, s2), (CacheStatus::Miss, CacheStatus::Hit));
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(ctl.calls(), 2);
    assert!(tempo.cache().contains(&spec.fingerprint()));
}

#[tokio::test]
async fn reports_with_failed_days_are_cached_too() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::HeartRateIntraday,
        "2024-01-02",
        MockBehavior::Status(500, String::new()),
    )
    .await;
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 3));

    let first = tempo.aggregate(&spec).await;
    let second = tempo.aggregate(&spec).await;

    assert_eq!(first.outcome.failed, 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ctl.calls(), 3);
}

#[tokio::test]
async fn force_refresh_refetches_and_replaces_the_entry() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 1));

    let stale = tempo.aggregate(&spec).await;
    ctl.set_endpoint_behavior(
        EndpointKind::HeartRateIntraday,
        MockBehavior::Return(fixtures::activity::heart_rate_intraday(
            "2024-01-01",
            &[("09:00:00", 99.0)],
        )),
    )
    .await;

    let (fresh, status) = tempo
        .aggregate_with(&spec, AggregateOptions::new().force_refresh(true))
        .await;
    assert_eq!(status, CacheStatus::Refreshed);
    assert_eq!(ctl.calls(), 2);
    assert_eq!(values(&stale), [61.0, 62.0, 64.0]);
    assert_eq!(values(&fresh), [99.0]);

    let (again, status) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;
    assert_eq!(status, CacheStatus::Hit);
    assert!(Arc::ptr_eq(&again, &fresh));
}

#[tokio::test]
async fn differing_fields_or_credentials_do_not_share_entries() {
    let (tempo, ctl) = dynamic(FetchMode::default());

    tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 1))).await;
    tempo.aggregate(&heart_rate(d(2024, 1, 1), d(2024, 1, 2))).await;
    assert_eq!(ctl.calls(), 3);

    let other_user = RequestSpec::builder(EndpointKind::HeartRateIntraday, Credential::bearer("b"))
        .on(d(2024, 1, 1))
        .build_at(now())
        .unwrap();
    tempo.aggregate(&other_user).await;
    assert_eq!(ctl.calls(), 4);
}

#[tokio::test]
async fn disabled_cache_is_bypassed() {
    let (connector, ctl) = DynamicMockConnector::new_with_controller("dyn");
    let tempo = Tempo::builder()
        .with_connector(connector)
        .cache_results(false)
        .build()
        .unwrap();
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 1));

    let (_, s1) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;
    let (_, s2) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;

    assert_eq!((s1, s2), (CacheStatus::Bypassed, CacheStatus::Bypassed));
    assert_eq!(ctl.calls(), 2);
    assert!(!tempo.cache().contains(&spec.fingerprint()));
}

#[tokio::test]
async fn invalidated_entry_is_fetched_again() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    let spec = heart_rate(d(2024, 1, 1), d(2024, 1, 1));

    tempo.aggregate(&spec).await;
    tempo.cache().invalidate(&spec.fingerprint()).await;
    let (_, status) = tempo.aggregate_with(&spec, AggregateOptions::new()).await;

    assert_eq!(status, CacheStatus::Miss);
    assert_eq!(ctl.calls(), 2);
}
