use std::sync::Arc;
use std::time::Duration;

use tempo::{FetchMode, Tempo, TempoError};
use tempo_mock::MockConnector;

#[test]
fn build_without_connector_is_rejected() {
    let err = Tempo::builder().build().err().expect("must fail");
    assert!(matches!(err, TempoError::InvalidSpecification(_)));
    assert!(err.to_string().contains("with_connector"));
}

#[test]
fn zero_sub_request_timeout_is_rejected() {
    let err = Tempo::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .sub_request_timeout(Duration::ZERO)
        .build()
        .err()
        .expect("must fail");
    assert!(err.is_fatal());
}

#[test]
fn modifiers_land_in_the_config() {
    let tempo = Tempo::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .fetch_mode(FetchMode::Sequential)
        .sub_request_timeout(Duration::from_secs(5))
        .request_timeout(Duration::from_secs(60))
        .cache_results(false)
        .build()
        .unwrap();

    let cfg = tempo.config();
    assert_eq!(cfg.fetch_mode, FetchMode::Sequential);
    assert_eq!(cfg.sub_request_timeout, Duration::from_secs(5));
    assert_eq!(cfg.request_timeout, Some(Duration::from_secs(60)));
    assert!(!cfg.cache_results);
    assert_eq!(tempo.connector_name(), "tempo-mock");
}

#[test]
fn defaults_are_bounded_concurrent_and_cached() {
    let tempo = Tempo::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .build()
        .unwrap();
    assert_eq!(tempo.config().fetch_mode.permits(), 4);
    assert!(tempo.config().cache_results);
    assert_eq!(tempo.config().request_timeout, None);
}

#[test]
fn plan_exposes_the_split_without_fetching() {
    use crate::helpers::{d, heart_rate};

    let tempo = Tempo::builder()
        .with_connector(Arc::new(MockConnector::new()))
        .build()
        .unwrap();
    let plan = tempo.plan(&heart_rate(d(2024, 1, 1), d(2024, 1, 3)));
    let dates: Vec<_> = plan.iter().map(|s| s.label().to_string()).collect();
    assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
    assert!(plan[1].path.contains("/date/2024-01-02/1d/1sec/time/00:00/12:00.json"));
}
