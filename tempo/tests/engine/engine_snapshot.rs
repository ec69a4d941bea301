use chrono::NaiveDateTime;
use tempo::{Credential, EndpointKind, FetchMode, TempoError};
use tempo_mock::MockBehavior;
use tempo_mock::fixtures::activity::{heart_rate_intraday, intraday};
use tempo_mock::fixtures::sleep::sleep_logs;

use crate::helpers::{TOKEN, d, dynamic, now};

fn credential() -> Credential {
    Credential::bearer(TOKEN)
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    d(2024, 6, 1).and_hms_opt(h, m, 30).expect("valid time")
}

#[tokio::test]
async fn heart_rate_is_the_last_sample_of_the_past_hour() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::HeartRateIntraday,
        "2024-06-01",
        MockBehavior::Return(heart_rate_intraday(
            "2024-06-01",
            &[("11:10:00", 70.0), ("11:50:00", 74.0)],
        )),
    )
    .await;

    let bpm = tempo.current_heart_rate(credential(), now()).await.unwrap();

    assert_eq!(bpm, Some(74.0));
    assert_eq!(
        ctl.requests().await,
        ["1/user/-/activities/heart/date/2024-06-01/1d/1sec/time/11:00/12:00.json"]
    );
}

#[tokio::test]
async fn lookback_stops_at_midnight() {
    let (tempo, ctl) = dynamic(FetchMode::default());

    tempo.current_heart_rate(credential(), at(0, 20)).await.unwrap();
    tempo.current_steps(credential(), at(3, 5)).await.unwrap();

    assert_eq!(
        ctl.requests().await,
        [
            "1/user/-/activities/heart/date/2024-06-01/1d/1sec/time/00:00/00:20.json",
            "1/user/-/activities/steps/date/2024-06-01/1d/1min/time/00:00/03:05.json",
        ]
    );
}

#[tokio::test]
async fn steps_skip_idle_minutes_at_the_end() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::StepsIntraday,
        "2024-06-01",
        MockBehavior::Return(intraday(
            "steps",
            "2024-06-01",
            &[
                ("09:00:00", 12.0),
                ("09:01:00", 48.0),
                ("09:02:00", 0.0),
                ("09:03:00", 0.0),
            ],
        )),
    )
    .await;

    let steps = tempo.current_steps(credential(), now()).await.unwrap();

    assert_eq!(steps, Some(48.0));
    assert_eq!(
        ctl.requests().await,
        ["1/user/-/activities/steps/date/2024-06-01/1d/1min/time/06:00/12:00.json"]
    );
}

#[tokio::test]
async fn quiet_watch_reads_as_none_but_refused_call_is_an_error() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_day_behavior(
        EndpointKind::HeartRateIntraday,
        "2024-06-01",
        MockBehavior::Return(heart_rate_intraday("2024-06-01", &[])),
    )
    .await;
    ctl.set_endpoint_behavior(
        EndpointKind::StepsIntraday,
        MockBehavior::Status(401, r#"{"errors":[{"errorType":"expired_token"}]}"#.into()),
    )
    .await;

    assert_eq!(tempo.current_heart_rate(credential(), now()).await.unwrap(), None);
    let err = tempo.current_steps(credential(), now()).await.unwrap_err();
    assert!(matches!(
        err,
        TempoError::SubRequestFailure {
            status: Some(401),
            ..
        }
    ));
}

#[tokio::test]
async fn battery_comes_from_the_first_device_and_is_never_stale() {
    let (tempo, ctl) = dynamic(FetchMode::default());

    assert_eq!(tempo.battery_level(credential()).await.unwrap(), Some(87));
    assert_eq!(tempo.battery_level(credential()).await.unwrap(), Some(87));
    assert_eq!(ctl.calls(), 2);
}

#[tokio::test]
async fn last_sleep_picks_the_latest_log_and_measures_it_in_hours() {
    let (tempo, ctl) = dynamic(FetchMode::default());
    ctl.set_endpoint_behavior(
        EndpointKind::Sleep,
        MockBehavior::Return(sleep_logs(&[
            (
                "2024-06-01",
                "2024-05-31T23:30:00.000Z",
                "2024-06-01T07:00:00.000Z",
            ),
            (
                "2024-05-31",
                "2024-05-30T22:00:00.000",
                "2024-05-31T06:00:00.000",
            ),
        ])),
    )
    .await;

    let sleep = tempo
        .last_sleep(credential(), now())
        .await
        .unwrap()
        .expect("a sleep log");

    assert_eq!(sleep.date_of_sleep, "2024-06-01");
    assert_eq!(sleep.hours(), Some(7.5));
    assert_eq!(
        ctl.requests().await,
        ["1.2/user/-/sleep/date/2024-05-31/2024-06-01.json"]
    );
}
