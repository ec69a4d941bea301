use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use tempo_types::Timestamp;
use tempo_types::timestamp::parse_datetime;

fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, m, d, hh, mm, ss)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(hh, mm, ss)
                .unwrap()
        },
    )
}

proptest! {
    #[test]
    fn every_upstream_format_resolves_to_the_same_instant(dt in arb_datetime(), millis in 0u32..1000) {
        let spaced = dt.format("%Y-%m-%d %H:%M:%S").to_string();
        let iso = format!("{}.{millis:03}", dt.format("%Y-%m-%dT%H:%M:%S"));
        let zulu = format!("{iso}Z");

        prop_assert_eq!(parse_datetime(&spaced), Some(dt));
        let expected = dt + chrono::Duration::milliseconds(i64::from(millis));
        prop_assert_eq!(parse_datetime(&iso), Some(expected));
        prop_assert_eq!(parse_datetime(&zulu), Some(expected));
    }

    #[test]
    fn split_and_instant_forms_agree(dt in arb_datetime()) {
        let split = Timestamp::Split {
            date: dt.format("%Y-%m-%d").to_string(),
            time: dt.format("%H:%M:%S").to_string(),
        };
        let instant = Timestamp::Instant(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        prop_assert_eq!(split.resolve(), instant.resolve());
    }
}
