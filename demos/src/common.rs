use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use tempo::{Credential, TelemetryConnector};

/// Return a connector for demos.
///
/// # Panics
/// Panics if the HTTP client for the Fitbit connector cannot be initialised.
#[must_use]
pub fn get_connector() -> Arc<dyn TelemetryConnector> {
    if use_mock() {
        println!("--- (Using Mock Connector for CI) ---");
        Arc::new(tempo_mock::MockConnector::new())
    } else {
        Arc::new(tempo_fitbit::FitbitConnector::new_default().expect("http client"))
    }
}

/// Bearer token from `FITBIT_TOKEN`; any placeholder works against the mock.
#[must_use]
pub fn credential() -> Credential {
    Credential::bearer(std::env::var("FITBIT_TOKEN").unwrap_or_else(|_| "demo-token".into()))
}

/// The day `n` days before today.
#[must_use]
pub fn days_ago(n: u64) -> NaiveDate {
    let today = Local::now().date_naive();
    today.checked_sub_days(Days::new(n)).unwrap_or(today)
}

fn use_mock() -> bool {
    std::env::var("TEMPO_DEMOS_USE_MOCK").is_ok() || std::env::var("FITBIT_TOKEN").is_err()
}
