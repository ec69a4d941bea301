use std::time::Duration;

use tempo::{AggregateOptions, CancellationToken, EndpointKind, RequestSpec, Tempo};
use tempo_demos::common::{credential, days_ago, get_connector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. An overall deadline keeps whatever finished in time.
    let tempo = Tempo::builder()
        .with_connector(get_connector())
        .request_timeout(Duration::from_secs(20))
        .build()?;

    let spec = RequestSpec::builder(EndpointKind::StepsIntraday, credential())
        .date_from(days_ago(14))
        .date_to(days_ago(1))
        .build()?;

    // 2. A caller-side token can stop the run early as well.
    let token = CancellationToken::new();
    let stopper = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            token.cancel();
        })
    };

    let (report, status) = tempo
        .aggregate_with(&spec, AggregateOptions::new().cancel_on(token))
        .await;
    stopper.abort();

    println!(
        "{status:?}: {} succeeded, {} failed, {} cancelled",
        report.outcome.succeeded, report.outcome.failed, report.outcome.cancelled
    );
    if let Some(total) = report.dataset.summary.get("total_steps") {
        println!("total steps: {total}");
    }

    // 3. Force a fresh fetch; the new report replaces the cached one.
    let (_, status) = tempo
        .aggregate_with(&spec, AggregateOptions::new().force_refresh(true))
        .await;
    println!("second run: {status:?}");

    Ok(())
}
