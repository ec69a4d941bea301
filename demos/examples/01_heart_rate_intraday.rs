use tempo::{DetailLevel, EndpointKind, FetchMode, RequestSpec, Tempo};
use tempo_demos::common::{credential, days_ago, get_connector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the engine with two calls in flight at most.
    let tempo = Tempo::builder()
        .with_connector(get_connector())
        .fetch_mode(FetchMode::Concurrent { max_in_flight: 2 })
        .build()?;

    // 2. A week of per-minute heart rate; the API allows one day per call.
    let spec = RequestSpec::builder(EndpointKind::HeartRateIntraday, credential())
        .date_from(days_ago(7))
        .date_to(days_ago(1))
        .detail_level(DetailLevel::OneMinute)
        .build()?;
    println!("Planned calls:");
    for sub in tempo.plan(&spec) {
        println!("  #{} {}", sub.index, sub.path);
    }

    // 3. Aggregate and report what came back.
    let report = tempo.aggregate(&spec).await;
    println!(
        "{:?}: {} of {} calls succeeded, {} samples",
        report.availability(),
        report.outcome.succeeded,
        report.outcome.planned,
        report.dataset.len()
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }

    // 4. Flatten to typed rows.
    let table = tempo.table(&spec).await;
    let columns: Vec<_> = table.column_names().collect();
    println!("{}", columns.join(" | "));
    for row in table.rows.iter().take(5) {
        println!("{row:?}");
    }

    Ok(())
}
