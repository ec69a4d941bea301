use tempo::{EndpointKind, RequestSpec, Tempo};
use tempo_demos::common::{credential, days_ago, get_connector};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,tempo=trace,tempo_core=debug,tempo_fitbit=trace
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    // Create connector (mock when TEMPO_DEMOS_USE_MOCK is set) and build the engine
    let tempo = Tempo::builder().with_connector(get_connector()).build()?;

    // Three days of intraday heart rate: three calls, one merged dataset
    let spec = RequestSpec::builder(EndpointKind::HeartRateIntraday, credential())
        .date_from(days_ago(3))
        .date_to(days_ago(1))
        .build()?;
    let report = tempo.aggregate(&spec).await;
    tracing::info!(records = report.dataset.len(), "aggregated");

    // Same spec again: served from the cache, no new calls
    let _ = tempo.aggregate(&spec).await;

    Ok(())
}
