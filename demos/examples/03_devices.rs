use tempo::{Cell, EndpointKind, RequestSpec, Tempo};
use tempo_demos::common::{credential, get_connector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tempo = Tempo::builder().with_connector(get_connector()).build()?;

    // Devices take no date range.
    let spec = RequestSpec::builder(EndpointKind::Devices, credential()).build()?;
    let table = tempo.table(&spec).await;

    for i in 0..table.len() {
        let text = |col: &str| match table.cell(i, col) {
            Some(Cell::Text(s)) => s.clone(),
            Some(other) => format!("{other:?}"),
            None => String::new(),
        };
        println!(
            "{} {} battery={} last sync={}",
            text("type"),
            text("versionLabel"),
            text("batteryState"),
            text("lastSyncTime"),
        );
    }

    Ok(())
}
