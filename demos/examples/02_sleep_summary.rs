use tempo::{EndpointKind, RequestSpec, Tempo};
use tempo_demos::common::{credential, days_ago, get_connector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tempo = Tempo::builder().with_connector(get_connector()).build()?;

    // Sleep logs are fetched as one ranged call.
    let spec = RequestSpec::builder(EndpointKind::Sleep, credential())
        .date_from(days_ago(7))
        .date_to(days_ago(0))
        .build()?;
    let report = tempo.aggregate(&spec).await;

    for record in &report.dataset.records {
        if let Some(night) = record.as_sleep_session() {
            println!(
                "{}: {:.0} min in bed, deep {:?} min, rem {:?} min",
                night.date_of_sleep,
                night.duration_minutes,
                night.stage_minutes("deep"),
                night.stage_minutes("rem"),
            );
        }
    }
    for (name, total) in &report.dataset.summary {
        println!("summary {name} = {total}");
    }

    Ok(())
}
