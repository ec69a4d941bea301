#![cfg(feature = "dataframe")]

use std::sync::Arc;

use chrono::NaiveDate;
use tempo::{Credential, EndpointKind, RequestSpec, Tempo, ToDataFrame};

#[tokio::test]
async fn sleep_table_to_dataframe_smoke() {
    let connector = Arc::new(tempo_mock::MockConnector::new());
    let tempo = Tempo::builder().with_connector(connector).build().unwrap();

    let night = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let spec = RequestSpec::builder(EndpointKind::Sleep, Credential::bearer("t"))
        .on(night)
        .build()
        .unwrap();
    let df = tempo.table(&spec).await.to_dataframe().unwrap();

    assert_eq!(df.height(), 1);
    let deep = df.column("deep_minutes").unwrap().i64().unwrap();
    assert_eq!(deep.get(0), Some(90));
}
