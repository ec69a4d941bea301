//! Combine normalized chunks into one chronologically ordered dataset.

use chrono::NaiveDateTime;

use crate::normalize::Chunk;
use crate::{EndpointKind, NormalizedDataset, NormalizedRecord, TempoError};

/// Merge chunks in the order given (the sub-request order).
///
/// Behavior and trade-offs:
/// - Records are concatenated, then stably sorted by resolved timestamp, so
///   equal instants keep sub-request order.
/// - Summary fields with the same name are added together.
/// - If any timestamp fails every known format, sorting is skipped for the
///   whole dataset, `sorted` is false, and a warning names the first
///   offending value. Partially sorted output is never produced.
/// - Records without a time key (devices) keep their upstream order.
/// - Warnings carried by the chunks are returned in chunk order, followed by
///   any warning raised here.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "tempo::core::merge",
        skip(endpoint, chunks),
        fields(endpoint = %endpoint),
    )
)]
pub fn merge(
    endpoint: EndpointKind,
    chunks: impl IntoIterator<Item = Chunk>,
) -> (NormalizedDataset, Vec<TempoError>) {
    let mut dataset = NormalizedDataset::empty(endpoint);
    let mut warnings = Vec::new();

    for chunk in chunks {
        dataset.records.extend(chunk.records);
        for (key, value) in chunk.summary {
            *dataset.summary.entry(key).or_insert(0.0) += value;
        }
        warnings.extend(chunk.warnings);
    }

    if let Err(bad) = sort_chronologically(&mut dataset.records) {
        dataset.sorted = false;
        let warning = TempoError::normalization(format!(
            "{endpoint}: unparsable timestamp '{bad}', records left in fetch order"
        ));
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "tempo::merge", warning = %warning, "skipping sort");
        warnings.push(warning);
    }

    (dataset, warnings)
}

/// Stable sort by resolved timestamp. On failure returns the first raw value
/// that did not resolve and leaves `records` untouched.
fn sort_chronologically(records: &mut Vec<NormalizedRecord>) -> Result<(), String> {
    let mut keys: Vec<NaiveDateTime> = Vec::with_capacity(records.len());
    for record in records.iter() {
        let Some(ts) = record.timestamp() else {
            return Ok(());
        };
        keys.push(ts.resolve().ok_or_else(|| ts.render())?);
    }

    let mut keyed: Vec<(NaiveDateTime, NormalizedRecord)> =
        keys.into_iter().zip(records.drain(..)).collect();
    keyed.sort_by_key(|(k, _)| *k);
    records.extend(keyed.into_iter().map(|(_, r)| r));
    Ok(())
}
