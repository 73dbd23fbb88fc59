use crate::domain::model::{EnrichedRecord, Record};
use chrono::{DateTime, Utc};

/// Enriches a batch with provenance. All records share one `ingested_at`.
pub fn transform(records: &[Record], endpoint: &str) -> Vec<EnrichedRecord> {
    transform_at(records, endpoint, Utc::now())
}

pub fn transform_at(
    records: &[Record],
    endpoint: &str,
    ingested_at: DateTime<Utc>,
) -> Vec<EnrichedRecord> {
    records
        .iter()
        .map(|record| EnrichedRecord {
            record: record.clone(),
            ingested_at,
            source_endpoint: endpoint.to_string(),
        })
        .collect()
}
