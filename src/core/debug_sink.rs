use crate::domain::model::EnrichedRecord;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// Writes each endpoint's batch to `<endpoint>_<YYYYmmdd_HHMMSS>.json` for auditing.
pub struct DebugSink<S: Storage> {
    storage: S,
}

impl<S: Storage> DebugSink<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write_debug(&self, endpoint: &str, records: &[EnrichedRecord]) -> Result<String> {
        self.write_debug_at(endpoint, records, Utc::now()).await
    }

    pub async fn write_debug_at(
        &self,
        endpoint: &str,
        records: &[EnrichedRecord],
        written_at: DateTime<Utc>,
    ) -> Result<String> {
        let file_name = debug_file_name(endpoint, written_at);
        let json = serde_json::to_vec_pretty(records)?;
        self.storage.write_file(&file_name, &json).await
    }
}

pub fn debug_file_name(endpoint: &str, written_at: DateTime<Utc>) -> String {
    let stem: String = endpoint
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_{}.json", stem, written_at.format("%Y%m%d_%H%M%S"))
}
