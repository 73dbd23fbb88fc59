use crate::domain::model::{EnrichedRecord, FetchOutcome, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where debug files end up. `write_file` returns the full written path.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Destination collection for enriched records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Unordered insert; returns how many documents were acknowledged.
    async fn insert_many(&self, documents: &[EnrichedRecord]) -> Result<usize>;

    /// `db.collection`, for logging.
    fn target(&self) -> String;
}

/// The per-endpoint steps the orchestrator sequences.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, endpoint: &str) -> Result<FetchOutcome>;
    async fn transform(&self, records: &[Record], endpoint: &str) -> Result<Vec<EnrichedRecord>>;
    async fn load(&self, documents: &[EnrichedRecord]) -> Result<usize>;
    async fn write_debug(&self, endpoint: &str, documents: &[EnrichedRecord]) -> Result<String>;
}
