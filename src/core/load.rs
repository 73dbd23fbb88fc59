use crate::domain::model::EnrichedRecord;
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;

/// Inserts a batch. An empty batch never reaches the store.
pub async fn load<D>(store: &D, documents: &[EnrichedRecord]) -> Result<usize>
where
    D: DocumentStore + ?Sized,
{
    if documents.is_empty() {
        tracing::debug!("Nothing to insert into {}", store.target());
        return Ok(0);
    }

    store.insert_many(documents).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mongo::MongoStore;
    use crate::core::transform::transform;
    use crate::domain::model::Record;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn insert_many(&self, documents: &[EnrichedRecord]) -> Result<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(documents.len())
        }

        fn target(&self) -> String {
            "test.counting".to_string()
        }
    }

    #[tokio::test]
    async fn test_empty_batch_skips_store() {
        let store = CountingStore::default();
        assert_eq!(load(&store, &[]).await.unwrap(), 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_never_connects_to_mongo() {
        // 無法連線的位址：若嘗試連線就會失敗
        let store = MongoStore::new("mongodb://127.0.0.1:1", "etl_db", "posts_raw");
        assert_eq!(load(&store, &[]).await.unwrap(), 0);
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn test_batch_is_forwarded() {
        let store = CountingStore::default();
        let records: Vec<Record> = serde_json::from_value(json!([{"id": 1}, {"id": 2}])).unwrap();

        let inserted = load(&store, &transform(&records, "posts")).await.unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
