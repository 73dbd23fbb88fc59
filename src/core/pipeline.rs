use crate::adapters::http::HttpClient;
use crate::core::debug_sink::DebugSink;
use crate::core::{extract, load, transform};
use crate::domain::model::{EnrichedRecord, FetchOutcome, Record};
use crate::domain::ports::{DocumentStore, Pipeline, Storage};
use crate::utils::error::Result;
use reqwest::header::HeaderMap;

/// Endpoint pipeline backed by an HTTP API, a document store and a debug sink.
pub struct ApiPipeline<S: Storage, D: DocumentStore> {
    client: HttpClient,
    base_url: String,
    auth_headers: HeaderMap,
    store: D,
    debug_sink: DebugSink<S>,
}

impl<S: Storage, D: DocumentStore> ApiPipeline<S, D> {
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        auth_headers: HeaderMap,
        store: D,
        storage: S,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth_headers,
            store,
            debug_sink: DebugSink::new(storage),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, D: DocumentStore> Pipeline for ApiPipeline<S, D> {
    async fn extract(&self, endpoint: &str) -> Result<FetchOutcome> {
        extract::extract(&self.client, &self.base_url, endpoint, &self.auth_headers).await
    }

    async fn transform(&self, records: &[Record], endpoint: &str) -> Result<Vec<EnrichedRecord>> {
        Ok(transform::transform(records, endpoint))
    }

    async fn load(&self, documents: &[EnrichedRecord]) -> Result<usize> {
        let inserted = load::load(&self.store, documents).await?;
        tracing::info!("Inserted {} docs into {}", inserted, self.store.target());
        Ok(inserted)
    }

    async fn write_debug(&self, endpoint: &str, documents: &[EnrichedRecord]) -> Result<String> {
        self.debug_sink.write_debug(endpoint, documents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::RetryPolicy;
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(format!("memory://{}", path))
        }
    }

    #[derive(Clone, Default)]
    struct MockStore {
        documents: Arc<Mutex<Vec<EnrichedRecord>>>,
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn insert_many(&self, documents: &[EnrichedRecord]) -> Result<usize> {
            self.documents.lock().await.extend_from_slice(documents);
            Ok(documents.len())
        }

        fn target(&self) -> String {
            "test.mock".to_string()
        }
    }

    #[tokio::test]
    async fn test_pipeline_steps_for_one_endpoint() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/posts");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"data": [{"id": 1}, {"id": 2}]}));
            })
            .await;

        let storage = MockStorage::default();
        let store = MockStore::default();
        let pipeline = ApiPipeline::new(
            HttpClient::new(RetryPolicy::no_retries()).unwrap(),
            server.base_url(),
            HeaderMap::new(),
            store.clone(),
            storage.clone(),
        );

        let outcome = pipeline.extract("posts").await.unwrap();
        api_mock.assert_async().await;
        assert_eq!(outcome.record_count, 2);

        let documents = pipeline.transform(&outcome.records, "posts").await.unwrap();
        assert_eq!(pipeline.load(&documents).await.unwrap(), 2);
        assert_eq!(store.documents.lock().await.len(), 2);

        let path = pipeline.write_debug("posts", &documents).await.unwrap();
        assert!(path.starts_with("memory://posts_"));
        assert_eq!(storage.files.lock().await.len(), 1);
    }
}
