use crate::domain::model::{EnrichedRecord, INGESTED_AT_FIELD, SOURCE_ENDPOINT_FIELD};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection};
use tokio::sync::OnceCell;

/// MongoDB collection target. The client is created on first insert and reused.
pub struct MongoStore {
    uri: String,
    db_name: String,
    collection_name: String,
    collection: OnceCell<Collection<Document>>,
}

impl MongoStore {
    pub fn new(uri: &str, db_name: &str, collection_name: &str) -> Self {
        Self {
            uri: uri.to_string(),
            db_name: db_name.to_string(),
            collection_name: collection_name.to_string(),
            collection: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.collection.initialized()
    }

    async fn collection(&self) -> Result<&Collection<Document>> {
        self.collection
            .get_or_try_init(|| async {
                tracing::debug!("Connecting to MongoDB for {}", self.target());
                let client = Client::with_uri_str(&self.uri)
                    .await
                    .map_err(classify_error)?;
                Ok(client
                    .database(&self.db_name)
                    .collection::<Document>(&self.collection_name))
            })
            .await
    }
}

/// `ingested_at` becomes a BSON date so it can be queried by range.
pub fn to_document(record: &EnrichedRecord) -> Result<Document> {
    let mut document = Document::new();
    for (key, value) in record.source_fields() {
        document.insert(key.clone(), bson::to_bson(value)?);
    }
    document.insert(
        INGESTED_AT_FIELD,
        Bson::DateTime(bson::DateTime::from_millis(
            record.ingested_at.timestamp_millis(),
        )),
    );
    document.insert(SOURCE_ENDPOINT_FIELD, record.source_endpoint.clone());
    Ok(document)
}

/// Errors that mean the server cannot be used at all, as opposed to a rejected write.
fn classify_error(error: mongodb::error::Error) -> EtlError {
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::Authentication { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::InvalidArgument { .. } => EtlError::DatabaseUnavailable {
            message: error.to_string(),
        },
        _ => EtlError::DatabaseError(error),
    }
}

/// How many write errors an unordered bulk insert reported, if it was one.
fn rejected_count(error: &mongodb::error::Error) -> Option<usize> {
    match error.kind.as_ref() {
        ErrorKind::InsertMany(failure) => failure.write_errors.as_ref().map(|errors| errors.len()),
        _ => None,
    }
}

/// Documents still written when `rejected` of `total` failed. `None` when
/// nothing got through or the failure was not per-document.
fn accepted_count(total: usize, rejected: Option<usize>) -> Option<usize> {
    match rejected {
        Some(rejected) if rejected < total => Some(total - rejected),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_many(&self, documents: &[EnrichedRecord]) -> Result<usize> {
        let batch = documents
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>>>()?;
        let total = batch.len();

        let collection = self.collection().await?;

        match collection.insert_many(batch).ordered(false).await {
            Ok(result) => Ok(result.inserted_ids.len()),
            Err(error) => {
                // 無序寫入：部分文件失敗不影響其他文件
                match accepted_count(total, rejected_count(&error)) {
                    Some(accepted) => {
                        tracing::warn!(
                            "{} of {} documents rejected by {}: {}",
                            total - accepted,
                            total,
                            self.target(),
                            error
                        );
                        Ok(accepted)
                    }
                    None => Err(classify_error(error)),
                }
            }
        }
    }

    fn target(&self) -> String {
        format!("{}.{}", self.db_name, self.collection_name)
    }
}
