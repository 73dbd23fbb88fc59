use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const INGESTED_AT_FIELD: &str = "ingested_at";
pub const SOURCE_ENDPOINT_FIELD: &str = "source_endpoint";

/// One item returned by an API endpoint. The schema belongs to the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// A record plus provenance. Serializes flat, with the provenance fields
/// taking precedence over same-named keys of the source record.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: Record,
    pub ingested_at: DateTime<Utc>,
    pub source_endpoint: String,
}

impl EnrichedRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    fn is_provenance_key(key: &str) -> bool {
        key == INGESTED_AT_FIELD || key == SOURCE_ENDPOINT_FIELD
    }

    /// Source fields without the keys that enrichment overrides.
    pub fn source_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.record
            .data
            .iter()
            .filter(|(key, _)| !Self::is_provenance_key(key))
    }
}

impl Serialize for EnrichedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.source_fields() {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(INGESTED_AT_FIELD, &self.ingested_at)?;
        map.serialize_entry(SOURCE_ENDPOINT_FIELD, &self.source_endpoint)?;
        map.end()
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub status_code: u16,
    pub url: String,
    pub record_count: usize,
}

impl FetchOutcome {
    pub fn new(records: Vec<Record>, status_code: u16, url: String) -> Self {
        let record_count = records.len();
        Self {
            records,
            status_code,
            url,
            record_count,
        }
    }
}

/// Stage an endpoint was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStage {
    Extracting,
    Transforming,
    Loading,
    Debugging,
}

impl std::fmt::Display for EndpointStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EndpointStage::Extracting => "extracting",
            EndpointStage::Transforming => "transforming",
            EndpointStage::Loading => "loading",
            EndpointStage::Debugging => "debugging",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EndpointOutcome {
    Done {
        fetched: usize,
        inserted: usize,
        debug_file: String,
    },
    Failed {
        stage: EndpointStage,
        error: String,
        /// Non-zero only when the failure came after a successful load.
        inserted: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointReport {
    pub endpoint: String,
    pub outcome: EndpointOutcome,
}

impl EndpointReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, EndpointOutcome::Done { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total_inserted: usize,
    pub endpoints: Vec<EndpointReport>,
    /// Set when a critical failure stopped the run before every endpoint was visited.
    pub aborted: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.endpoints.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.endpoints.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_enriched_record_serializes_flat() {
        let enriched = EnrichedRecord {
            record: record(json!({"id": 1, "title": "hello"})),
            ingested_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            source_endpoint: "posts".to_string(),
        };

        let value = serde_json::to_value(&enriched).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["title"], "hello");
        assert_eq!(value["source_endpoint"], "posts");
        assert_eq!(value["ingested_at"], "2026-01-02T03:04:05Z");
    }

    #[test]
    fn test_provenance_overrides_source_keys() {
        let enriched = EnrichedRecord {
            record: record(json!({"id": 7, "source_endpoint": "upstream"})),
            ingested_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            source_endpoint: "comments".to_string(),
        };

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["source_endpoint"], "comments");
        assert_eq!(enriched.source_fields().count(), 1);
    }

    #[test]
    fn test_run_summary_counts() {
        let summary = RunSummary {
            total_inserted: 3,
            endpoints: vec![
                EndpointReport {
                    endpoint: "posts".to_string(),
                    outcome: EndpointOutcome::Failed {
                        stage: EndpointStage::Extracting,
                        error: "HTTP error 404".to_string(),
                        inserted: 0,
                    },
                },
                EndpointReport {
                    endpoint: "users".to_string(),
                    outcome: EndpointOutcome::Done {
                        fetched: 3,
                        inserted: 3,
                        debug_file: "etl_output/users.json".to_string(),
                    },
                },
            ],
            aborted: false,
        };

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
    }
}
