pub mod auth;
pub mod logging;

pub use auth::build_auth_headers;
pub use logging::{LogConfig, LogFormat};

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use reqwest::header::HeaderMap;
use std::path::PathBuf;
use url::{Host, Url};

pub const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_API_ENDPOINTS: &str = "posts,comments,users";
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";
pub const DEFAULT_AUTH_PREFIX: &str = "Bearer";
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGO_DB: &str = "etl_db";
pub const DEFAULT_OUTPUT_DIR: &str = "etl_output";
pub const FALLBACK_CONNECTOR_NAME: &str = "connector";

/// Settings for one run. Built once at start-up and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub api_base_url: String,
    pub api_endpoints: Vec<String>,
    pub api_key: String,
    pub auth_header_name: String,
    pub auth_prefix: String,
    pub db_uri: String,
    pub db_name: String,
    pub collection_name: String,
    pub connector_name: String,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// 從行程環境變數載入；`.env` 由呼叫端先行載入 (見 `load_dotenv`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves every field through `lookup`, falling back to defaults.
    /// Never fails; an unparseable base URL only affects the connector name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_base_url = get("API_BASE_URL", DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let api_endpoints = parse_endpoints(&get("API_ENDPOINTS", DEFAULT_API_ENDPOINTS));
        let connector_name = connector_name_from_url(&api_base_url);

        let collection_name = match lookup("MONGO_COLLECTION") {
            Some(name) if !name.is_empty() => name,
            _ => format!("{}_raw", connector_name),
        };

        Self {
            api_base_url,
            api_endpoints,
            api_key: get("API_KEY", ""),
            auth_header_name: get("API_AUTH_HEADER", DEFAULT_AUTH_HEADER),
            auth_prefix: get("API_AUTH_PREFIX", DEFAULT_AUTH_PREFIX),
            db_uri: get("MONGO_URI", DEFAULT_MONGO_URI),
            db_name: get("MONGO_DB", DEFAULT_MONGO_DB),
            collection_name,
            connector_name,
            output_dir: PathBuf::from(get("ETL_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
        }
    }

    pub fn auth_headers(&self) -> Result<HeaderMap> {
        build_auth_headers(&self.api_key, &self.auth_header_name, &self.auth_prefix)
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("API_BASE_URL", &self.api_base_url)?;
        validation::validate_non_empty_list("API_ENDPOINTS", &self.api_endpoints)?;
        validation::validate_mongo_uri("MONGO_URI", &self.db_uri)?;
        validation::validate_non_empty_string("MONGO_DB", &self.db_name)?;
        validation::validate_non_empty_string("MONGO_COLLECTION", &self.collection_name)?;
        self.auth_headers()?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

/// Loads `.env` into the process environment without overriding variables
/// that are already set. Returns the file that was read, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Splits a comma-separated endpoint list. Order and duplicates are kept.
pub fn parse_endpoints(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|entry| entry.trim().trim_start_matches('/'))
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// `api.example.com` -> `api_example_com`; `connector` when there is no host.
pub fn connector_name_from_url(base_url: &str) -> String {
    let host = Url::parse(base_url).ok().and_then(|url| {
        url.host().map(|host| match host {
            Host::Domain(domain) => domain.to_string(),
            Host::Ipv4(ip) => ip.to_string(),
            Host::Ipv6(ip) => ip.to_string(),
        })
    });

    match host {
        Some(host) if !host.is_empty() => host.replace('.', "_"),
        _ => FALLBACK_CONNECTOR_NAME.to_string(),
    }
}
