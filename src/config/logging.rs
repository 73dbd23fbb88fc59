use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "etl_connector.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_file: String,
    pub verbose: bool,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            log_file: DEFAULT_LOG_FILE.to_string(),
            verbose: false,
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |value: String| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes");

        Self {
            log_dir: lookup("ETL_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_file: lookup("ETL_LOG_FILE")
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.log_file),
            verbose: lookup("ETL_VERBOSE").map(flag).unwrap_or(false),
            format: match lookup("ETL_LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }
}
