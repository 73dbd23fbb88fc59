use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP error {status} for {url}")]
    HttpError {
        status: u16,
        url: String,
        body: String,
    },

    #[error("HTTP transport failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Failed to parse JSON from {url}: {message}")]
    ParseError { url: String, message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] mongodb::error::Error),

    #[error("Database unavailable: {message}")]
    DatabaseUnavailable { message: String },

    #[error("BSON conversion error: {0}")]
    BsonError(#[from] mongodb::bson::ser::Error),

    #[error("Filesystem error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Database,
    Filesystem,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::HttpError { .. } | EtlError::TransportError(_) => ErrorCategory::Network,
            EtlError::ParseError { .. }
            | EtlError::SerializationError(_)
            | EtlError::BsonError(_) => ErrorCategory::Data,
            EtlError::DatabaseError(_) | EtlError::DatabaseUnavailable { .. } => {
                ErrorCategory::Database
            }
            EtlError::IoError(_) => ErrorCategory::Filesystem,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::InvalidEndpoint { .. } => ErrorCategory::Configuration,
        }
    }

    /// `Critical` 表示後續端點也必然失敗，編排器會中止整個執行。
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::HttpError { status, .. } if *status >= 500 || *status == 429 => {
                ErrorSeverity::Medium
            }
            EtlError::HttpError { .. } => ErrorSeverity::High,
            EtlError::TransportError(_) => ErrorSeverity::Medium,
            EtlError::ParseError { .. }
            | EtlError::SerializationError(_)
            | EtlError::BsonError(_) => ErrorSeverity::High,
            EtlError::DatabaseError(_) | EtlError::InvalidEndpoint { .. } => ErrorSeverity::High,
            EtlError::IoError(_) => ErrorSeverity::Low,
            EtlError::DatabaseUnavailable { .. }
            | EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// 只有資料庫無法連線時才值得放棄剩餘端點。
    pub fn aborts_run(&self) -> bool {
        matches!(self, EtlError::DatabaseUnavailable { .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::HttpError { status, .. } if *status == 401 || *status == 403 => {
                "Check API_KEY, API_AUTH_HEADER and API_AUTH_PREFIX"
            }
            EtlError::HttpError { status: 404, .. } | EtlError::InvalidEndpoint { .. } => {
                "Check the endpoint names in API_ENDPOINTS"
            }
            EtlError::HttpError { .. } | EtlError::TransportError(_) => {
                "The API may be down or rate limiting; try again later"
            }
            EtlError::ParseError { .. } | EtlError::SerializationError(_) => {
                "The endpoint did not return a JSON collection; verify it is a JSON API"
            }
            EtlError::BsonError(_) => "A record contains a value MongoDB cannot store",
            EtlError::DatabaseError(_) => "Inspect the MongoDB server logs for the rejected write",
            EtlError::DatabaseUnavailable { .. } => {
                "Make sure MongoDB is running and MONGO_URI is correct"
            }
            EtlError::IoError(_) => "Check permissions and free space of ETL_OUTPUT_DIR",
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the environment variables (or .env file) and run again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::HttpError { status, url, .. } => {
                format!("The API answered {} for {}", status, url)
            }
            EtlError::TransportError(_) => "Could not reach the API".to_string(),
            EtlError::ParseError { url, .. } => format!("Invalid JSON received from {}", url),
            EtlError::DatabaseUnavailable { .. } => "Could not connect to MongoDB".to_string(),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16) -> EtlError {
        EtlError::HttpError {
            status,
            url: "https://api.example.com/posts".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_http_error_severity_depends_on_status() {
        assert_eq!(http_error(503).severity(), ErrorSeverity::Medium);
        assert_eq!(http_error(429).severity(), ErrorSeverity::Medium);
        assert_eq!(http_error(404).severity(), ErrorSeverity::High);
        assert!(!http_error(500).is_critical());
    }

    #[test]
    fn test_database_unavailable_is_critical() {
        let error = EtlError::DatabaseUnavailable {
            message: "server selection timeout".to_string(),
        };
        assert!(error.is_critical());
        assert_eq!(error.category(), ErrorCategory::Database);
    }

    #[test]
    fn test_only_database_unavailable_aborts_run() {
        let bad_endpoint = EtlError::InvalidEndpoint {
            endpoint: "https://".to_string(),
            reason: "empty host".to_string(),
        };
        assert!(!bad_endpoint.aborts_run());
        assert!(!bad_endpoint.is_critical());
        assert!(bad_endpoint.recovery_suggestion().contains("API_ENDPOINTS"));

        let config = EtlError::ConfigError {
            message: "missing".to_string(),
        };
        assert!(config.is_critical());
        assert!(!config.aborts_run());

        let unavailable = EtlError::DatabaseUnavailable {
            message: "server selection timeout".to_string(),
        };
        assert!(unavailable.aborts_run());
    }

    #[test]
    fn test_filesystem_errors_are_not_escalated() {
        let error = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(error.category(), ErrorCategory::Filesystem);
        assert!(error.severity() < ErrorSeverity::High);
    }

    #[test]
    fn test_user_friendly_message_mentions_status() {
        let message = http_error(401).user_friendly_message();
        assert!(message.contains("401"));
        assert!(http_error(401).recovery_suggestion().contains("API_KEY"));
    }
}
