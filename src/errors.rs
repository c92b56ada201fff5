use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from the aggregation pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("AggregationError::EmptyInput: no records to summarize")]
    EmptyInput,
    #[error("AggregationError::MissingData: '{field}' missing in record at {timestamp}")]
    MissingData {
        field: &'static str,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Error, Debug)]
pub enum OpenMeteoError {
    #[error("OpenMeteoError::Http: {0}")]
    Http(String),
    #[error("OpenMeteoError::Document: {0}")]
    Document(String),
}
impl From<ureq::Error> for OpenMeteoError {
    fn from(e: ureq::Error) -> Self {
        OpenMeteoError::Http(e.to_string())
    }
}
impl From<serde_json::Error> for OpenMeteoError {
    fn from(e: serde_json::Error) -> Self {
        OpenMeteoError::Document(e.to_string())
    }
}

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(format!("io error: {}", e))
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(format!("toml error: {}", e))
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}

#[derive(Error, Debug)]
#[error("LogSetupError: {0}")]
pub struct LogSetupError(pub String);

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("WorkerError::Fetch: {0}")]
    Fetch(#[from] OpenMeteoError),
    #[error("WorkerError::Aggregation: {0}")]
    Aggregation(#[from] AggregationError),
    #[error("WorkerError::Thread: {0}")]
    Thread(String),
}
