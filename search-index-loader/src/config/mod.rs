//! Loader configuration read from the environment.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use search_index_repository::{BulkIndexConfig, IndexSettingsConfig, SearchIndexServiceConfig};
use tracing::warn;

use crate::LoaderError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            other => {
                warn!(value = %other, "Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Everything the loader needs to run.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub opensearch_url: String,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub index_name: String,
    pub index_alias: Option<String>,
    pub documents_path: PathBuf,
    pub service: SearchIndexServiceConfig,
}

impl LoaderConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `INDEX_NAME`: Target index (required)
    /// - `INDEX_ALIAS`: Alias attached when the index is created (optional)
    /// - `DOCUMENTS_PATH`: JSON file with an object of document id to document (required)
    /// - `INDEX_REPLICAS`: Replica count for a new index (default: 2)
    /// - `BULK_WORKER_COUNT`: Concurrent partitions (default: 8)
    /// - `BULK_BATCH_SIZE`: Documents per bulk request (default: 200)
    /// - `BULK_TIMEOUT_SECS`: Upper bound for the whole load (default: 600)
    pub fn from_env() -> Result<Self, LoaderError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoaderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let index_name =
            non_empty("INDEX_NAME").ok_or_else(|| LoaderError::config("INDEX_NAME is required"))?;
        let documents_path = non_empty("DOCUMENTS_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| LoaderError::config("DOCUMENTS_PATH is required"))?;

        let defaults = BulkIndexConfig::default();
        let bulk = BulkIndexConfig::default()
            .with_worker_count(parse_or(&lookup, "BULK_WORKER_COUNT", defaults.worker_count)?)
            .with_batch_size(parse_or(&lookup, "BULK_BATCH_SIZE", defaults.batch_size)?)
            .with_timeout(Duration::from_secs(parse_or(
                &lookup,
                "BULK_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?));

        let index_settings = IndexSettingsConfig {
            number_of_replicas: parse_or(
                &lookup,
                "INDEX_REPLICAS",
                IndexSettingsConfig::default().number_of_replicas,
            )?,
            ..Default::default()
        };

        Ok(Self {
            opensearch_url: non_empty("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            connection_mode: ConnectionMode::parse(lookup("OPENSEARCH_CONNECTION_MODE").as_deref()),
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )?),
            index_name,
            index_alias: non_empty("INDEX_ALIAS"),
            documents_path,
            service: SearchIndexServiceConfig::default()
                .with_bulk(bulk)
                .with_index_settings(index_settings),
        })
    }
}

/// Parse an optional numeric variable, rejecting values that are set but malformed.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, LoaderError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| LoaderError::config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::from_lookup(lookup(&[
            ("INDEX_NAME", "metrics_v1"),
            ("DOCUMENTS_PATH", "/tmp/docs.json"),
        ]))
        .unwrap();

        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.connection_mode, ConnectionMode::Retry);
        assert_eq!(config.retry_interval, Duration::from_secs(15));
        assert_eq!(config.index_name, "metrics_v1");
        assert!(config.index_alias.is_none());
        assert_eq!(config.documents_path, PathBuf::from("/tmp/docs.json"));
        assert_eq!(config.service, SearchIndexServiceConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = LoaderConfig::from_lookup(lookup(&[
            ("INDEX_NAME", "metrics_v1"),
            ("INDEX_ALIAS", "metrics"),
            ("DOCUMENTS_PATH", "docs.json"),
            ("OPENSEARCH_URL", "http://search:9200"),
            ("OPENSEARCH_CONNECTION_MODE", "FAIL-FAST"),
            ("BULK_WORKER_COUNT", "4"),
            ("BULK_BATCH_SIZE", "50"),
            ("BULK_TIMEOUT_SECS", "30"),
            ("INDEX_REPLICAS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.opensearch_url, "http://search:9200");
        assert_eq!(config.connection_mode, ConnectionMode::FailFast);
        assert_eq!(config.index_alias.as_deref(), Some("metrics"));
        assert_eq!(config.service.bulk.worker_count, 4);
        assert_eq!(config.service.bulk.batch_size, 50);
        assert_eq!(config.service.bulk.timeout, Duration::from_secs(30));
        assert_eq!(config.service.index_settings.number_of_replicas, 0);
    }

    #[test]
    fn test_missing_required() {
        let result = LoaderConfig::from_lookup(lookup(&[("DOCUMENTS_PATH", "docs.json")]));
        assert!(matches!(result, Err(LoaderError::ConfigError(_))));

        let result = LoaderConfig::from_lookup(lookup(&[("INDEX_NAME", "metrics_v1")]));
        assert!(matches!(result, Err(LoaderError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_number() {
        let result = LoaderConfig::from_lookup(lookup(&[
            ("INDEX_NAME", "metrics_v1"),
            ("DOCUMENTS_PATH", "docs.json"),
            ("BULK_BATCH_SIZE", "lots"),
        ]));
        assert!(matches!(result, Err(LoaderError::ConfigError(_))));
    }

    #[test]
    fn test_connection_mode_parse() {
        assert_eq!(ConnectionMode::parse(None), ConnectionMode::Retry);
        assert_eq!(ConnectionMode::parse(Some("fail_fast")), ConnectionMode::FailFast);
        assert_eq!(ConnectionMode::parse(Some("failfast")), ConnectionMode::FailFast);
        assert_eq!(ConnectionMode::parse(Some("bogus")), ConnectionMode::Retry);
    }
}
