//! Dependency initialization and wiring for the loader.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ConnectionMode, LoaderConfig};
use crate::LoaderError;
use search_index_repository::{
    OpenSearchProvider, SearchIndexError, SearchIndexProvider, SearchIndexService,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Service wired to the OpenSearch provider.
    pub service: SearchIndexService,
    pub config: LoaderConfig,
}

impl Dependencies {
    /// Initialize all dependencies from the given configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(LoaderError)` - If initialization fails (only in fail-fast mode)
    pub async fn new(config: LoaderConfig) -> Result<Self, LoaderError> {
        info!(
            opensearch_url = %config.opensearch_url,
            index = %config.index_name,
            alias = ?config.index_alias,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let provider = Self::connect_to_opensearch(
            &config.opensearch_url,
            &config.index_name,
            config.connection_mode,
            config.retry_interval,
        )
        .await?;

        info!("OpenSearch connection established");

        let service = SearchIndexService::with_config(Arc::new(provider), config.service.clone());

        Ok(Self { service, config })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    ///
    /// A malformed URL is never retried.
    async fn connect_to_opensearch(
        url: &str,
        index: &str,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider, LoaderError> {
        loop {
            match Self::try_connect_opensearch(url, index).await {
                Ok(provider) => return Ok(provider),
                Err(e @ SearchIndexError::ConnectionError(_)) => {
                    return Err(LoaderError::config(format!(
                        "Failed to create OpenSearch provider: {}",
                        e
                    )));
                }
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(LoaderError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Build the provider and make one round trip to check the node answers.
    async fn try_connect_opensearch(
        url: &str,
        index: &str,
    ) -> Result<OpenSearchProvider, SearchIndexError> {
        let provider = OpenSearchProvider::new(url).await?;
        provider.index_exists(index).await?;
        Ok(provider)
    }
}
