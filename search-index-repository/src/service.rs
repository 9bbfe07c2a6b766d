//! Search index service implementation.
//!
//! This module provides the main service for interacting with the search index.
//! Application code uses it to create indices, bulk index documents, delete
//! documents and run searches.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::bulk;
use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_settings;
use crate::types::{
    BulkIndexItem, BulkIndexSummary, DeleteOutcome, IndexCreation, SearchRequest, SearchResponse,
};
use crate::utils::{validate_document_id, validate_index_name};

/// The main service for interacting with the search index.
///
/// This is the high-level API that application code should use. It validates
/// input, applies the configured index settings and bulk parameters, and
/// delegates backend calls to a `SearchIndexProvider`.
///
/// # Example
///
/// ```no_run
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use search_index_repository::{OpenSearchProvider, SearchIndexService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(OpenSearchProvider::new("http://localhost:9200").await?);
/// let service = SearchIndexService::new(provider);
///
/// service
///     .create_index_if_not_exists("metrics_v1", Some("metrics"))
///     .await?;
///
/// let mut documents = HashMap::new();
/// documents.insert("1".to_string(), r#"{"a":1}"#.to_string());
/// documents.insert("2".to_string(), r#"{"a":2}"#.to_string());
/// service.bulk_index("metrics_v1", documents).await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Arc<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    ///
    /// Defaults: 8 workers, 200 documents per bulk request, a 10 minute bulk
    /// timeout and 2 replicas for new indices.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(
        provider: Arc<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// Create an index unless it already exists, optionally attaching an alias.
    ///
    /// The alias is only attached to an index created by this call, and only
    /// once the creation was acknowledged. An existing index is left untouched.
    /// There is no rollback: if the alias update fails the index stays created.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index
    /// * `alias` - Alias to attach after creation
    ///
    /// # Returns
    ///
    /// * `Ok(IndexCreation::AlreadyExists)` - Nothing was done
    /// * `Ok(IndexCreation::Created { .. })` - The index was created
    /// * `Err(SearchIndexError)` - Validation, transport or backend failure
    #[instrument(skip(self))]
    pub async fn create_index_if_not_exists(
        &self,
        index: &str,
        alias: Option<&str>,
    ) -> Result<IndexCreation, SearchIndexError> {
        validate_index_name(index)?;
        if let Some(alias) = alias {
            validate_index_name(alias)?;
        }

        if self.provider.index_exists(index).await? {
            info!(index = %index, "Index already exists, skip creating index");
            return Ok(IndexCreation::AlreadyExists);
        }

        info!(index = %index, replicas = self.config.index_settings.number_of_replicas, "Creating index");
        let settings = index_settings(&self.config.index_settings);
        let created = self.provider.create_index(index, &settings).await?;
        info!(
            index = %created.index,
            acknowledged = created.acknowledged,
            shards_acknowledged = created.shards_acknowledged,
            "Created index"
        );

        let alias_acknowledged = match alias {
            Some(alias) if created.acknowledged => {
                let acknowledged = self.provider.add_alias(index, alias).await?;
                info!(index = %index, alias = %alias, acknowledged = acknowledged, "Alias update completed");
                Some(acknowledged)
            }
            Some(alias) => {
                warn!(index = %index, alias = %alias, "Index creation not acknowledged, skipping alias");
                None
            }
            None => None,
        };

        Ok(IndexCreation::Created {
            acknowledged: created.acknowledged,
            shards_acknowledged: created.shards_acknowledged,
            alias_acknowledged,
        })
    }

    /// Bulk index JSON documents keyed by document id.
    ///
    /// Documents are partitioned across the configured worker count and sent
    /// in bulk requests of at most the configured batch size. Individual batch
    /// failures are logged and counted in the summary but do not fail the
    /// call. There is no ordering guarantee and no retry.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index or alias
    /// * `documents` - Document id to serialized JSON body
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIndexSummary)` - Every partition finished (an empty map returns immediately)
    /// * `Err(SearchIndexError::Timeout)` - The configured timeout elapsed
    /// * `Err(SearchIndexError::TaskFailed)` - A worker task panicked
    /// * `Err(SearchIndexError::ValidationError)` - The index name is empty
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn bulk_index(
        &self,
        index: &str,
        documents: HashMap<String, String>,
    ) -> Result<BulkIndexSummary, SearchIndexError> {
        validate_index_name(index)?;

        if documents.is_empty() {
            info!(index = %index, "Empty data received for indexing");
            return Ok(BulkIndexSummary::default());
        }

        let items: Vec<BulkIndexItem> = documents.into_iter().map(BulkIndexItem::from).collect();
        bulk::run(self.provider.clone(), index, items, &self.config.bulk).await
    }

    /// Delete a single document.
    ///
    /// A missing document is reported as `DeleteOutcome::NotFound` and logged
    /// as an error; it is not turned into an `Err`.
    ///
    /// # Returns
    ///
    /// * `Ok(DeleteOutcome)` - Whether the document was removed or missing
    /// * `Err(SearchIndexError)` - Validation, transport or backend failure
    #[instrument(skip(self))]
    pub async fn delete_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<DeleteOutcome, SearchIndexError> {
        validate_index_name(index)?;
        validate_document_id(id)?;

        match self.provider.delete_document(index, id).await {
            Ok(DeleteOutcome::NotFound) => {
                error!(index = %index, id = %id, "Index removal failed - document not found");
                Ok(DeleteOutcome::NotFound)
            }
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(index = %index, id = %id, error = %e, "Failed to remove the document");
                Err(e)
            }
        }
    }

    /// Forward a search request and return the backend response unmodified.
    #[instrument(skip(self, request), fields(indices = ?request.indices))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchIndexError> {
        self.provider.search(request).await
    }
}
