//! Search index provider trait definition.
//!
//! This module defines the abstract interface to the search backend so the
//! service can be driven by OpenSearch in production and by mocks in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{
    BulkIndexOperation, BulkWriteResponse, CreateIndexResponse, DeleteOutcome, SearchRequest,
    SearchResponse,
};

/// Abstracts the underlying search backend.
///
/// Every method is a single round trip. Implementations are shared between the
/// bulk indexing workers through an `Arc`, so they must be safe to call
/// concurrently.
///
/// Transport failures are reported as `SearchIndexError::Transport`; how the
/// caller reacts to them is decided by `SearchIndexService`.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether an index with the given name exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index with the given settings/mappings body.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index to create
    /// * `settings` - Create-index body (see `opensearch::index_settings`)
    async fn create_index(
        &self,
        index: &str,
        settings: &Value,
    ) -> Result<CreateIndexResponse, SearchIndexError>;

    /// Atomically attach `alias` to `index`.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the backend acknowledged the alias update
    async fn add_alias(&self, index: &str, alias: &str) -> Result<bool, SearchIndexError>;

    /// Send one bulk request made of `index` actions.
    ///
    /// A delivered request whose items were partly rejected is still `Ok`; the
    /// rejections are listed in `BulkWriteResponse::failures`.
    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkIndexOperation],
    ) -> Result<BulkWriteResponse, SearchIndexError>;

    /// Delete a single document.
    ///
    /// # Returns
    ///
    /// * `Ok(DeleteOutcome::Deleted)` - The document was removed
    /// * `Ok(DeleteOutcome::NotFound)` - No document with that id existed
    /// * `Err(SearchIndexError)` - Transport failure or unexpected status
    async fn delete_document(&self, index: &str, id: &str)
        -> Result<DeleteOutcome, SearchIndexError>;

    /// Run a search request and return the backend response unmodified.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchIndexError>;
}
