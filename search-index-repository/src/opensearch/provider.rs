//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, DeleteParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::add_alias_actions;
use crate::types::{
    BulkIndexOperation, BulkItemFailure, BulkWriteResponse, CreateIndexResponse, DeleteOutcome,
    SearchRequest, SearchResponse,
};

/// OpenSearch provider implementation.
///
/// Talks to a single OpenSearch node over HTTP. The underlying client is
/// cheap to share; one provider serves every bulk indexing worker.
///
/// # Example
///
/// ```ignore
/// let provider = OpenSearchProvider::new("http://localhost:9200").await?;
/// let exists = provider.index_exists("opensearch_metrics").await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch provider");

        Ok(Self { client })
    }

    /// Build the NDJSON body of a bulk request: one action line and one source
    /// line per operation.
    fn bulk_body(index: &str, operations: &[BulkIndexOperation]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(operations.len() * 2);
        for operation in operations {
            body.push(json!({"index": {"_index": index, "_id": operation.id}}).into());
            body.push(operation.source.clone().into());
        }
        body
    }

    /// Extract per-item failures from a bulk response body.
    ///
    /// Items without an `error` object are treated as accepted.
    fn parse_bulk_response(index: &str, body: &Value) -> BulkWriteResponse {
        let took = body.get("took").and_then(Value::as_u64).unwrap_or(0);
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let failures = items
            .iter()
            .enumerate()
            .filter_map(|(position, item)| {
                // Each item is keyed by its action name ("index", "create", ...)
                let result = item.as_object()?.values().next()?;
                let error = result.get("error")?;
                let reason = error
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());

                Some(BulkItemFailure {
                    position,
                    index: result
                        .get("_index")
                        .and_then(Value::as_str)
                        .unwrap_or(index)
                        .to_string(),
                    id: result
                        .get("_id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    status: result
                        .get("status")
                        .and_then(Value::as_u64)
                        .and_then(|s| u16::try_from(s).ok())
                        .unwrap_or(0),
                    reason,
                })
            })
            .collect();

        BulkWriteResponse {
            took,
            items: items.len(),
            failures,
        }
    }

    /// Whether a 404 delete response body reports a missing document.
    fn is_document_not_found(body: &str) -> bool {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|body| {
                body.get("result")
                    .and_then(Value::as_str)
                    .map(|result| result == "not_found")
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                error!(index = %index, status = status, body = %error_body, "Index exists check failed");
                Err(SearchIndexError::index_lookup(format!(
                    "Index exists check failed with status {}: {}",
                    status, error_body
                )))
            }
        }
    }

    async fn create_index(
        &self,
        index: &str,
        settings: &Value,
    ) -> Result<CreateIndexResponse, SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings.clone())
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::index_creation(format!(
                "Create index failed with status {}: {}",
                status, error_body
            )));
        }

        response
            .json::<CreateIndexResponse>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    async fn add_alias(&self, index: &str, alias: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .update_aliases()
            .body(add_alias_actions(index, alias))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, alias = %alias, status = %status, body = %error_body, "Alias update failed");
            return Err(SearchIndexError::alias(format!(
                "Alias update failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        Ok(body
            .get("acknowledged")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkIndexOperation],
    ) -> Result<BulkWriteResponse, SearchIndexError> {
        let body = Self::bulk_body(index, operations);

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(index = %index, status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let result = Self::parse_bulk_response(index, &response_body);
        debug!(
            index = %index,
            items = result.items,
            failures = result.failures.len(),
            took_ms = result.took,
            "Bulk request completed"
        );
        Ok(result)
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<DeleteOutcome, SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // A 404 also comes back for a missing index; only a delete result
            // of `not_found` means the document itself is absent.
            if status.as_u16() == 404 && Self::is_document_not_found(&error_body) {
                return Ok(DeleteOutcome::NotFound);
            }
            error!(index = %index, id = %id, status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, id = %id, "Document deleted");
        Ok(DeleteOutcome::Deleted)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchIndexError> {
        let indices: Vec<&str> = request.indices.iter().map(String::as_str).collect();
        let parts = if indices.is_empty() {
            SearchParts::None
        } else {
            SearchParts::Index(&indices)
        };

        let response = self
            .client
            .search(parts)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::search(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(SearchResponse {
            status: status.as_u16(),
            body,
        })
    }
}
