//! Utility functions for the search index repository.

use crate::errors::SearchIndexError;

/// Ensure an index name is usable.
///
/// Only emptiness is checked here; naming rules beyond that are left to the
/// backend, which reports them on creation.
///
/// # Example
///
/// ```
/// use search_index_repository::validate_index_name;
///
/// assert!(validate_index_name("opensearch_metrics").is_ok());
/// assert!(validate_index_name("  ").is_err());
/// ```
pub fn validate_index_name(index: &str) -> Result<(), SearchIndexError> {
    if index.trim().is_empty() {
        return Err(SearchIndexError::validation("index name is required"));
    }
    Ok(())
}

/// Ensure a document id is non-empty.
pub fn validate_document_id(id: &str) -> Result<(), SearchIndexError> {
    if id.is_empty() {
        return Err(SearchIndexError::validation("document id is required"));
    }
    Ok(())
}
