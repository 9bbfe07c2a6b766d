//! # Search Index Repository
//!
//! This crate wraps the OpenSearch client to manage index lifecycle, bulk
//! index documents concurrently, delete documents and forward searches. It
//! includes definitions for errors, the provider interface, and a concrete
//! implementation for OpenSearch.

pub mod bulk;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod service;
pub mod types;
pub mod utils;

pub use config::{BulkIndexConfig, IndexSettingsConfig, SearchIndexServiceConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use self::opensearch::OpenSearchProvider;
pub use service::SearchIndexService;
pub use types::{
    BulkIndexItem, BulkIndexOperation, BulkIndexSummary, BulkItemFailure, BulkWriteResponse,
    CreateIndexResponse, DeleteOutcome, IndexCreation, SearchRequest, SearchResponse,
};
pub use utils::{validate_document_id, validate_index_name};
