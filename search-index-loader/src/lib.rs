//! # Search Index Loader
//!
//! Loads a JSON document file into an OpenSearch index.
//!
//! ## Flow
//!
//! 1. **Config**: Read settings from the environment (and `.env`)
//! 2. **Connect**: Build the OpenSearch provider, retrying if configured
//! 3. **Prepare**: Create the index and alias if they do not exist
//! 4. **Load**: Bulk index the documents with the concurrent coordinator
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and dependency initialization
//! - [`documents`]: Reading the document file

pub mod config;
pub mod documents;

pub use config::{ConnectionMode, Dependencies, LoaderConfig};

use search_index_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during loader initialization or execution.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The document file could not be read or parsed.
    #[error("Document file error: {0}")]
    DocumentsError(String),

    /// Search index error.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),
}

impl LoaderError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a document file error.
    pub fn documents(msg: impl Into<String>) -> Self {
        Self::DocumentsError(msg.into())
    }
}
