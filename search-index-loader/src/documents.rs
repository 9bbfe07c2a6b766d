//! Reading the document file.
//!
//! The file holds a single JSON object whose keys are document ids and whose
//! values are the documents to index.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::LoaderError;

/// Read and parse the document file at `path`.
pub async fn read_documents(path: &Path) -> Result<HashMap<String, String>, LoaderError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoaderError::documents(format!("{}: {}", path.display(), e)))?;

    let documents = parse_documents(&contents)?;
    debug!(path = %path.display(), documents = documents.len(), "Read document file");
    Ok(documents)
}

/// Parse a JSON object of id to document into serialized document bodies.
pub fn parse_documents(contents: &str) -> Result<HashMap<String, String>, LoaderError> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| LoaderError::documents(format!("invalid JSON: {}", e)))?;

    let Value::Object(entries) = value else {
        return Err(LoaderError::documents(
            "expected a JSON object of document id to document",
        ));
    };

    Ok(entries
        .into_iter()
        .map(|(id, document)| (id, document.to_string()))
        .collect())
}
