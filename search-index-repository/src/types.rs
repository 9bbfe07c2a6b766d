//! Request and response types for search index operations.

use serde::Deserialize;
use serde_json::Value;

/// A single document handed to the bulk indexing coordinator.
///
/// The `source` is an opaque serialized JSON body; it is only parsed right
/// before being placed into a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkIndexItem {
    /// Document id, unique within the target index.
    pub id: String,
    /// Serialized JSON document body.
    pub source: String,
}

impl BulkIndexItem {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

impl From<(String, String)> for BulkIndexItem {
    fn from((id, source): (String, String)) -> Self {
        Self { id, source }
    }
}

/// One `index` action of a bulk request: the document id plus its parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkIndexOperation {
    pub id: String,
    pub source: Value,
}

/// A document the backend refused within an otherwise delivered bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemFailure {
    /// Position of the item inside the bulk request.
    pub position: usize,
    pub index: String,
    pub id: String,
    /// HTTP status reported for the item.
    pub status: u16,
    pub reason: String,
}

/// Outcome of a delivered bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteResponse {
    /// Time the backend spent on the request, in milliseconds.
    pub took: u64,
    /// Number of items the backend reported back.
    pub items: usize,
    /// Items the backend rejected.
    pub failures: Vec<BulkItemFailure>,
}

impl BulkWriteResponse {
    /// Whether any item of the request was rejected.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Human readable summary of the rejected items, one line per item.
    ///
    /// Returns an empty string when every item was accepted.
    pub fn failure_message(&self) -> String {
        if self.failures.is_empty() {
            return String::new();
        }

        let mut message = String::from("failure in bulk execution:");
        for failure in &self.failures {
            message.push_str(&format!(
                "\n[{}]: index [{}], id [{}], status [{}], message [{}]",
                failure.position, failure.index, failure.id, failure.status, failure.reason
            ));
        }
        message
    }
}

/// Summary of a `bulk_index` call.
///
/// Failures counted here were logged and did not fail the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkIndexSummary {
    /// Number of documents handed to the coordinator.
    pub total: usize,
    /// Number of partitions the documents were split into.
    pub partitions: usize,
    /// Number of bulk requests sent to the backend.
    pub batches_submitted: usize,
    /// Number of bulk requests that failed in transport.
    pub batches_failed: usize,
    /// Documents rejected by the backend or skipped because their body was not valid JSON.
    pub documents_rejected: usize,
}

impl BulkIndexSummary {
    pub(crate) fn merge(&mut self, other: &BulkIndexSummary) {
        self.batches_submitted += other.batches_submitted;
        self.batches_failed += other.batches_failed;
        self.documents_rejected += other.documents_rejected;
    }
}

/// Response of an index creation call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateIndexResponse {
    pub index: String,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub shards_acknowledged: bool,
}

/// Result of `create_index_if_not_exists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCreation {
    /// The index was already present; nothing was changed.
    AlreadyExists,
    /// The index was created.
    Created {
        acknowledged: bool,
        shards_acknowledged: bool,
        /// `None` when no alias was requested or the alias step was skipped.
        alias_acknowledged: Option<bool>,
    },
}

/// Result of a single document deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The backend had no document with the given id.
    NotFound,
}

/// A search request forwarded to the backend as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Indices or aliases to search; empty searches all indices.
    pub indices: Vec<String>,
    /// Query DSL body.
    pub body: Value,
}

impl SearchRequest {
    pub fn new<I, S>(indices: I, body: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            body,
        }
    }
}

/// Backend search response, body left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub status: u16,
    pub body: Value,
}

impl SearchResponse {
    /// The `hits.hits` array, empty if absent.
    pub fn hits(&self) -> &[Value] {
        self.body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The `hits.total` value, accepting both the object and the legacy numeric form.
    pub fn total_hits(&self) -> Option<u64> {
        let total = self.body.get("hits")?.get("total")?;
        total
            .get("value")
            .and_then(Value::as_u64)
            .or_else(|| total.as_u64())
    }
}
