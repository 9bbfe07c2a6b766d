//! Integration tests for the search index service.
//!
//! These tests drive the real SearchIndexService and bulk coordinator against
//! an in-memory SearchIndexProvider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use search_index_repository::{
    BulkIndexConfig, BulkIndexOperation, BulkWriteResponse, CreateIndexResponse, DeleteOutcome,
    IndexCreation, SearchIndexError, SearchIndexProvider, SearchIndexService,
    SearchIndexServiceConfig, SearchRequest, SearchResponse,
};

// In-memory backend: index name -> (document id -> source)
#[derive(Default)]
struct InMemoryProvider {
    indices: Mutex<HashMap<String, HashMap<String, Value>>>,
    aliases: Mutex<HashMap<String, String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    panic_on_bulk: bool,
    // Reject the first bulk request carrying exactly this many operations.
    fail_first_batch_of: Option<usize>,
    failed_once: AtomicBool,
    bulk_calls: AtomicUsize,
}

impl InMemoryProvider {
    fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|docs| docs.get(id).cloned())
    }

    fn document_count(&self, index: &str) -> usize {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl SearchIndexProvider for InMemoryProvider {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        Ok(self.indices.lock().unwrap().contains_key(index))
    }

    async fn create_index(
        &self,
        index: &str,
        _settings: &Value,
    ) -> Result<CreateIndexResponse, SearchIndexError> {
        self.indices
            .lock()
            .unwrap()
            .insert(index.to_string(), HashMap::new());
        Ok(CreateIndexResponse {
            index: index.to_string(),
            acknowledged: true,
            shards_acknowledged: true,
        })
    }

    async fn add_alias(&self, index: &str, alias: &str) -> Result<bool, SearchIndexError> {
        self.aliases
            .lock()
            .unwrap()
            .insert(alias.to_string(), index.to_string());
        Ok(true)
    }

    async fn bulk_index(
        &self,
        index: &str,
        operations: &[BulkIndexOperation],
    ) -> Result<BulkWriteResponse, SearchIndexError> {
        if self.panic_on_bulk {
            panic!("backend client panicked");
        }
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_first_batch_of == Some(operations.len())
            && !self.failed_once.swap(true, Ordering::SeqCst)
        {
            return Err(SearchIndexError::bulk_index("rejected with status 503"));
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;

        {
            let mut indices = self.indices.lock().unwrap();
            let docs = indices.entry(index.to_string()).or_default();
            for operation in operations {
                docs.insert(operation.id.clone(), operation.source.clone());
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(BulkWriteResponse {
            took: 5,
            items: operations.len(),
            failures: Vec::new(),
        })
    }

    async fn delete_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<DeleteOutcome, SearchIndexError> {
        let removed = self
            .indices
            .lock()
            .unwrap()
            .get_mut(index)
            .and_then(|docs| docs.remove(id));
        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchIndexError> {
        let indices = self.indices.lock().unwrap();
        let hits: Vec<Value> = request
            .indices
            .iter()
            .filter_map(|name| indices.get(name))
            .flat_map(|docs| {
                docs.iter()
                    .map(|(id, source)| json!({ "_id": id, "_source": source }))
            })
            .collect();

        Ok(SearchResponse {
            status: 200,
            body: json!({ "hits": { "total": { "value": hits.len() }, "hits": hits } }),
        })
    }
}

#[tokio::test]
async fn test_two_documents_are_retrievable() {
    let provider = Arc::new(InMemoryProvider::default());
    let service = SearchIndexService::new(provider.clone());

    let mut documents = HashMap::new();
    documents.insert("1".to_string(), r#"{"a":1}"#.to_string());
    documents.insert("2".to_string(), r#"{"a":2}"#.to_string());

    let summary = service.bulk_index("test-idx", documents).await.unwrap();

    assert_eq!(summary.partitions, 2);
    assert_eq!(summary.batches_submitted, 2);
    assert_eq!(provider.document("test-idx", "1"), Some(json!({"a": 1})));
    assert_eq!(provider.document("test-idx", "2"), Some(json!({"a": 2})));
}

#[tokio::test]
async fn test_full_lifecycle() {
    let provider = Arc::new(InMemoryProvider::default());
    let service = SearchIndexService::new(provider.clone());

    let created = service
        .create_index_if_not_exists("metrics_v1", Some("metrics"))
        .await
        .unwrap();
    assert!(matches!(
        created,
        IndexCreation::Created {
            alias_acknowledged: Some(true),
            ..
        }
    ));
    assert_eq!(
        provider.aliases.lock().unwrap().get("metrics"),
        Some(&"metrics_v1".to_string())
    );

    let documents: HashMap<String, String> = (0..500)
        .map(|i| (format!("doc-{}", i), json!({ "n": i }).to_string()))
        .collect();
    service.bulk_index("metrics_v1", documents).await.unwrap();
    assert_eq!(provider.document_count("metrics_v1"), 500);

    let response = service
        .search(&SearchRequest::new(
            ["metrics_v1"],
            json!({ "query": { "match_all": {} } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.total_hits(), Some(500));

    assert_eq!(
        service.delete_document("metrics_v1", "doc-7").await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        service.delete_document("metrics_v1", "doc-7").await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert_eq!(provider.document_count("metrics_v1"), 499);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bounded_by_worker_count() {
    let provider = Arc::new(InMemoryProvider::default());
    let config = SearchIndexServiceConfig::default()
        .with_bulk(BulkIndexConfig::default().with_worker_count(3).with_batch_size(2));
    let service = SearchIndexService::with_config(provider.clone(), config);

    let documents: HashMap<String, String> = (0..10)
        .map(|i| (i.to_string(), json!({ "n": i }).to_string()))
        .collect();

    let summary = service.bulk_index("test-idx", documents).await.unwrap();

    // 10 / 3 = 3 per partition: [3, 3, 3, 1], so one partition waits for a permit.
    assert_eq!(summary.partitions, 4);
    assert_eq!(summary.batches_submitted, 7);
    assert_eq!(provider.document_count("test-idx"), 10);
    let max_in_flight = provider.max_in_flight.load(Ordering::SeqCst);
    assert!(max_in_flight >= 1);
    assert!(max_in_flight <= 3, "max in flight was {}", max_in_flight);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_batch_does_not_stop_rest_of_partition() {
    // Only first batches of the three-document partitions carry two operations,
    // so the rejected batch always has a follow-up batch in its partition.
    let provider = Arc::new(InMemoryProvider {
        fail_first_batch_of: Some(2),
        ..Default::default()
    });
    let config = SearchIndexServiceConfig::default()
        .with_bulk(BulkIndexConfig::default().with_worker_count(3).with_batch_size(2));
    let service = SearchIndexService::with_config(provider.clone(), config);

    let documents: HashMap<String, String> = (0..10)
        .map(|i| (i.to_string(), json!({ "n": i }).to_string()))
        .collect();

    let summary = service.bulk_index("test-idx", documents).await.unwrap();

    assert_eq!(summary.partitions, 4);
    assert_eq!(summary.batches_submitted, 7);
    assert_eq!(summary.batches_failed, 1);
    assert_eq!(provider.bulk_calls.load(Ordering::SeqCst), 7);
    // Everything but the two rejected documents landed, including the
    // single-document batch that followed the failure.
    assert_eq!(provider.document_count("test-idx"), 8);
    assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_worker_panic_is_reported() {
    let provider = Arc::new(InMemoryProvider {
        panic_on_bulk: true,
        ..Default::default()
    });
    let service = SearchIndexService::new(provider);

    let mut documents = HashMap::new();
    documents.insert("1".to_string(), r#"{"a":1}"#.to_string());

    let result = service.bulk_index("test-idx", documents).await;
    assert!(matches!(result, Err(SearchIndexError::TaskFailed(_))));
}
