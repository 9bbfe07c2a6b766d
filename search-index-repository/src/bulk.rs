//! Concurrent bulk indexing.
//!
//! Documents are split into contiguous partitions, one task per partition,
//! with at most `worker_count` tasks running at a time. Each task sends its
//! partition in bulk requests of at most `batch_size` operations. Failed
//! batches are logged and counted, they never stop sibling batches.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::BulkIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BulkIndexItem, BulkIndexOperation, BulkIndexSummary};

/// Size of each partition for `total` items spread over `worker_count` workers.
///
/// Always at least one, so a small input yields one partition per item.
pub fn partition_size(total: usize, worker_count: usize) -> usize {
    (total / worker_count.max(1)).max(1)
}

/// Split items into contiguous partitions of `partition_size(len, worker_count)`.
///
/// Input order is preserved; the last partition may be smaller.
pub fn partition(items: Vec<BulkIndexItem>, worker_count: usize) -> Vec<Vec<BulkIndexItem>> {
    let size = partition_size(items.len(), worker_count);
    let mut partitions = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();

    while iter.peek().is_some() {
        partitions.push(iter.by_ref().take(size).collect());
    }
    partitions
}

/// Index every item, waiting for all partitions or the configured timeout.
///
/// Returns `Timeout` when the deadline passes (unfinished partitions are
/// aborted) and `TaskFailed` when a partition task panics. Per-batch failures
/// only show up in the returned summary and the logs.
pub(crate) async fn run(
    provider: Arc<dyn SearchIndexProvider>,
    index: &str,
    items: Vec<BulkIndexItem>,
    config: &BulkIndexConfig,
) -> Result<BulkIndexSummary, SearchIndexError> {
    let worker_count = config.effective_worker_count();
    let batch_size = config.effective_batch_size();
    let total = items.len();
    let partitions = partition(items, worker_count);

    let mut summary = BulkIndexSummary {
        total,
        partitions: partitions.len(),
        ..Default::default()
    };

    info!(
        index = %index,
        documents = total,
        partitions = partitions.len(),
        worker_count = worker_count,
        batch_size = batch_size,
        "Starting bulk indexing"
    );

    let started = Instant::now();
    let permits = Arc::new(Semaphore::new(worker_count));
    let mut tasks = JoinSet::new();

    for (partition_id, partition) in partitions.into_iter().enumerate() {
        let provider = provider.clone();
        let permits = permits.clone();
        let index = index.to_string();

        tasks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(SearchIndexError::task_failed(e.to_string())),
            };
            Ok(index_partition(&*provider, &index, partition_id, partition, batch_size).await)
        });
    }

    let joined = tokio::time::timeout(config.timeout, async {
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(partition_summary)) => summary.merge(&partition_summary),
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(SearchIndexError::task_failed(e.to_string())),
            }
        }
        Ok(())
    })
    .await;

    match joined {
        Ok(Ok(())) => {
            info!(
                index = %index,
                documents = summary.total,
                batches_submitted = summary.batches_submitted,
                batches_failed = summary.batches_failed,
                documents_rejected = summary.documents_rejected,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Bulk indexing finished"
            );
            Ok(summary)
        }
        Ok(Err(e)) => {
            error!(index = %index, error = %e, "Bulk indexing worker failed");
            tasks.abort_all();
            Err(e)
        }
        Err(_) => {
            error!(
                index = %index,
                timeout_secs = config.timeout.as_secs(),
                "Bulk indexing timed out"
            );
            tasks.abort_all();
            Err(SearchIndexError::timeout(config.timeout))
        }
    }
}

/// Send one partition in batches of at most `batch_size` operations.
async fn index_partition(
    provider: &dyn SearchIndexProvider,
    index: &str,
    partition_id: usize,
    partition: Vec<BulkIndexItem>,
    batch_size: usize,
) -> BulkIndexSummary {
    info!(index = %index, partition = partition_id, documents = partition.len(), "Started bulk indexing partition");

    let mut summary = BulkIndexSummary::default();
    let mut batch: Vec<BulkIndexOperation> = Vec::with_capacity(batch_size.min(partition.len()));

    for item in partition {
        let source = match serde_json::from_str(&item.source) {
            Ok(source) => source,
            Err(e) => {
                warn!(index = %index, id = %item.id, error = %e, "Skipping document with invalid JSON body");
                summary.documents_rejected += 1;
                continue;
            }
        };
        batch.push(BulkIndexOperation {
            id: item.id,
            source,
        });

        if batch.len() >= batch_size {
            submit_batch(provider, index, partition_id, &batch, &mut summary).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        submit_batch(provider, index, partition_id, &batch, &mut summary).await;
    }

    info!(index = %index, partition = partition_id, "Bulk indexing partition finished");
    summary
}

async fn submit_batch(
    provider: &dyn SearchIndexProvider,
    index: &str,
    partition_id: usize,
    batch: &[BulkIndexOperation],
    summary: &mut BulkIndexSummary,
) {
    debug!(index = %index, partition = partition_id, operations = batch.len(), "Submitting bulk request");
    summary.batches_submitted += 1;

    match provider.bulk_index(index, batch).await {
        Ok(response) if response.has_failures() => {
            summary.documents_rejected += response.failures.len();
            error!(
                index = %index,
                partition = partition_id,
                failures = response.failures.len(),
                message = %response.failure_message(),
                "Bulk index has errors"
            );
        }
        Ok(_) => {}
        Err(e) => {
            summary.batches_failed += 1;
            error!(
                index = %index,
                partition = partition_id,
                operations = batch.len(),
                error = %e,
                "Bulk request failed"
            );
        }
    }
}
