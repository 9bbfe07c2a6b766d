//! Configuration types for the SearchIndexService.

use std::time::Duration;

/// Default number of partitions indexed concurrently.
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Default maximum number of documents per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Default upper bound for a whole `bulk_index` call.
pub const DEFAULT_BULK_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default replica count for newly created indices.
pub const DEFAULT_NUMBER_OF_REPLICAS: u32 = 2;

/// Configuration for the bulk indexing coordinator.
///
/// The worker pool built from this configuration lives only for the duration
/// of one `bulk_index` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkIndexConfig {
    /// Number of workers, and the divisor used to size partitions.
    pub worker_count: usize,
    /// Maximum number of documents sent in a single bulk request.
    pub batch_size: usize,
    /// How long the whole call may run before it is abandoned.
    pub timeout: Duration,
}

impl Default for BulkIndexConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_BULK_TIMEOUT,
        }
    }
}

impl BulkIndexConfig {
    /// Set the number of workers. Zero is treated as one.
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the bulk request size. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn effective_worker_count(&self) -> usize {
        self.worker_count.max(1)
    }

    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Settings applied when an index is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettingsConfig {
    pub number_of_replicas: u32,
    /// Left to the backend default when `None`.
    pub number_of_shards: Option<u32>,
}

impl Default for IndexSettingsConfig {
    fn default() -> Self {
        Self {
            number_of_replicas: DEFAULT_NUMBER_OF_REPLICAS,
            number_of_shards: None,
        }
    }
}

/// Configuration for the SearchIndexService.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndexServiceConfig {
    pub bulk: BulkIndexConfig,
    pub index_settings: IndexSettingsConfig,
}

impl SearchIndexServiceConfig {
    pub fn with_bulk(mut self, bulk: BulkIndexConfig) -> Self {
        self.bulk = bulk;
        self
    }

    pub fn with_index_settings(mut self, index_settings: IndexSettingsConfig) -> Self {
        self.index_settings = index_settings;
        self
    }
}
