//! Caching layer for line snapshots.
//!
//! Building a snapshot means loading the record, revalidating the chain and
//! resolving every segment's neighbours. The service caches the result per
//! line and overwrites the entry whenever it commits a mutation, so the TTL
//! only bounds how long an idle line stays resident.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{LineId, LineSnapshot};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

/// Cache of line snapshots, keyed by line id.
#[derive(Clone)]
pub struct SnapshotCache {
    snapshots: MokaCache<LineId, Arc<LineSnapshot>>,
}

impl SnapshotCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let snapshots = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { snapshots }
    }

    /// Get a cached snapshot.
    pub async fn get(&self, id: LineId) -> Option<Arc<LineSnapshot>> {
        self.snapshots.get(&id).await
    }

    /// Insert or replace a snapshot.
    pub async fn insert(&self, snapshot: Arc<LineSnapshot>) {
        self.snapshots.insert(snapshot.id, snapshot).await;
    }

    /// Drop a line's snapshot.
    pub async fn invalidate(&self, id: LineId) {
        self.snapshots.invalidate(&id).await;
    }
}
