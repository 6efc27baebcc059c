//! Time-bounded cache of the collection listing
//!
//! Concurrent requests that find the entry stale may each refresh it; the
//! last write wins and every refresh returns a fresh listing.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::query::Datatype;

use super::errors::ExecutionResult;
use super::executor::PlanExecutor;

/// Default validity window for the listing
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(60 * 60);

type Entry = (Instant, Arc<Vec<Datatype>>);

/// Caches [`PlanExecutor::list_collections`] for a fixed window
#[derive(Debug)]
pub struct DatatypeCache {
    ttl: Duration,
    entry: RwLock<Option<Entry>>,
}

impl Default for DatatypeCache {
    fn default() -> Self {
        Self::new(DEFAULT_LISTING_TTL)
    }
}

impl DatatypeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached listing, refreshing it once the window has elapsed
    pub async fn get(&self, executor: &dyn PlanExecutor) -> ExecutionResult<Arc<Vec<Datatype>>> {
        if let Some(listing) = self.fresh() {
            return Ok(listing);
        }

        let listing = Arc::new(executor.list_collections().await?);
        *self
            .entry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((Instant::now(), Arc::clone(&listing)));
        Ok(listing)
    }

    /// Number of collections in the listing
    pub async fn count(&self, executor: &dyn PlanExecutor) -> ExecutionResult<usize> {
        Ok(self.get(executor).await?.len())
    }

    /// Drops the cached listing
    pub fn invalidate(&self) {
        *self
            .entry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn fresh(&self) -> Option<Arc<Vec<Datatype>>> {
        let entry = self
            .entry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entry.as_ref() {
            Some((stored, listing)) if stored.elapsed() < self.ttl => Some(Arc::clone(listing)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MemoryStore;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_listing_cached_until_window_elapses() {
        let store = MemoryStore::new();
        store.insert("world", vec![json!({"world_id": 1})]);
        let cache = DatatypeCache::new(Duration::from_secs(60));

        let first = cache.get(&store).await.unwrap();
        assert_eq!(first.as_slice(), &[Datatype::new("world", 1)]);

        store.insert("zone", vec![json!({"zone_id": 2})]);
        assert_eq!(cache.count(&store).await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.count(&store).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let store = MemoryStore::new();
        let cache = DatatypeCache::default();
        assert_eq!(cache.count(&store).await.unwrap(), 0);

        store.insert("world", Vec::new());
        cache.invalidate();
        assert_eq!(cache.count(&store).await.unwrap(), 1);
    }
}
