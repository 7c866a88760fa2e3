//! Cached entity-statistics lookups.
//!
//! Shares the bounded cache with the matcher and canonicalizer under the
//! `stats:` key prefix, which is what change-notification invalidation
//! targets when an entity is rewritten.

use std::sync::Arc;

use tokio::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::cache::{CachedValue, SharedCache};
use crate::error::ResolveError;
use crate::lookup::EntityStatsLookup;
use crate::types::EntityStats;

pub struct EntityStatsService {
    lookup: Arc<dyn EntityStatsLookup>,
    cache: Arc<SharedCache>,
    cache_ttl: Duration,
}

impl EntityStatsService {
    pub fn new(
        lookup: Arc<dyn EntityStatsLookup>,
        cache: Arc<SharedCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            lookup,
            cache,
            cache_ttl,
        }
    }

    pub async fn entity_stats(&self, entity_id: Uuid) -> Result<EntityStats, ResolveError> {
        let key = format!("stats:{entity_id}");
        if let Some(CachedValue::Stats(hit)) = self.cache.get(&key) {
            debug!(%entity_id, "stats cache hit");
            return Ok(hit);
        }

        let stats = self.lookup.lookup_stats(entity_id).await?;
        self.cache
            .set(key, CachedValue::Stats(stats.clone()), self.cache_ttl);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    struct StatsStub {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EntityStatsLookup for StatsStub {
        async fn lookup_stats(&self, entity_id: Uuid) -> Result<EntityStats, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EntityStats {
                entity_id,
                feature_count: 12,
                pathognomonic_count: 1,
                updated_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn stats_are_cached_under_the_stats_prefix() {
        let stub = Arc::new(StatsStub {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(SharedCache::new());
        let service = EntityStatsService::new(
            Arc::clone(&stub) as Arc<dyn EntityStatsLookup>,
            Arc::clone(&cache),
            Duration::from_secs(300),
        );

        let entity_id = Uuid::new_v4();
        service.entity_stats(entity_id).await.unwrap();
        service.entity_stats(entity_id).await.unwrap();

        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert!(cache.get(&format!("stats:{entity_id}")).is_some());
    }

    #[tokio::test]
    async fn prefix_invalidation_forces_a_refetch() {
        let stub = Arc::new(StatsStub {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(SharedCache::new());
        let service = EntityStatsService::new(
            Arc::clone(&stub) as Arc<dyn EntityStatsLookup>,
            Arc::clone(&cache),
            Duration::from_secs(300),
        );

        let entity_id = Uuid::new_v4();
        service.entity_stats(entity_id).await.unwrap();
        cache.invalidate_prefix("stats:");
        service.entity_stats(entity_id).await.unwrap();

        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }
}
