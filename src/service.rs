//! Owning facade over the resolution components.
//!
//! [`ShorthandResolver`] is constructed explicitly by the hosting process —
//! no module-level singletons — and owns the matcher, the resolution
//! workflow, the statistics service, and the one shared cache they all use.
//! Change-notification handling is an owned background task, torn down by
//! `shutdown()` or on drop, so subscription lifetime follows the owner
//! rather than module load order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::cache::SharedCache;
use crate::canonicalizer::Canonicalizer;
use crate::error::ResolveError;
use crate::lookup::{EntityStatsLookup, FeatureAttacher, FeatureLookup};
use crate::matcher::{SuggestOutcome, SuggestionMatcher};
use crate::stats::EntityStatsService;
use crate::types::{ChangeEvent, EntityStats};
use crate::workflow::{ResolutionWorkflow, ResolvedToken};

/// Tuning knobs for the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Debounce window for suggestion calls (milliseconds).
    pub debounce_ms: u64,
    /// Time-to-live for cached lookup results (milliseconds).
    pub cache_ttl_ms: u64,
    /// Minimum partial length before the lookup service is queried.
    pub min_partial_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            cache_ttl_ms: 300_000, // 5 minutes
            min_partial_len: 2,
        }
    }
}

/// Top-level entry point consumed by the presentation layer.
pub struct ShorthandResolver {
    matcher: SuggestionMatcher,
    workflow: ResolutionWorkflow,
    stats: EntityStatsService,
    cache: Arc<SharedCache>,
    change_listener: Option<JoinHandle<()>>,
}

impl ShorthandResolver {
    pub fn new(
        lookup: Arc<dyn FeatureLookup>,
        attacher: Arc<dyn FeatureAttacher>,
        stats_lookup: Arc<dyn EntityStatsLookup>,
        config: ResolverConfig,
    ) -> Self {
        let cache = Arc::new(SharedCache::new());
        let cache_ttl = Duration::from_millis(config.cache_ttl_ms);

        let matcher = SuggestionMatcher::new(Arc::clone(&lookup), Arc::clone(&cache), &config);
        let canonicalizer = Canonicalizer::new(lookup, Arc::clone(&cache), cache_ttl);
        let workflow = ResolutionWorkflow::new(canonicalizer, attacher);
        let stats = EntityStatsService::new(stats_lookup, Arc::clone(&cache), cache_ttl);

        Self {
            matcher,
            workflow,
            stats,
            cache,
            change_listener: None,
        }
    }

    /// Suggest canonical features for partial input. See
    /// [`SuggestionMatcher::suggest`] for debounce and supersession rules.
    pub async fn suggest(
        &self,
        partial: &str,
        limit: usize,
    ) -> Result<SuggestOutcome, ResolveError> {
        self.matcher.suggest(partial, limit).await
    }

    /// Resolve raw shorthand and attach recognized features to the target
    /// entity, returning the per-token report in input order.
    pub async fn resolve(&self, raw_input: &str, target_entity_id: Uuid) -> Vec<ResolvedToken> {
        self.workflow.resolve(raw_input, target_entity_id).await
    }

    /// Cached aggregate statistics for an entity.
    pub async fn entity_stats(&self, entity_id: Uuid) -> Result<EntityStats, ResolveError> {
        self.stats.entity_stats(entity_id).await
    }

    /// Handle to the shared cache, for diagnostics and explicit
    /// invalidation by the hosting process.
    pub fn cache(&self) -> Arc<SharedCache> {
        Arc::clone(&self.cache)
    }

    /// Start consuming change notifications, invalidating cache entries by
    /// key prefix per event. Replaces any previous subscription.
    pub fn subscribe_changes(&mut self, mut events: UnboundedReceiver<ChangeEvent>) {
        self.shutdown();
        let cache = Arc::clone(&self.cache);
        self.change_listener = Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                for prefix in invalidation_prefixes(&event.entity_class) {
                    cache.invalidate_prefix(prefix);
                }
                debug!(class = %event.entity_class, "cache invalidated for change event");
            }
        }));
    }

    /// Stop the change-notification listener, if one is running.
    pub fn shutdown(&mut self) {
        if let Some(listener) = self.change_listener.take() {
            listener.abort();
        }
    }
}

impl Drop for ShorthandResolver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Key prefixes a change to the given entity class makes stale.
///
/// Coarse by design: events carry no dependent-key set, so invalidation
/// over-approximates by namespace. A feature-registry change stales both
/// suggestion and canonical lookups; an entity write stales its stats.
/// Classes with no cache namespace are ignored.
fn invalidation_prefixes(entity_class: &str) -> &'static [&'static str] {
    match entity_class {
        "feature" => &["search:", "canonical:"],
        "disease" | "entity" => &["stats:"],
        _ => &[],
    }
}
