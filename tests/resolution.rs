//! End-to-end resolution scenarios through the `ShorthandResolver` facade,
//! with recording mock collaborators standing in for the registry services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use clin_shorthand::lookup::{EntityStatsLookup, FeatureAttacher, FeatureLookup};
use clin_shorthand::{
    AttachAttributes, AttachedFeature, CanonicalFeature, ChangeEvent, EntityStats, FeatureType,
    MatchType, ResolveError, ResolverConfig, ShorthandResolver, SuggestOutcome, Suggestion,
};

// ---------------------------------------------------------------------------
// Mock registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockRegistry {
    features: Vec<CanonicalFeature>,
    suggestion_calls: AtomicUsize,
    canonical_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    attach_calls: Mutex<Vec<(Uuid, AttachAttributes)>>,
    fail_attach_for: Option<Uuid>,
    fail_canonical_for: Option<String>,
}

impl MockRegistry {
    fn with_features(names: &[&str]) -> Self {
        Self {
            features: names
                .iter()
                .map(|name| CanonicalFeature {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    feature_type: FeatureType::Symptom,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn feature_id(&self, name: &str) -> Uuid {
        self.features.iter().find(|f| f.name == name).unwrap().id
    }
}

#[async_trait]
impl FeatureLookup for MockRegistry {
    async fn lookup_suggestions(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>, ResolveError> {
        self.suggestion_calls.fetch_add(1, Ordering::SeqCst);
        let mut matched: Vec<Suggestion> = self
            .features
            .iter()
            .filter(|f| f.name.to_lowercase().starts_with(&term.to_lowercase()))
            .map(|f| Suggestion {
                id: f.id,
                name: f.name.clone(),
                feature_type: f.feature_type,
                match_type: MatchType::Exact,
                matched_alias: None,
            })
            .collect();
        matched.truncate(limit);
        Ok(matched)
    }

    async fn lookup_canonical(
        &self,
        text: &str,
    ) -> Result<Option<CanonicalFeature>, ResolveError> {
        self.canonical_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_canonical_for.as_deref() == Some(text) {
            return Err(ResolveError::unavailable("registry timeout"));
        }
        Ok(self.features.iter().find(|f| f.name == text).cloned())
    }
}

#[async_trait]
impl FeatureAttacher for MockRegistry {
    async fn attach_feature(
        &self,
        entity_id: Uuid,
        feature_id: Uuid,
        attrs: AttachAttributes,
    ) -> Result<AttachedFeature, ResolveError> {
        self.attach_calls.lock().unwrap().push((feature_id, attrs));
        if self.fail_attach_for == Some(feature_id) {
            return Err(ResolveError::AttachFailed {
                feature_id,
                reason: "write rejected".to_string(),
            });
        }
        Ok(AttachedFeature {
            id: Uuid::new_v4(),
            entity_id,
            feature_id,
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl EntityStatsLookup for MockRegistry {
    async fn lookup_stats(&self, entity_id: Uuid) -> Result<EntityStats, ResolveError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        Ok(EntityStats {
            entity_id,
            feature_count: self.attach_calls.lock().unwrap().len(),
            pathognomonic_count: 0,
            updated_at: Utc::now(),
        })
    }
}

fn resolver(registry: &Arc<MockRegistry>) -> ShorthandResolver {
    ShorthandResolver::new(
        Arc::clone(registry) as Arc<dyn FeatureLookup>,
        Arc::clone(registry) as Arc<dyn FeatureAttacher>,
        Arc::clone(registry) as Arc<dyn EntityStatsLookup>,
        ResolverConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Resolution scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_success_reports_every_token_in_input_order() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea", "Murmur"]));
    let resolver = resolver(&registry);

    let report = resolver
        .resolve("+Dyspnea Nonexistium -Murmur", Uuid::new_v4())
        .await;

    assert_eq!(report.len(), 3);
    assert_eq!(report[0].token.clean_text, "Dyspnea");
    assert_eq!(report[1].token.clean_text, "Nonexistium");
    assert_eq!(report[2].token.clean_text, "Murmur");

    assert!(report[0].attached);
    assert!(report[1].needs_manual_creation);
    assert!(!report[1].attached);
    assert!(report[2].attached);
    assert!(!report[2].token.is_present);
}

#[tokio::test]
async fn one_resolvable_one_unresolvable_attaches_exactly_one() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea"]));
    let resolver = resolver(&registry);

    let report = resolver.resolve("Dyspnea Mystery", Uuid::new_v4()).await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.iter().filter(|r| r.attached).count(), 1);
}

#[tokio::test]
async fn attach_failure_does_not_terminate_the_batch() {
    let mut registry = MockRegistry::with_features(&["Dyspnea", "Murmur", "Ferritin"]);
    registry.fail_attach_for = Some(registry.feature_id("Dyspnea"));
    let registry = Arc::new(registry);
    let resolver = resolver(&registry);

    let report = resolver
        .resolve("Dyspnea Murmur Ferritin", Uuid::new_v4())
        .await;

    assert!(!report[0].attached);
    assert!(report[0].error.is_some());
    assert!(report[1].attached);
    assert!(report[2].attached);
    assert_eq!(
        registry.attach_calls.lock().unwrap().len(),
        3,
        "every token still attempted its attach"
    );
}

#[tokio::test]
async fn lookup_outage_is_not_mistaken_for_a_missing_feature() {
    let mut registry = MockRegistry::with_features(&["Murmur"]);
    registry.fail_canonical_for = Some("Dyspnea".to_string());
    let registry = Arc::new(registry);
    let resolver = resolver(&registry);

    let report = resolver.resolve("Dyspnea Absentium", Uuid::new_v4()).await;

    // Transport failure: retryable, carries the error, no manual creation.
    assert!(report[0].error.is_some());
    assert!(!report[0].needs_manual_creation);
    // Clean zero-match: manual creation, no error.
    assert!(report[1].error.is_none());
    assert!(report[1].needs_manual_creation);
}

#[tokio::test]
async fn repeated_resolve_reuses_cached_canonical_lookups() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea"]));
    let resolver = resolver(&registry);
    let entity = Uuid::new_v4();

    resolver.resolve("Dyspnea", entity).await;
    resolver.resolve("Dyspnea", entity).await;

    assert_eq!(registry.canonical_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        registry.attach_calls.lock().unwrap().len(),
        2,
        "attach is a write and must not be deduplicated by the cache"
    );
}

// ---------------------------------------------------------------------------
// Suggestion scenarios
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn facade_suggest_caches_and_passes_order_through() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea", "Dysphagia"]));
    let resolver = resolver(&registry);

    let first = resolver.suggest("dys", 10).await.unwrap().delivered().unwrap();
    let names: Vec<&str> = first.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Dyspnea", "Dysphagia"], "service order preserved");

    let second = resolver.suggest("dys", 10).await.unwrap().delivered().unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.suggestion_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_deliver_only_the_last_result() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea"]));
    let resolver = Arc::new(resolver(&registry));

    let stale = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.suggest("dy", 10).await })
    };
    tokio::task::yield_now().await;

    let fresh = resolver.suggest("dys", 10).await.unwrap();
    let stale = stale.await.unwrap().unwrap();

    assert_eq!(stale, SuggestOutcome::Superseded);
    assert!(matches!(fresh, SuggestOutcome::Delivered(_)));
    assert_eq!(registry.suggestion_calls.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Change-notification invalidation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn entity_change_invalidates_stats_but_not_lookup_caches() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea"]));
    let mut resolver = resolver(&registry);
    let entity = Uuid::new_v4();

    let (tx, rx) = mpsc::unbounded_channel::<ChangeEvent>();
    resolver.subscribe_changes(rx);

    resolver.resolve("Dyspnea", entity).await; // fills canonical:
    resolver.entity_stats(entity).await.unwrap(); // fills stats:

    tx.send(ChangeEvent {
        entity_class: "disease".to_string(),
        entity_id: Some(entity),
    })
    .unwrap();
    tokio::task::yield_now().await;

    resolver.entity_stats(entity).await.unwrap();
    assert_eq!(
        registry.stats_calls.load(Ordering::SeqCst),
        2,
        "stats cache was invalidated"
    );

    resolver.resolve("Dyspnea", entity).await;
    assert_eq!(
        registry.canonical_calls.load(Ordering::SeqCst),
        1,
        "canonical cache untouched by a disease change"
    );
}

#[tokio::test]
async fn feature_change_invalidates_lookup_caches() {
    let registry = Arc::new(MockRegistry::with_features(&["Dyspnea"]));
    let mut resolver = resolver(&registry);
    let entity = Uuid::new_v4();

    let (tx, rx) = mpsc::unbounded_channel::<ChangeEvent>();
    resolver.subscribe_changes(rx);

    resolver.resolve("Dyspnea", entity).await;
    tx.send(ChangeEvent {
        entity_class: "feature".to_string(),
        entity_id: None,
    })
    .unwrap();
    tokio::task::yield_now().await;

    resolver.resolve("Dyspnea", entity).await;
    assert_eq!(registry.canonical_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn shutdown_stops_the_change_listener() {
    let registry = Arc::new(MockRegistry::with_features(&[]));
    let mut resolver = resolver(&registry);
    let cache = resolver.cache();

    let (tx, rx) = mpsc::unbounded_channel::<ChangeEvent>();
    resolver.subscribe_changes(rx);
    resolver.shutdown();

    cache.set(
        "stats:sentinel".to_string(),
        clin_shorthand::cache::CachedValue::Stats(EntityStats {
            entity_id: Uuid::new_v4(),
            feature_count: 0,
            pathognomonic_count: 0,
            updated_at: Utc::now(),
        }),
        tokio::time::Duration::from_secs(300),
    );

    tx.send(ChangeEvent {
        entity_class: "disease".to_string(),
        entity_id: None,
    })
    .unwrap();
    tokio::task::yield_now().await;

    assert!(
        cache.get("stats:sentinel").is_some(),
        "listener is gone, the event no longer invalidates"
    );
}
