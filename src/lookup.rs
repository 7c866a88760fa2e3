//! Collaborator contracts for the external feature registry.
//!
//! The backing services (full-text search, disease CRUD, statistics) are out
//! of scope; these traits are the seams they plug into. Contracts are pure
//! service interfaces — no session state, no caching (callers layer that on
//! top), which keeps implementations swappable and mock-first testable.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ResolveError;
use crate::types::{AttachAttributes, AttachedFeature, CanonicalFeature, EntityStats, Suggestion};

/// Read-side lookups against the canonical feature registry.
#[async_trait]
pub trait FeatureLookup: Send + Sync {
    /// Ranked suggestion candidates for a partial word. Ranking and ordering
    /// are entirely the service's; implementations must not reorder.
    async fn lookup_suggestions(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>, ResolveError>;

    /// Resolve clean token text to its canonical feature identity.
    ///
    /// `Ok(None)` is a normal zero-match outcome, distinct from
    /// `Err(LookupUnavailable)` — callers must not conflate the two.
    async fn lookup_canonical(&self, text: &str)
        -> Result<Option<CanonicalFeature>, ResolveError>;
}

/// Write-side collaborator linking a canonical feature to a clinical entity.
///
/// Not assumed safe under concurrent writes to the same entity; the
/// resolution workflow serializes its attach calls per invocation.
#[async_trait]
pub trait FeatureAttacher: Send + Sync {
    async fn attach_feature(
        &self,
        entity_id: Uuid,
        feature_id: Uuid,
        attrs: AttachAttributes,
    ) -> Result<AttachedFeature, ResolveError>;
}

/// Aggregate statistics lookups for a clinical entity.
#[async_trait]
pub trait EntityStatsLookup: Send + Sync {
    async fn lookup_stats(&self, entity_id: Uuid) -> Result<EntityStats, ResolveError>;
}
