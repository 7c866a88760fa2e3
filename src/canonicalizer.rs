//! Canonical-feature resolution with a short-lived result cache.
//!
//! Resolves a token's clean text to the single authoritative feature
//! identity. Two outcomes are deliberately kept apart: `Ok(None)` means the
//! registry answered and holds no match (the token goes to manual creation),
//! `Err(LookupUnavailable)` means the registry could not answer (the token
//! stays retryable). Zero-match results are cached like hits.

use std::sync::Arc;

use tokio::time::Duration;
use tracing::debug;

use crate::cache::{CachedValue, SharedCache};
use crate::error::ResolveError;
use crate::lookup::FeatureLookup;
use crate::types::CanonicalFeature;

pub struct Canonicalizer {
    lookup: Arc<dyn FeatureLookup>,
    cache: Arc<SharedCache>,
    cache_ttl: Duration,
}

impl Canonicalizer {
    pub fn new(lookup: Arc<dyn FeatureLookup>, cache: Arc<SharedCache>, cache_ttl: Duration) -> Self {
        Self {
            lookup,
            cache,
            cache_ttl,
        }
    }

    /// Resolve clean token text to its canonical feature, if the registry
    /// knows one.
    pub async fn canonicalize(
        &self,
        clean_text: &str,
    ) -> Result<Option<CanonicalFeature>, ResolveError> {
        let key = format!("canonical:{clean_text}");
        if let Some(CachedValue::Canonical(hit)) = self.cache.get(&key) {
            debug!(clean_text, "canonical cache hit");
            return Ok(hit);
        }

        let found = self.lookup.lookup_canonical(clean_text).await?;
        self.cache
            .set(key, CachedValue::Canonical(found.clone()), self.cache_ttl);
        debug!(clean_text, matched = found.is_some(), "canonical lookup");
        Ok(found)
    }
}
