//! Debounced, cached suggestion matching for incremental input.
//!
//! Each keystroke becomes a `suggest` call; only the last call of a rapid
//! burst may reach the lookup service, and only its result may reach the
//! caller. Supersession is a generation counter rather than timer callbacks:
//! issuing a new request atomically marks every pending request for this
//! matcher stale, and stale requests resolve to [`SuggestOutcome::Superseded`]
//! without delivering anything. In-flight transport calls are not aborted;
//! their results are discarded before delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::cache::{CachedValue, SharedCache};
use crate::error::ResolveError;
use crate::lookup::FeatureLookup;
use crate::service::ResolverConfig;
use crate::types::Suggestion;

/// Outcome of one `suggest` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestOutcome {
    /// This call's result, in the exact order the lookup service returned.
    Delivered(Vec<Suggestion>),
    /// A newer call arrived while this one was pending; nothing is
    /// delivered. Not an error — the newer call carries the answer.
    Superseded,
}

impl SuggestOutcome {
    /// The delivered suggestions, if any were.
    pub fn delivered(self) -> Option<Vec<Suggestion>> {
        match self {
            SuggestOutcome::Delivered(suggestions) => Some(suggestions),
            SuggestOutcome::Superseded => None,
        }
    }
}

/// Incremental suggestion matcher over one logical input stream.
pub struct SuggestionMatcher {
    lookup: Arc<dyn FeatureLookup>,
    cache: Arc<SharedCache>,
    debounce: Duration,
    cache_ttl: Duration,
    min_partial_len: usize,
    generation: AtomicU64,
}

impl SuggestionMatcher {
    pub fn new(
        lookup: Arc<dyn FeatureLookup>,
        cache: Arc<SharedCache>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            lookup,
            cache,
            debounce: Duration::from_millis(config.debounce_ms),
            cache_ttl: Duration::from_millis(config.cache_ttl_ms),
            min_partial_len: config.min_partial_len,
            generation: AtomicU64::new(0),
        }
    }

    /// Suggest canonical features for a partial word.
    ///
    /// Below the minimum partial length the lookup service is not queried at
    /// all (a guard against noisy low-selectivity queries) and an empty
    /// delivery comes back immediately. Cache hits bypass both the lookup
    /// and the debounce window. Transport failure is
    /// [`ResolveError::LookupUnavailable`]; callers treat it as "no
    /// suggestions", never as fatal.
    pub async fn suggest(
        &self,
        partial: &str,
        limit: usize,
    ) -> Result<SuggestOutcome, ResolveError> {
        if partial.chars().count() < self.min_partial_len {
            return Ok(SuggestOutcome::Delivered(Vec::new()));
        }

        // Every eligible call supersedes whatever is pending, even when it
        // can answer from cache.
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let key = format!("search:{partial}:{limit}");
        if let Some(CachedValue::Suggestions(hit)) = self.cache.get(&key) {
            debug!(partial, limit, "suggestion cache hit");
            return Ok(SuggestOutcome::Delivered(hit));
        }

        sleep(self.debounce).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(partial, "suggest call superseded during debounce");
            return Ok(SuggestOutcome::Superseded);
        }

        let suggestions = self.lookup.lookup_suggestions(partial, limit).await?;
        self.cache.set(
            key,
            CachedValue::Suggestions(suggestions.clone()),
            self.cache_ttl,
        );

        // A newer call may have started while the lookup was in flight; its
        // answer wins, this one is never delivered.
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(partial, "suggest result discarded, superseded in flight");
            return Ok(SuggestOutcome::Superseded);
        }

        debug!(partial, count = suggestions.len(), "suggestions delivered");
        Ok(SuggestOutcome::Delivered(suggestions))
    }
}
