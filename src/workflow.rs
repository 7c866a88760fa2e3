//! Resolution workflow: shorthand in, per-token resolution report out.
//!
//! Composes the tokenizer with cached canonicalization and attach calls.
//! Partial success is the normal case for free-text clinical shorthand, so
//! every token comes back in input order with its own outcome — the workflow
//! never discards information about which tokens failed and why, and no
//! single failure aborts the batch.
//!
//! Tokens run strictly sequentially: the attach collaborator is not assumed
//! safe under concurrent writes to one entity, and sequential execution
//! keeps the report trivially ordered by input position.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::canonicalizer::Canonicalizer;
use crate::error::ResolveError;
use crate::lookup::FeatureAttacher;
use crate::tokenizer::{tokenize, Token};
use crate::types::AttachAttributes;

// ---------------------------------------------------------------------------
// ResolvedToken
// ---------------------------------------------------------------------------

/// A token enriched with its resolution outcome.
///
/// A token with no canonical reference is unresolved and is surfaced to the
/// caller for manual handling; it is never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedToken {
    pub token: Token,
    pub canonical_feature_id: Option<Uuid>,
    pub canonical_name: Option<String>,
    /// Whether the feature was successfully linked to the target entity.
    pub attached: bool,
    /// Set when the registry answered with zero matches — the feature does
    /// not exist yet and the user may create it by hand.
    pub needs_manual_creation: bool,
    /// Error note for a failed lookup or attach. Retryable failures land
    /// here rather than aborting the batch.
    pub error: Option<String>,
}

impl ResolvedToken {
    fn unresolved(token: Token) -> Self {
        Self {
            token,
            canonical_feature_id: None,
            canonical_name: None,
            attached: false,
            needs_manual_creation: false,
            error: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.canonical_feature_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// ResolutionWorkflow
// ---------------------------------------------------------------------------

pub struct ResolutionWorkflow {
    canonicalizer: Canonicalizer,
    attacher: Arc<dyn FeatureAttacher>,
}

impl ResolutionWorkflow {
    pub fn new(canonicalizer: Canonicalizer, attacher: Arc<dyn FeatureAttacher>) -> Self {
        Self {
            canonicalizer,
            attacher,
        }
    }

    /// Resolve raw shorthand against the registry and attach each recognized
    /// feature to `target_entity_id`.
    ///
    /// Returns one [`ResolvedToken`] per input token, in input order,
    /// successes and failures interleaved. Empty or whitespace-only input
    /// returns an empty vec without side effects.
    pub async fn resolve(&self, raw_input: &str, target_entity_id: Uuid) -> Vec<ResolvedToken> {
        let tokens = tokenize(raw_input);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut report = Vec::with_capacity(tokens.len());
        for token in tokens {
            report.push(self.resolve_one(token, target_entity_id).await);
        }
        report
    }

    async fn resolve_one(&self, token: Token, target_entity_id: Uuid) -> ResolvedToken {
        // Sign-only or glyph-only fragment: nothing to look up.
        if token.clean_text.is_empty() {
            return ResolvedToken::unresolved(token);
        }

        let feature = match self.canonicalizer.canonicalize(&token.clean_text).await {
            Ok(Some(feature)) => feature,
            Ok(None) => {
                debug!(clean_text = %token.clean_text, "no canonical match, needs manual creation");
                let mut resolved = ResolvedToken::unresolved(token);
                resolved.needs_manual_creation = true;
                return resolved;
            }
            Err(err) => {
                warn!(clean_text = %token.clean_text, %err, "canonical lookup failed");
                let mut resolved = ResolvedToken::unresolved(token);
                resolved.error = Some(err.to_string());
                return resolved;
            }
        };

        let attrs = AttachAttributes {
            present: token.is_present,
            display_value: token.display_value(),
        };
        let mut resolved = ResolvedToken {
            canonical_feature_id: Some(feature.id),
            canonical_name: Some(feature.name.clone()),
            attached: false,
            needs_manual_creation: false,
            error: None,
            token,
        };

        match self
            .attacher
            .attach_feature(target_entity_id, feature.id, attrs)
            .await
        {
            Ok(record) => {
                debug!(feature = %feature.name, record_id = %record.id, "feature attached");
                resolved.attached = true;
            }
            Err(err) => {
                warn!(feature = %feature.name, %err, "attach failed");
                resolved.error = Some(err.to_string());
            }
        }
        resolved
    }
}
