//! Error types for shorthand resolution.
//!
//! Failures are captured at token granularity by the resolution workflow and
//! returned as data; nothing here crosses the `resolve` boundary as a panic
//! or a batch-level abort.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced while resolving shorthand against the feature registry.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The external lookup service errored or timed out. Transient and
    /// retryable; callers treat this as "no result for now", never fatal.
    #[error("lookup service unavailable: {0}")]
    LookupUnavailable(String),

    /// The write linking a canonical feature to the target entity failed.
    /// Recorded on the affected token; remaining tokens still run.
    #[error("attach failed for feature {feature_id}: {reason}")]
    AttachFailed { feature_id: Uuid, reason: String },
}

impl ResolveError {
    /// Shorthand for wrapping a transport-layer failure.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ResolveError::LookupUnavailable(reason.into())
    }
}
