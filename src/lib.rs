//! Clinical shorthand tokenization and canonical-feature resolution.
//!
//! A clinician types free-form shorthand describing clinical features:
//!
//! ```text
//! +Dyspnea -Murmur Ferritin↓ MCV<80
//! ```
//!
//! This crate decomposes that text into typed tokens, matches partial words
//! against a canonical feature registry with debounced suggestions, and runs
//! the resolution workflow that links recognized features to a target
//! clinical entity — reporting per-token success, zero-match, and failure
//! without ever dropping a token.
//!
//! The registry itself (search, CRUD, statistics) is an external
//! collaborator behind the [`lookup`] traits; interactive latency is kept
//! low by the bounded-lifetime [`cache`] those components share.
//!
//! ## Quick start
//!
//! Tokenization is pure and needs no collaborators:
//!
//! ```
//! use clin_shorthand::tokenizer::{tokenize, ValueModifier};
//!
//! let tokens = tokenize("+Dyspnea MCV<80");
//! assert_eq!(tokens[0].clean_text, "Dyspnea");
//! assert!(tokens[0].is_present);
//! assert_eq!(tokens[1].modifier.numeric_value(), Some(80));
//! assert_eq!(tokens[1].modifier, ValueModifier::Cmp {
//!     op: clin_shorthand::tokenizer::CmpOp::Lt,
//!     value: 80,
//! });
//! ```
//!
//! The full workflow is driven through [`service::ShorthandResolver`],
//! constructed with the collaborator implementations of the hosting process.

// Core error handling
pub mod error;

// Boundary types shared with collaborators and the presentation layer
pub mod types;

// Pure shorthand tokenizer
pub mod tokenizer;

// Bounded-lifetime cache shared by the lookup-facing components
pub mod cache;

// Collaborator contracts for the external feature registry
pub mod lookup;

// Incremental suggestion matching
pub mod matcher;

// Canonical-feature resolution
pub mod canonicalizer;

// Resolution workflow
pub mod workflow;

// Cached entity statistics
pub mod stats;

// Owning facade and configuration
pub mod service;

pub use error::ResolveError;
pub use matcher::SuggestOutcome;
pub use service::{ResolverConfig, ShorthandResolver};
pub use tokenizer::{tokenize, CmpOp, Token, ValueModifier};
pub use types::{
    AttachAttributes, AttachedFeature, CanonicalFeature, ChangeEvent, EntityStats, FeatureType,
    MatchType, Suggestion,
};
pub use workflow::ResolvedToken;
