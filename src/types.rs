//! Boundary types shared with the lookup and attach collaborators.
//!
//! Everything here is serde-derived: the presentation layer consumes these
//! records directly, and collaborator implementations serialize them over
//! whatever transport they use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of clinical feature a canonical entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Symptom,
    Sign,
    Lab,
    Imaging,
    Criterion,
    Pathognomonic,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Symptom => "symptom",
            FeatureType::Sign => "sign",
            FeatureType::Lab => "lab",
            FeatureType::Imaging => "imaging",
            FeatureType::Criterion => "criterion",
            FeatureType::Pathognomonic => "pathognomonic",
        }
    }
}

/// How the lookup service matched a suggestion to the queried text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Alias,
    Fuzzy,
}

/// A candidate canonical feature returned by the lookup service.
///
/// Order and content are whatever the service returned — ranking lives on
/// the service side and the matcher passes results through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub name: String,
    pub feature_type: FeatureType,
    pub match_type: MatchType,
    /// The alias that matched, when `match_type` is `Alias`.
    pub matched_alias: Option<String>,
}

/// The single authoritative identity a shorthand token resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFeature {
    pub id: Uuid,
    pub name: String,
    pub feature_type: FeatureType,
}

/// Attributes derived from a token when attaching its feature to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachAttributes {
    /// Presence flag from the token's sign prefix.
    pub present: bool,
    /// The directional glyph or comparison rendered back as display text
    /// (`"↓"`, `"<80"`), empty when the token carried no modifier.
    pub display_value: String,
}

/// Record returned by a successful attach call.
///
/// Typicality/weight defaults are assigned by the attach collaborator, not
/// by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedFeature {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub feature_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Aggregate feature statistics for a clinical entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    pub entity_id: Uuid,
    pub feature_count: usize,
    pub pathognomonic_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// External change notification, used only to drive coarse cache
/// invalidation by key prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Class of entity that changed, e.g. `"feature"` or `"disease"`.
    pub entity_class: String,
    pub entity_id: Option<Uuid>,
}
