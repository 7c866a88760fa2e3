//! Offline shorthand debugging tool.
//!
//! Resolves shorthand from the command line against a small in-memory
//! feature registry and prints the per-token report. Useful for eyeballing
//! tokenizer and workflow behavior without a live registry:
//!
//! ```text
//! cargo run --bin shorthand -- "+Dyspnea -Murmur Ferritin↓ MCV<80"
//! ```

use std::collections::HashMap;
use std::env;
use std::process;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use clin_shorthand::lookup::{EntityStatsLookup, FeatureAttacher, FeatureLookup};
use clin_shorthand::{
    AttachAttributes, AttachedFeature, CanonicalFeature, EntityStats, FeatureType, MatchType,
    ResolveError, ResolverConfig, ShorthandResolver, Suggestion,
};

/// In-memory stand-in for the real registry services.
struct DemoRegistry {
    features: Vec<CanonicalFeature>,
    aliases: HashMap<String, String>,
    attached: Mutex<Vec<AttachedFeature>>,
}

impl DemoRegistry {
    fn seeded() -> Self {
        let features = vec![
            canonical("Dyspnea", FeatureType::Symptom),
            canonical("Murmur", FeatureType::Sign),
            canonical("Ferritin", FeatureType::Lab),
            canonical("MCV", FeatureType::Lab),
            canonical("Splenomegaly", FeatureType::Sign),
            canonical("Koplik spots", FeatureType::Pathognomonic),
        ];
        let aliases = HashMap::from([
            ("SOB".to_string(), "Dyspnea".to_string()),
            ("ferr".to_string(), "Ferritin".to_string()),
        ]);
        Self {
            features,
            aliases,
            attached: Mutex::new(Vec::new()),
        }
    }

    fn find(&self, name: &str) -> Option<&CanonicalFeature> {
        let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.features
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

fn canonical(name: &str, feature_type: FeatureType) -> CanonicalFeature {
    CanonicalFeature {
        id: Uuid::new_v4(),
        name: name.to_string(),
        feature_type,
    }
}

#[async_trait]
impl FeatureLookup for DemoRegistry {
    async fn lookup_suggestions(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>, ResolveError> {
        let term_lower = term.to_lowercase();
        let mut suggestions: Vec<Suggestion> = self
            .features
            .iter()
            .filter(|f| f.name.to_lowercase().starts_with(&term_lower))
            .map(|f| Suggestion {
                id: f.id,
                name: f.name.clone(),
                feature_type: f.feature_type,
                match_type: MatchType::Exact,
                matched_alias: None,
            })
            .collect();
        suggestions.truncate(limit);
        Ok(suggestions)
    }

    async fn lookup_canonical(
        &self,
        text: &str,
    ) -> Result<Option<CanonicalFeature>, ResolveError> {
        Ok(self.find(text).cloned())
    }
}

#[async_trait]
impl FeatureAttacher for DemoRegistry {
    async fn attach_feature(
        &self,
        entity_id: Uuid,
        feature_id: Uuid,
        _attrs: AttachAttributes,
    ) -> Result<AttachedFeature, ResolveError> {
        let record = AttachedFeature {
            id: Uuid::new_v4(),
            entity_id,
            feature_id,
            created_at: Utc::now(),
        };
        self.attached.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl EntityStatsLookup for DemoRegistry {
    async fn lookup_stats(&self, entity_id: Uuid) -> Result<EntityStats, ResolveError> {
        let attached = self.attached.lock().unwrap();
        Ok(EntityStats {
            entity_id,
            feature_count: attached.len(),
            pathognomonic_count: 0,
            updated_at: Utc::now(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} \"<shorthand>\"", args[0]);
        eprintln!("Example: {} \"+Dyspnea -Murmur Ferritin↓ MCV<80\"", args[0]);
        process::exit(1);
    }

    let registry = Arc::new(DemoRegistry::seeded());
    let resolver = ShorthandResolver::new(
        Arc::clone(&registry) as Arc<dyn FeatureLookup>,
        Arc::clone(&registry) as Arc<dyn FeatureAttacher>,
        Arc::clone(&registry) as Arc<dyn EntityStatsLookup>,
        ResolverConfig::default(),
    );

    let entity_id = Uuid::new_v4();
    let report = resolver.resolve(&args[1], entity_id).await;

    println!("Resolved {} token(s) against entity {entity_id}:", report.len());
    for resolved in &report {
        let status = if resolved.attached {
            "attached"
        } else if resolved.needs_manual_creation {
            "unknown feature (manual creation)"
        } else if resolved.error.is_some() {
            "failed"
        } else {
            "skipped"
        };

        let value = resolved.token.display_value();
        let value = if value.is_empty() { "-".to_string() } else { value };
        println!(
            "  {:<16} present={:<5} value={:<5} -> {} {}",
            resolved.token.original_text,
            resolved.token.is_present,
            value,
            resolved
                .canonical_name
                .as_deref()
                .unwrap_or("(unresolved)"),
            status,
        );
        if let Some(err) = &resolved.error {
            println!("      error: {err}");
        }
    }

    let stats = resolver.entity_stats(entity_id).await?;
    println!("Entity now has {} attached feature(s).", stats.feature_count);
    Ok(())
}
