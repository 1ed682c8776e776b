//! Relation-vocabulary gap detection.
//!
//! Tallies relation kinds across the snapshot; kinds outside the known
//! vocabulary that recur often enough become relation-pattern gaps with a
//! generate-relation-type suggestion.

use crate::analysis::traits::GapDetector;
use crate::analysis::types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapType, Severity, SuggestedAction,
};
use crate::taxonomy::KNOWN_RELATION_KINDS;
use std::collections::BTreeMap;

pub struct RelationVocabDetector;

impl GapDetector for RelationVocabDetector {
    fn id(&self) -> &str {
        "relation-vocab"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError> {
        // BTreeMap keeps gap order stable across runs
        let mut unknown: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for entity in snapshot.entities {
            for relation in &entity.config.relations {
                if KNOWN_RELATION_KINDS.contains(&relation.kind.as_str()) {
                    continue;
                }
                unknown
                    .entry(relation.kind.as_str())
                    .or_default()
                    .push(format!("{} -{}-> {}", entity.id, relation.kind, relation.target));
            }
        }

        let threshold = snapshot.config.relation_min_occurrences;
        let gaps = unknown
            .into_iter()
            .filter(|(_, uses)| uses.len() >= threshold)
            .map(|(kind, uses)| {
                let count = uses.len();
                Gap::new(
                    GapType::RelationPattern,
                    Severity::Medium,
                    format!(
                        "relation kind '{}' is used {} times but is not in the known vocabulary",
                        kind, count
                    ),
                    SuggestedAction::GenerateRelationType {
                        name_hint: kind.to_string(),
                        examples: uses.iter().take(3).cloned().collect(),
                    },
                )
                .with_confidence(0.8)
                .with_evidence(
                    Evidence::new("relation_occurrences", count as f64, threshold as f64)
                        .with_context(format!("unknown relation kind '{}'", kind)),
                )
            })
            .collect();

        Ok(gaps)
    }
}
