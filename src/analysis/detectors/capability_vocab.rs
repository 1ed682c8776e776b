//! Capability-vocabulary gap detection.
//!
//! Mirrors the relation-vocabulary tally: capability names outside the
//! canonical per-stratum sets that recur across entities become
//! capability-missing gaps with a generate-capability suggestion anchored
//! at the carriers' stratum.

use crate::analysis::traits::GapDetector;
use crate::analysis::types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapType, Severity, SuggestedAction,
};
use crate::taxonomy::{EntityId, Stratum};
use std::collections::BTreeMap;

pub struct CapabilityVocabDetector;

fn is_canonical(name: &str) -> bool {
    Stratum::ORDER
        .iter()
        .any(|s| s.capabilities().contains(&name))
}

impl GapDetector for CapabilityVocabDetector {
    fn id(&self) -> &str {
        "capability-vocab"
    }

    fn priority(&self) -> u32 {
        25
    }

    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError> {
        // name -> (carriers, highest stratum seen among carriers)
        let mut unknown: BTreeMap<&str, (Vec<EntityId>, Option<Stratum>)> = BTreeMap::new();

        for entity in snapshot.entities {
            let height = entity.config.strata.highest_active();
            for capability in &entity.config.capabilities {
                if is_canonical(capability) {
                    continue;
                }
                let entry = unknown.entry(capability.as_str()).or_default();
                entry.0.push(entity.id.clone());
                entry.1 = match (entry.1, height) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
            }
        }

        let threshold = snapshot.config.capability_min_occurrences;
        let gaps = unknown
            .into_iter()
            .filter(|(_, (carriers, _))| carriers.len() >= threshold)
            .map(|(name, (carriers, height))| {
                let count = carriers.len();
                let emerges_at = height.unwrap_or(Stratum::Matter);
                let mut gap = Gap::new(
                    GapType::CapabilityMissing,
                    Severity::Medium,
                    format!(
                        "capability '{}' appears on {} entities but is not in the canonical set",
                        name, count
                    ),
                    SuggestedAction::GenerateCapability {
                        name_hint: name.to_string(),
                        description: format!(
                            "recurring capability observed on {} classified entities",
                            count
                        ),
                        emerges_at,
                    },
                )
                .with_confidence(0.75);
                for carrier in carriers.iter().take(5) {
                    gap = gap.with_evidence(
                        Evidence::new("capability_occurrences", count as f64, threshold as f64)
                            .for_entity(carrier.clone())
                            .with_context(format!("carries '{}'", name)),
                    );
                }
                gap
            })
            .collect();

        Ok(gaps)
    }
}
