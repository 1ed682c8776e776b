//! Closure–scope tension detection.
//!
//! Operational closure and broad scope pull in opposite directions; an
//! entity scoring high on both is in tension with the closure-scope axiom.
//! Domains marked tension-exempt (living systems) are skipped — for them
//! the combination is the normal condition.

use crate::analysis::traits::GapDetector;
use crate::analysis::types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapType, Severity, SuggestedAction,
};

pub struct TensionDetector;

impl GapDetector for TensionDetector {
    fn id(&self) -> &str {
        "closure-scope-tension"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError> {
        let threshold = snapshot.config.tension_threshold;
        let mut gaps = Vec::new();

        for entity in snapshot.entities {
            if entity.domain.tension_exempt() {
                continue;
            }
            let closure = entity.config.closure;
            let scope = entity.config.scope;
            if closure <= threshold || scope <= threshold {
                continue;
            }

            gaps.push(
                Gap::new(
                    GapType::RuleTension,
                    Severity::Low,
                    format!(
                        "entity '{}' scores high on both closure ({:.2}) and scope ({:.2})",
                        entity.id, closure, scope
                    ),
                    SuggestedAction::ManualReview {
                        reason: "closure-scope tension; confirm the descriptors or the domain"
                            .to_string(),
                    },
                )
                .with_confidence(0.6)
                .with_evidence(
                    Evidence::new("closure", closure, threshold).for_entity(entity.id.clone()),
                )
                .with_evidence(
                    Evidence::new("scope", scope, threshold).for_entity(entity.id.clone()),
                ),
            );
        }

        Ok(gaps)
    }
}
