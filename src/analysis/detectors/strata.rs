//! Stratum-boundary detection.
//!
//! Two distinct findings come out of the strata flags:
//! - a broken nesting (a higher stratum active while a lower one is not)
//!   violates the strict nesting axiom and is a critical rule tension,
//!   routed to manual axiom review — never to auto-generation;
//! - an unusual-but-legal shape (no strata at all, or a stratum height
//!   implausible for the declared domain) is a non-fatal stratum-boundary
//!   gap for manual review.

use crate::analysis::traits::GapDetector;
use crate::analysis::types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapType, Severity, SuggestedAction,
};
use crate::taxonomy::{AxiomId, Domain, Entity, Stratum};

pub struct StrataDetector;

/// Highest stratum that is unsurprising for a domain. Anything above it is
/// a boundary case worth human eyes, not an axiom violation.
fn plausible_height(domain: Domain) -> Stratum {
    match domain {
        Domain::Inorganic => Stratum::Matter,
        Domain::Artifact => Stratum::Matter,
        Domain::Living => Stratum::Logos,
        Domain::Institution => Stratum::Logos,
        Domain::Symbolic => Stratum::Matter,
    }
}

fn nesting_violation(entity: &Entity) -> Gap {
    let active: Vec<String> = entity
        .config
        .strata
        .active()
        .iter()
        .map(|s| s.to_string())
        .collect();
    Gap::new(
        GapType::RuleTension,
        Severity::Critical,
        format!(
            "entity '{}' has strata {{{}}} — a higher stratum is active while a lower one is not",
            entity.id,
            active.join(", ")
        ),
        SuggestedAction::AxiomReview {
            axioms: vec![AxiomId::new("A3")],
            reason: "strict stratum nesting is broken; the axiom or the entity record needs review"
                .to_string(),
        },
    )
    .with_evidence(
        Evidence::new("strata_contiguity", 0.0, 1.0)
            .for_entity(entity.id.clone())
            .with_context("active strata do not form a contiguous prefix"),
    )
}

fn boundary_gap(entity: &Entity, reason: &str) -> Gap {
    Gap::new(
        GapType::StratumBoundary,
        Severity::Medium,
        format!("entity '{}': {}", entity.id, reason),
        SuggestedAction::ManualReview {
            reason: reason.to_string(),
        },
    )
    .with_confidence(0.7)
    .with_evidence(
        Evidence::new("stratum_height", entity.config.strata.active().len() as f64, 0.0)
            .for_entity(entity.id.clone())
            .with_context(format!("declared domain: {}", entity.domain)),
    )
}

impl GapDetector for StrataDetector {
    fn id(&self) -> &str {
        "strata"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError> {
        let mut gaps = Vec::new();

        for entity in snapshot.entities {
            let strata = &entity.config.strata;

            if !strata.is_contiguous() {
                gaps.push(nesting_violation(entity));
                continue;
            }

            match strata.highest_active() {
                None => {
                    gaps.push(boundary_gap(entity, "no stratum is active at all"));
                }
                Some(height) if height > plausible_height(entity.domain) => {
                    gaps.push(boundary_gap(
                        entity,
                        &format!(
                            "stratum '{}' is unusual for a {} entity",
                            height, entity.domain
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(gaps)
    }
}
