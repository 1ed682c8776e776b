//! Candidate generation: deterministic, rule-driven synthesis of taxonomy
//! extension proposals from actionable gaps.

use super::keywords::{
    implied_stratum_ceiling, polarity_hits, AUTONOMY_WORDS, BREADTH_WORDS, DEPENDENCY_WORDS,
    NARROWNESS_WORDS, SYMMETRY_WORDS, TRANSITIVITY_WORDS,
};
use super::types::{
    ArtifactId, ArtifactPayload, CapabilitySpec, ConnectorSpec, DomainSpec, GeneratedArtifact,
    GenerationError, InsertStrategy, Justification, JustificationEntry, JustificationStatus,
    RelationTypeSpec,
};
use crate::analysis::{Gap, SuggestedAction};
use crate::taxonomy::{AxiomCheck, AxiomTable, Stratum};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Per-word shift applied to the neutral 0.5 descriptor baseline.
const POLARITY_STEP: f64 = 0.1;

/// Inferred descriptors never leave this band.
const DESCRIPTOR_FLOOR: f64 = 0.1;
const DESCRIPTOR_CEIL: f64 = 0.9;

/// Synthesizes one artifact per actionable gap. Deterministic: the same
/// gap always yields the same proposal (ids and timestamps aside).
pub struct CandidateGenerator {
    axioms: Arc<AxiomTable>,
}

impl CandidateGenerator {
    pub fn new(axioms: Arc<AxiomTable>) -> Self {
        Self { axioms }
    }

    /// Build an artifact for the gap, or `None` when the suggested action
    /// is a review action — those never produce artifacts.
    pub fn generate(&self, gap: &Gap) -> Result<Option<GeneratedArtifact>, GenerationError> {
        let (payload, target_location, strategy, dependencies) = match &gap.suggested_action {
            SuggestedAction::GenerateDomain {
                name_hint,
                characteristics,
            } => {
                let payload = domain_payload(name_hint, characteristics);
                (
                    payload,
                    "taxonomy/domains.yaml".to_string(),
                    InsertStrategy::Append,
                    Vec::new(),
                )
            }
            SuggestedAction::GenerateCapability {
                name_hint,
                description,
                emerges_at,
            } => {
                let requires = emerges_at.required_below();
                let payload = ArtifactPayload::Capability(CapabilitySpec {
                    name: name_hint.clone(),
                    description: description.clone(),
                    emerges_at: *emerges_at,
                    requires: requires.clone(),
                });
                (
                    payload,
                    "taxonomy/capabilities.yaml".to_string(),
                    InsertStrategy::Append,
                    requires,
                )
            }
            SuggestedAction::GenerateRelationType { name_hint, examples } => {
                let lowered = name_hint.to_lowercase();
                let payload = ArtifactPayload::RelationType(RelationTypeSpec {
                    name: name_hint.clone(),
                    description: format!("relation type observed as '{}'", name_hint),
                    symmetric: SYMMETRY_WORDS.iter().any(|w| lowered.contains(w)),
                    transitive: TRANSITIVITY_WORDS.iter().any(|w| lowered.contains(w)),
                    examples: examples.clone(),
                });
                (
                    payload,
                    "taxonomy/relations.yaml".to_string(),
                    InsertStrategy::Append,
                    Vec::new(),
                )
            }
            SuggestedAction::GenerateConnector {
                name_hint,
                url,
                query_format,
            } => {
                let payload = ArtifactPayload::Connector(ConnectorSpec {
                    name: name_hint.clone(),
                    url: url.clone(),
                    query_format: query_format.clone(),
                    enabled: false,
                });
                (
                    payload,
                    format!("connectors/{}.yaml", name_hint),
                    InsertStrategy::CreateNewFile,
                    Vec::new(),
                )
            }
            SuggestedAction::ManualReview { .. } | SuggestedAction::AxiomReview { .. } => {
                return Ok(None);
            }
        };

        let justification = self.justify(&payload);
        let name = payload.name().to_string();
        debug!(gap = %gap.id, artifact = %name, "generated candidate");

        Ok(Some(GeneratedArtifact {
            id: ArtifactId::new(),
            name,
            payload,
            target_location,
            strategy,
            dependencies,
            justification,
            source_gap: gap.id,
            generated_at: Utc::now(),
        }))
    }

    /// Self-declared justification: one entry per applicable axiom. This is
    /// advisory — the validator runs its own predicates regardless.
    fn justify(&self, payload: &ArtifactPayload) -> Justification {
        let entries: Vec<JustificationEntry> = self
            .axioms
            .applicable_to(payload.kind())
            .into_iter()
            .map(|axiom| {
                let (status, note) = self_assess(axiom.check, payload);
                JustificationEntry {
                    axiom: axiom.id.clone(),
                    status,
                    note: note.to_string(),
                }
            })
            .collect();

        let assessed = entries
            .iter()
            .filter(|e| e.status != JustificationStatus::NotApplicable)
            .count();
        let respected = entries
            .iter()
            .filter(|e| e.status == JustificationStatus::Respected)
            .count();
        let needs_review = entries
            .iter()
            .filter(|e| e.status == JustificationStatus::NeedsReview)
            .count();
        let compliance = if assessed == 0 {
            1.0
        } else {
            (respected as f64 + 0.5 * needs_review as f64) / assessed as f64
        };

        Justification {
            entries,
            compliance,
        }
    }
}

fn domain_payload(name_hint: &str, characteristics: &[String]) -> ArtifactPayload {
    let closure = infer_descriptor(
        polarity_hits(characteristics, AUTONOMY_WORDS),
        polarity_hits(characteristics, DEPENDENCY_WORDS),
    );
    let scope = infer_descriptor(
        polarity_hits(characteristics, BREADTH_WORDS),
        polarity_hits(characteristics, NARROWNESS_WORDS),
    );

    let ceiling = implied_stratum_ceiling(characteristics);
    let compatible_strata: Vec<Stratum> = Stratum::ORDER
        .iter()
        .copied()
        .take(ceiling.level() + 1)
        .collect();

    ArtifactPayload::Domain(DomainSpec {
        name: name_hint.to_string(),
        description: format!(
            "proposed domain for entities characterized as: {}",
            characteristics.join(", ")
        ),
        typical_closure: closure,
        typical_scope: scope,
        compatible_strata,
    })
}

fn infer_descriptor(up_hits: usize, down_hits: usize) -> f64 {
    let shifted = 0.5 + POLARITY_STEP * up_hits as f64 - POLARITY_STEP * down_hits as f64;
    shifted.clamp(DESCRIPTOR_FLOOR, DESCRIPTOR_CEIL)
}

fn self_assess(check: AxiomCheck, payload: &ArtifactPayload) -> (JustificationStatus, &'static str) {
    use JustificationStatus::*;
    match check {
        AxiomCheck::DescriptorCompleteness => match payload {
            ArtifactPayload::Domain(_) => (Respected, "typical closure and scope are declared"),
            _ => (NotApplicable, "no domain descriptors in this payload"),
        },
        AxiomCheck::ClosureScopeTension => match payload {
            ArtifactPayload::Domain(spec) if spec.typical_closure > 0.7 && spec.typical_scope > 0.7 => {
                (NeedsReview, "inferred closure and scope are both high")
            }
            ArtifactPayload::Domain(_) => (Respected, "inferred descriptors are not in tension"),
            _ => (NotApplicable, "no domain descriptors in this payload"),
        },
        AxiomCheck::StratumNesting => match payload {
            ArtifactPayload::Domain(_) => {
                (Respected, "compatible strata are generated as a contiguous prefix")
            }
            ArtifactPayload::Capability(_) => (Respected, "emergence point is a single stratum"),
            _ => (NotApplicable, "payload carries no strata"),
        },
        AxiomCheck::CapabilityGrounding => match payload {
            ArtifactPayload::Capability(_) => {
                (Respected, "requires lists every lower-stratum capability")
            }
            _ => (NotApplicable, "payload is not a capability"),
        },
        AxiomCheck::NoDuplication => {
            (NeedsReview, "collision against the registry is the validator's call")
        }
        AxiomCheck::Minimality => {
            (NeedsReview, "similarity against the registry is the validator's call")
        }
        AxiomCheck::RelationTyping => match payload {
            ArtifactPayload::RelationType(_) => (Respected, "symmetry and transitivity declared"),
            _ => (NotApplicable, "payload is not a relation type"),
        },
        AxiomCheck::ConnectorInertness => match payload {
            ArtifactPayload::Connector(spec) if !spec.enabled => {
                (Respected, "connector is generated disabled")
            }
            ArtifactPayload::Connector(_) => (NeedsReview, "connector claims to be enabled"),
            _ => (NotApplicable, "payload is not a connector"),
        },
    }
}
