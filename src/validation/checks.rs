//! Per-axiom structural predicates over typed artifact payloads.
//!
//! Checks read the payload's fields, never its rendered text.

use super::types::{ValidationWarning, Violation};
use crate::generation::{ArtifactPayload, GeneratedArtifact};
use crate::taxonomy::{Axiom, AxiomCheck, NameRegistry, Stratum};

/// Findings from one axiom's predicate. An empty report is a pass.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub violations: Vec<Violation>,
    pub warnings: Vec<ValidationWarning>,
}

impl CheckReport {
    pub fn is_pass(&self) -> bool {
        self.violations.is_empty() && self.warnings.is_empty()
    }

    fn violation(&mut self, axiom: &Axiom, message: impl Into<String>, fatal: bool) {
        self.violations.push(Violation {
            axiom: axiom.id.clone(),
            message: message.into(),
            fatal,
        });
    }

    fn warning(&mut self, axiom: &Axiom, message: impl Into<String>, requires_review: bool) {
        self.warnings.push(ValidationWarning {
            axiom: axiom.id.clone(),
            message: message.into(),
            requires_review,
        });
    }
}

/// Run one axiom's predicate over an artifact.
pub fn run_check(
    axiom: &Axiom,
    artifact: &GeneratedArtifact,
    registry: &NameRegistry,
    similarity_threshold: f64,
) -> CheckReport {
    let mut report = CheckReport::default();
    match axiom.check {
        AxiomCheck::DescriptorCompleteness => descriptor_completeness(axiom, artifact, &mut report),
        AxiomCheck::ClosureScopeTension => closure_scope_tension(axiom, artifact, &mut report),
        AxiomCheck::StratumNesting => stratum_nesting(axiom, artifact, &mut report),
        AxiomCheck::CapabilityGrounding => capability_grounding(axiom, artifact, &mut report),
        AxiomCheck::NoDuplication => no_duplication(axiom, artifact, registry, &mut report),
        AxiomCheck::Minimality => {
            minimality(axiom, artifact, registry, similarity_threshold, &mut report)
        }
        AxiomCheck::RelationTyping => relation_typing(axiom, artifact, &mut report),
        AxiomCheck::ConnectorInertness => connector_inertness(axiom, artifact, &mut report),
    }
    report
}

fn descriptor_completeness(axiom: &Axiom, artifact: &GeneratedArtifact, report: &mut CheckReport) {
    let missing: Vec<&str> = match &artifact.payload {
        ArtifactPayload::Domain(spec) => {
            let mut missing = Vec::new();
            if spec.name.trim().is_empty() {
                missing.push("name");
            }
            if spec.description.trim().is_empty() {
                missing.push("description");
            }
            if !(0.0..=1.0).contains(&spec.typical_closure) {
                missing.push("typical_closure");
            }
            if !(0.0..=1.0).contains(&spec.typical_scope) {
                missing.push("typical_scope");
            }
            if spec.compatible_strata.is_empty() {
                missing.push("compatible_strata");
            }
            missing
        }
        ArtifactPayload::Capability(spec) => {
            let mut missing = Vec::new();
            if spec.name.trim().is_empty() {
                missing.push("name");
            }
            if spec.description.trim().is_empty() {
                missing.push("description");
            }
            missing
        }
        ArtifactPayload::RelationType(spec) => {
            if spec.name.trim().is_empty() {
                vec!["name"]
            } else {
                Vec::new()
            }
        }
        ArtifactPayload::Connector(spec) => {
            let mut missing = Vec::new();
            if spec.name.trim().is_empty() {
                missing.push("name");
            }
            if spec.url.trim().is_empty() {
                missing.push("url");
            }
            missing
        }
    };

    if !missing.is_empty() {
        report.violation(
            axiom,
            format!("payload is missing essential descriptors: {}", missing.join(", ")),
            false,
        );
    }
}

fn closure_scope_tension(axiom: &Axiom, artifact: &GeneratedArtifact, report: &mut CheckReport) {
    if let ArtifactPayload::Domain(spec) = &artifact.payload {
        if spec.typical_closure > 0.7 && spec.typical_scope > 0.7 {
            report.warning(
                axiom,
                format!(
                    "typical closure ({:.2}) and scope ({:.2}) are both high",
                    spec.typical_closure, spec.typical_scope
                ),
                true,
            );
        }
    }
}

fn stratum_nesting(axiom: &Axiom, artifact: &GeneratedArtifact, report: &mut CheckReport) {
    if let ArtifactPayload::Domain(spec) = &artifact.payload {
        let expected: Vec<Stratum> = Stratum::ORDER
            .iter()
            .copied()
            .take(spec.compatible_strata.len())
            .collect();
        if spec.compatible_strata != expected {
            report.violation(
                axiom,
                "compatible strata are not a contiguous prefix of the canonical order",
                true,
            );
        }
    }
}

fn capability_grounding(axiom: &Axiom, artifact: &GeneratedArtifact, report: &mut CheckReport) {
    if let ArtifactPayload::Capability(spec) = &artifact.payload {
        let required = spec.emerges_at.required_below();
        let missing: Vec<&String> = required
            .iter()
            .filter(|r| !spec.requires.contains(r))
            .collect();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
            report.warning(
                axiom,
                format!(
                    "required lower-stratum capabilities absent from the payload: {}",
                    names.join(", ")
                ),
                true,
            );
        }
    }
}

fn no_duplication(
    axiom: &Axiom,
    artifact: &GeneratedArtifact,
    registry: &NameRegistry,
    report: &mut CheckReport,
) {
    if registry.contains(artifact.kind(), artifact.payload.name()) {
        report.violation(
            axiom,
            format!(
                "name '{}' collides with an existing {} name",
                artifact.payload.name(),
                artifact.kind()
            ),
            true,
        );
    }
}

fn minimality(
    axiom: &Axiom,
    artifact: &GeneratedArtifact,
    registry: &NameRegistry,
    threshold: f64,
    report: &mut CheckReport,
) {
    let name = artifact.payload.name();
    let nearest = registry
        .names_for(artifact.kind())
        .iter()
        .map(|existing| (existing.as_str(), dice_similarity(name, existing)))
        .filter(|(existing, _)| !existing.eq_ignore_ascii_case(name))
        .max_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((existing, similarity)) = nearest {
        if similarity > threshold {
            report.warning(
                axiom,
                format!(
                    "name '{}' is {:.0}% similar to '{}'; verify this is not reducible to it",
                    name,
                    similarity * 100.0,
                    existing
                ),
                true,
            );
        }
    }
}

fn relation_typing(axiom: &Axiom, artifact: &GeneratedArtifact, report: &mut CheckReport) {
    if let ArtifactPayload::RelationType(spec) = &artifact.payload {
        if spec.examples.is_empty() {
            report.warning(axiom, "relation type carries no usage evidence", false);
        }
    }
}

fn connector_inertness(axiom: &Axiom, artifact: &GeneratedArtifact, report: &mut CheckReport) {
    if let ArtifactPayload::Connector(spec) = &artifact.payload {
        if spec.enabled {
            report.violation(axiom, "connector must be generated inert", true);
        }
    }
}

/// Dice coefficient over character bigrams, in [0, 1].
pub fn dice_similarity(a: &str, b: &str) -> f64 {
    let bigrams = |s: &str| -> Vec<(char, char)> {
        let chars: Vec<char> = s.to_lowercase().chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };

    let a_grams = bigrams(a);
    let b_grams = bigrams(b);
    if a_grams.is_empty() || b_grams.is_empty() {
        return if a.eq_ignore_ascii_case(b) { 1.0 } else { 0.0 };
    }

    let mut b_pool = b_grams.clone();
    let mut overlap = 0usize;
    for gram in &a_grams {
        if let Some(pos) = b_pool.iter().position(|g| g == gram) {
            b_pool.swap_remove(pos);
            overlap += 1;
        }
    }

    (2.0 * overlap as f64) / (a_grams.len() + b_grams.len()) as f64
}
