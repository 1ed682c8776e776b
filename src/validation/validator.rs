//! Rule validator: deterministic, side-effect-free scoring of artifacts
//! against the axiom table.

use super::checks::run_check;
use super::types::{ValidationResult, ValidationWarning, Violation};
use crate::generation::GeneratedArtifact;
use crate::taxonomy::{AxiomId, AxiomTable, NameRegistry};
use crate::Config;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Penalty per review-flagged warning in the score formula.
const REVIEW_WARNING_PENALTY: f64 = 0.1;

pub struct RuleValidator {
    axioms: Arc<AxiomTable>,
    config: Config,
}

impl RuleValidator {
    pub fn new(axioms: Arc<AxiomTable>, config: Config) -> Self {
        Self { axioms, config }
    }

    /// Validate one artifact. Always returns a result — invalid artifacts
    /// are a result with `valid == false`, not an error.
    pub fn validate(
        &self,
        artifact: &GeneratedArtifact,
        registry: &NameRegistry,
    ) -> ValidationResult {
        let applicable = self.axioms.applicable_to(artifact.kind());
        let applicable_count = applicable.len();

        let mut violations: Vec<Violation> = Vec::new();
        let mut warnings: Vec<ValidationWarning> = Vec::new();
        let mut passed_axioms: Vec<AxiomId> = Vec::new();

        for axiom in applicable {
            let report = run_check(
                axiom,
                artifact,
                registry,
                self.config.similarity_threshold,
            );
            if report.is_pass() {
                passed_axioms.push(axiom.id.clone());
            }
            violations.extend(report.violations);
            warnings.extend(report.warnings);
        }

        let review_warnings = warnings.iter().filter(|w| w.requires_review).count();
        let score = if applicable_count == 0 {
            0.0
        } else {
            (passed_axioms.len() as f64 / applicable_count as f64
                - REVIEW_WARNING_PENALTY * review_warnings as f64)
                .max(0.0)
        };

        let valid = violations.is_empty();
        let requires_human_review =
            review_warnings > 0 || violations.iter().any(|v| !v.fatal);

        debug!(
            artifact = %artifact.id,
            valid,
            score,
            violations = violations.len(),
            warnings = warnings.len(),
            "validated artifact"
        );

        ValidationResult {
            valid,
            score,
            violations,
            warnings,
            passed_axioms,
            requires_human_review,
            validated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Gap, GapType, Severity, SuggestedAction};
    use crate::generation::{
        ArtifactPayload, CandidateGenerator, ConnectorSpec, DomainSpec, GeneratedArtifact,
    };
    use crate::taxonomy::{ArtifactKind, Stratum};

    fn validator() -> RuleValidator {
        RuleValidator::new(Arc::new(AxiomTable::builtin()), Config::default())
    }

    fn domain_artifact(name: &str, closure: f64, scope: f64, strata: Vec<Stratum>) -> GeneratedArtifact {
        let gap = Gap::new(
            GapType::DomainMisfit,
            Severity::Medium,
            "test",
            SuggestedAction::ManualReview { reason: "n/a".into() },
        );
        GeneratedArtifact {
            id: crate::generation::ArtifactId::new(),
            name: name.to_string(),
            payload: ArtifactPayload::Domain(DomainSpec {
                name: name.to_string(),
                description: "a test domain".to_string(),
                typical_closure: closure,
                typical_scope: scope,
                compatible_strata: strata,
            }),
            target_location: "taxonomy/domains.yaml".to_string(),
            strategy: crate::generation::InsertStrategy::Append,
            dependencies: Vec::new(),
            justification: Default::default(),
            source_gap: gap.id,
            generated_at: chrono::Utc::now(),
        }
    }

    // === Scenario: A clean artifact validates with a full score ===

    #[test]
    fn clean_domain_artifact_is_valid() {
        let artifact = domain_artifact("mycelium_web", 0.6, 0.4, vec![Stratum::Matter, Stratum::Life]);
        let result = validator().validate(&artifact, &NameRegistry::seeded());

        assert!(result.valid);
        assert!(result.violations.is_empty());
        assert_eq!(result.score, 1.0);
        assert!(!result.requires_human_review);
    }

    // === Scenario: valid mirrors the violations list exactly ===

    #[test]
    fn valid_iff_no_violations() {
        let clean = domain_artifact("weave", 0.6, 0.4, vec![Stratum::Matter]);
        let colliding = domain_artifact("living", 0.6, 0.4, vec![Stratum::Matter]);

        let registry = NameRegistry::seeded();
        for artifact in [&clean, &colliding] {
            let result = validator().validate(artifact, &registry);
            assert_eq!(result.valid, result.violations.is_empty());
        }
    }

    // === Scenario: Broken strata prefix is a fatal violation ===

    #[test]
    fn non_contiguous_strata_is_fatal() {
        let artifact = domain_artifact(
            "skipper",
            0.5,
            0.5,
            vec![Stratum::Matter, Stratum::Logos], // skips life and sentience
        );
        let result = validator().validate(&artifact, &NameRegistry::seeded());

        assert!(!result.valid);
        assert!(result.has_fatal_violation());
    }

    // === Scenario: Name collision is fatal, case-insensitively ===

    #[test]
    fn duplicate_name_is_fatal() {
        let artifact = domain_artifact("Living", 0.5, 0.5, vec![Stratum::Matter]);
        let result = validator().validate(&artifact, &NameRegistry::seeded());

        assert!(!result.valid);
        assert!(result.has_fatal_violation());
        assert!(result.violations[0].message.contains("collides"));
    }

    // === Scenario: Tension warning lowers score and flags review ===

    #[test]
    fn tension_warning_requires_review_and_costs_score() {
        let artifact = domain_artifact("leviathan", 0.8, 0.8, vec![Stratum::Matter]);
        let result = validator().validate(&artifact, &NameRegistry::seeded());

        assert!(result.valid); // warning, not violation
        assert!(result.requires_human_review);
        // 4 of 5 axioms pass (A2 warns): 0.8 − 0.1 = 0.7
        assert!((result.score - 0.7).abs() < 1e-9);
    }

    // === Scenario: Near-duplicate names draw a minimality warning ===

    #[test]
    fn similar_name_draws_minimality_warning() {
        let mut registry = NameRegistry::seeded();
        registry.insert(ArtifactKind::NewDomain, "biotechnical");

        let artifact = domain_artifact("biotechnicals", 0.5, 0.5, vec![Stratum::Matter]);
        let result = validator().validate(&artifact, &registry);

        assert!(result.valid);
        assert!(result.requires_human_review);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.requires_review && w.message.contains("reducible")));
    }

    // === Scenario: Validator re-checks what the generator self-declared ===

    #[test]
    fn generated_artifacts_pass_their_own_declaration() {
        let axioms = Arc::new(AxiomTable::builtin());
        let generator = CandidateGenerator::new(axioms.clone());
        let gap = Gap::new(
            GapType::DomainMisfit,
            Severity::Medium,
            "cluster",
            SuggestedAction::GenerateDomain {
                name_hint: "symbiont_mesh".to_string(),
                characteristics: vec!["autonomous".to_string(), "local".to_string()],
            },
        );
        let artifact = generator.generate(&gap).unwrap().unwrap();
        let result = validator().validate(&artifact, &NameRegistry::seeded());
        assert!(result.valid);
    }

    // === Scenario: Enabled connectors violate inertness fatally ===

    #[test]
    fn enabled_connector_is_rejected() {
        let gap = Gap::new(
            GapType::CapabilityMissing,
            Severity::Medium,
            "test",
            SuggestedAction::ManualReview { reason: "n/a".into() },
        );
        let artifact = GeneratedArtifact {
            id: crate::generation::ArtifactId::new(),
            name: "rogue-feed".to_string(),
            payload: ArtifactPayload::Connector(ConnectorSpec {
                name: "rogue-feed".to_string(),
                url: "https://example.org".to_string(),
                query_format: "json".to_string(),
                enabled: true,
            }),
            target_location: "connectors/rogue-feed.yaml".to_string(),
            strategy: crate::generation::InsertStrategy::CreateNewFile,
            dependencies: Vec::new(),
            justification: Default::default(),
            source_gap: gap.id,
            generated_at: chrono::Utc::now(),
        };

        let result = validator().validate(&artifact, &NameRegistry::seeded());
        assert!(!result.valid);
        assert!(result.has_fatal_violation());
    }
}
