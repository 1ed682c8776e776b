//! OntogenEngine: the main entry point for the self-production pipeline.
//!
//! One cycle runs entities → gap analysis → candidate generation → rule
//! validation → review queue. Integration runs separately, triggered by
//! human decisions, never automatically from a cycle.

use crate::analysis::{GapAnalyzer, SeededJitter};
use crate::generation::{ArtifactPayload, CandidateGenerator};
use crate::integration::{IntegrationId, IntegrationRecord, IntegrationResult, Integrator};
use crate::review::{ReviewError, ReviewId, ReviewItem, ReviewStats, ReviewStatus, ReviewWorkflow};
use crate::storage::{MemoryStore, StateSnapshot, StateStore};
use crate::taxonomy::{AxiomTable, Entity, NameRegistry};
use crate::validation::RuleValidator;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::info;

/// Errors that can abort an engine operation.
///
/// Per-item failures inside a cycle do not surface here — they accumulate
/// in [`CycleResult::errors`] while the cycle keeps going.
#[derive(Debug, Error)]
pub enum OntogenError {
    #[error("fatal configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Axiom(#[from] crate::taxonomy::AxiomError),

    #[error(transparent)]
    Analysis(#[from] crate::analysis::AnalysisError),

    #[error(transparent)]
    Generation(#[from] crate::generation::GenerationError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Integration(#[from] crate::integration::IntegrationError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for engine operations
pub type OntogenResult<T> = Result<T, OntogenError>;

/// Summary of one full cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleResult {
    pub entities_analyzed: usize,
    pub gaps_detected: usize,
    pub artifacts_generated: usize,
    pub validations_passed: usize,
    pub validations_failed: usize,
    pub pending_reviews: usize,
    /// Per-item failures, accumulated rather than thrown
    pub errors: Vec<String>,
}

/// The main engine: owns the frozen reference data and the pipeline
/// components, and exposes the cycle, review, and integration surfaces.
pub struct OntogenEngine {
    analyzer: GapAnalyzer,
    generator: CandidateGenerator,
    validator: RuleValidator,
    workflow: ReviewWorkflow,
    integrator: Integrator,
    store: Arc<dyn StateStore>,
    /// Existing names per kind; grows as artifacts integrate
    registry: RwLock<NameRegistry>,
}

impl OntogenEngine {
    /// Engine over an explicit store, axiom table, and taxonomy root.
    pub fn new(
        config: Config,
        axioms: AxiomTable,
        store: Arc<dyn StateStore>,
        root: impl Into<PathBuf>,
    ) -> OntogenResult<Self> {
        if axioms.is_empty() {
            return Err(OntogenError::Config("axiom table is empty".to_string()));
        }
        let axioms = Arc::new(axioms);
        let jitter = Arc::new(SeededJitter::new(config.jitter_seed));

        Ok(Self {
            analyzer: GapAnalyzer::with_default_detectors(
                config.clone(),
                axioms.clone(),
                jitter,
            ),
            generator: CandidateGenerator::new(axioms.clone()),
            validator: RuleValidator::new(axioms, config.clone()),
            workflow: ReviewWorkflow::new(store.clone(), config.clone()),
            integrator: Integrator::new(store.clone(), root, config.backups_enabled),
            store,
            registry: RwLock::new(NameRegistry::seeded()),
        })
    }

    /// In-memory engine with the builtin axiom table; the default for
    /// tests and one-shot cycles.
    pub fn in_memory(config: Config, root: impl Into<PathBuf>) -> OntogenResult<Self> {
        Self::new(
            config,
            AxiomTable::builtin(),
            Arc::new(MemoryStore::new()),
            root,
        )
    }

    // === Cycle surface ===

    /// Run one full self-production cycle over an entity snapshot.
    ///
    /// Pure with respect to the snapshot; the only mutation is new items
    /// entering the review queue. Per-gap failures are recorded in the
    /// result's errors and do not stop the cycle.
    pub fn run_cycle(&self, entities: &[Entity]) -> OntogenResult<CycleResult> {
        info!(entities = entities.len(), "starting cycle");
        let analysis = self.analyzer.analyze(entities)?;

        let mut result = CycleResult {
            entities_analyzed: entities.len(),
            gaps_detected: analysis.gaps.len(),
            errors: analysis.warnings.clone(),
            ..Default::default()
        };

        for gap in analysis.gaps {
            if !gap.suggested_action.is_generative() {
                if let Err(e) = self.workflow.add_gap_only_review(gap) {
                    result.errors.push(format!("review queueing failed: {}", e));
                }
                continue;
            }

            let gap_id = gap.id;
            match self.generator.generate(&gap) {
                Ok(Some(artifact)) => {
                    result.artifacts_generated += 1;
                    let validation = {
                        let registry = self.registry.read().unwrap();
                        self.validator.validate(&artifact, &registry)
                    };
                    if validation.valid {
                        result.validations_passed += 1;
                    } else {
                        result.validations_failed += 1;
                    }
                    if let Err(e) = self.workflow.add_artifact_review(gap, artifact, validation) {
                        result
                            .errors
                            .push(format!("review queueing failed for gap {}: {}", gap_id, e));
                    }
                }
                Ok(None) => {
                    // Generative actions always yield an artifact; queue the
                    // gap anyway so nothing is lost.
                    if let Err(e) = self.workflow.add_gap_only_review(gap) {
                        result.errors.push(format!("review queueing failed: {}", e));
                    }
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("generation failed for gap {}: {}", gap_id, e));
                    if let Err(e) = self.workflow.add_gap_only_review(gap) {
                        result.errors.push(format!("review queueing failed: {}", e));
                    }
                }
            }
        }

        result.pending_reviews = self.workflow.list_pending()?.len();
        info!(
            gaps = result.gaps_detected,
            generated = result.artifacts_generated,
            pending = result.pending_reviews,
            "cycle finished"
        );
        Ok(result)
    }

    // === Review surface ===

    pub fn list_pending_reviews(&self) -> OntogenResult<Vec<ReviewItem>> {
        Ok(self.workflow.list_pending()?)
    }

    pub fn approve(
        &self,
        id: &ReviewId,
        reviewer: &str,
        notes: Option<String>,
    ) -> OntogenResult<ReviewItem> {
        Ok(self.workflow.approve(id, reviewer, notes)?)
    }

    pub fn reject(
        &self,
        id: &ReviewId,
        reviewer: &str,
        reason: impl Into<String>,
    ) -> OntogenResult<ReviewItem> {
        Ok(self.workflow.reject(id, reviewer, reason)?)
    }

    pub fn modify_and_approve(
        &self,
        id: &ReviewId,
        reviewer: &str,
        payload: ArtifactPayload,
        notes: Option<String>,
    ) -> OntogenResult<ReviewItem> {
        Ok(self.workflow.modify_and_approve(id, reviewer, payload, notes)?)
    }

    pub fn review_stats(&self) -> OntogenResult<ReviewStats> {
        Ok(self.workflow.stats()?)
    }

    // === Integration surface ===

    /// Integrate a single approved (or modified) review item.
    pub async fn integrate_approved(&self, id: &ReviewId) -> OntogenResult<IntegrationResult> {
        let item = self
            .store
            .get_review(id)?
            .ok_or(ReviewError::NotFound(*id))?;
        let result = self.integrator.integrate(&item).await?;
        if result.success {
            self.absorb_into_registry(&item);
        }
        Ok(result)
    }

    /// Integrate every approved or modified item. Per-item failures are
    /// returned as failed results; the batch keeps going.
    pub async fn integrate_all_approved(&self) -> OntogenResult<Vec<IntegrationResult>> {
        let ready: Vec<ReviewItem> = self
            .store
            .list_reviews()?
            .into_iter()
            .filter(|i| matches!(i.status, ReviewStatus::Approved | ReviewStatus::Modified))
            .collect();

        let mut results = Vec::with_capacity(ready.len());
        for item in ready {
            match self.integrator.integrate(&item).await {
                Ok(result) => {
                    if result.success {
                        self.absorb_into_registry(&item);
                    }
                    results.push(result);
                }
                Err(e) => results.push(IntegrationResult::failed(e.to_string(), None)),
            }
        }
        Ok(results)
    }

    pub async fn rollback(&self, id: &IntegrationId) -> OntogenResult<bool> {
        Ok(self.integrator.rollback(id).await?)
    }

    pub fn integration_history(&self) -> OntogenResult<Vec<IntegrationRecord>> {
        Ok(self.integrator.history()?)
    }

    /// Once integrated, the artifact's name is part of the taxonomy and
    /// future duplicates must collide with it.
    fn absorb_into_registry(&self, item: &ReviewItem) {
        if let Some(artifact) = &item.artifact {
            self.registry
                .write()
                .unwrap()
                .insert(artifact.kind(), artifact.payload.name());
        }
    }

    // === State surface ===

    pub fn export_state(&self) -> OntogenResult<StateSnapshot> {
        Ok(self.store.export_state()?)
    }

    pub fn import_state(&self, snapshot: &StateSnapshot) -> OntogenResult<()> {
        Ok(self.store.import_state(snapshot)?)
    }
}
