//! Review workflow: the pending queue and its one-way state machine.
//!
//! Items enter pending and leave exactly once, to approved, rejected,
//! modified, or expired. Transitions go through the store's atomic update,
//! so two concurrent deciders on the same item serialize: the first to
//! observe `pending` wins and the loser fails cleanly with a state error.

use super::types::{
    Priority, ReviewDecision, ReviewError, ReviewId, ReviewItem, ReviewKind, ReviewStatus,
    ReviewStats, ReviewerFeedback,
};
use crate::analysis::{Gap, GapType, SuggestedAction};
use crate::generation::{ArtifactPayload, GeneratedArtifact};
use crate::storage::{StateStore, StorageError};
use crate::validation::ValidationResult;
use crate::Config;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ReviewWorkflow {
    store: Arc<dyn StateStore>,
    config: Config,
}

impl ReviewWorkflow {
    pub fn new(store: Arc<dyn StateStore>, config: Config) -> Self {
        Self { store, config }
    }

    // === Entry paths ===

    /// Queue an artifact with its validation for human disposition.
    ///
    /// Invalid artifacts are queued too — as gap-only items still carrying
    /// the artifact and the failed validation, so nothing is silently
    /// dropped.
    pub fn add_artifact_review(
        &self,
        gap: Gap,
        artifact: GeneratedArtifact,
        validation: ValidationResult,
    ) -> Result<ReviewItem, ReviewError> {
        let kind = if validation.valid {
            ReviewKind::ArtifactReview
        } else {
            ReviewKind::GapOnlyReview
        };
        let priority = if gap.gap_type == GapType::RuleTension || !validation.violations.is_empty()
        {
            Priority::Critical
        } else {
            Priority::from(gap.severity)
        };

        let item = self.new_item(kind, gap, Some(artifact), Some(validation), priority);
        self.store.put_review(&item)?;
        debug!(id = %item.id, priority = %item.priority, "queued artifact review");
        self.enforce_capacity()?;
        Ok(item)
    }

    /// Queue a gap that produced no artifact (manual or axiom review).
    pub fn add_gap_only_review(&self, gap: Gap) -> Result<ReviewItem, ReviewError> {
        let kind = match (&gap.suggested_action, gap.gap_type) {
            (SuggestedAction::AxiomReview { .. }, _) | (_, GapType::RuleTension) => {
                ReviewKind::RuleTensionReview
            }
            _ => ReviewKind::GapOnlyReview,
        };

        let mut priority = Priority::from(gap.severity);
        if gap.gap_type == GapType::RuleTension && priority < Priority::High {
            priority = Priority::High;
        }

        let item = self.new_item(kind, gap, None, None, priority);
        self.store.put_review(&item)?;
        debug!(id = %item.id, priority = %item.priority, "queued gap-only review");
        self.enforce_capacity()?;
        Ok(item)
    }

    fn new_item(
        &self,
        kind: ReviewKind,
        gap: Gap,
        artifact: Option<GeneratedArtifact>,
        validation: Option<ValidationResult>,
        priority: Priority,
    ) -> ReviewItem {
        let now = Utc::now();
        ReviewItem {
            id: ReviewId::new(),
            kind,
            status: ReviewStatus::Pending,
            gap,
            artifact,
            validation,
            priority,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(self.config.review_ttl_days),
            feedback: None,
        }
    }

    // === Dispositions ===

    pub fn approve(
        &self,
        id: &ReviewId,
        reviewer: &str,
        notes: Option<String>,
    ) -> Result<ReviewItem, ReviewError> {
        let feedback = ReviewerFeedback {
            decision: ReviewDecision::Approved,
            reviewer: reviewer.to_string(),
            notes,
            modified_payload: None,
        };
        let item = self.transition(id, ReviewStatus::Approved, feedback, None)?;
        info!(id = %id, reviewer, "review approved");
        Ok(item)
    }

    pub fn reject(
        &self,
        id: &ReviewId,
        reviewer: &str,
        reason: impl Into<String>,
    ) -> Result<ReviewItem, ReviewError> {
        let feedback = ReviewerFeedback {
            decision: ReviewDecision::Rejected,
            reviewer: reviewer.to_string(),
            notes: Some(reason.into()),
            modified_payload: None,
        };
        let item = self.transition(id, ReviewStatus::Rejected, feedback, None)?;
        info!(id = %id, reviewer, "review rejected");
        Ok(item)
    }

    /// Approve with reviewer edits: the artifact's payload is replaced by
    /// the edited one and the edit is recorded in the feedback.
    pub fn modify_and_approve(
        &self,
        id: &ReviewId,
        reviewer: &str,
        new_payload: ArtifactPayload,
        notes: Option<String>,
    ) -> Result<ReviewItem, ReviewError> {
        let current = self
            .store
            .get_review(id)?
            .ok_or(ReviewError::NotFound(*id))?;
        if current.artifact.is_none() {
            return Err(ReviewError::NoArtifact(*id));
        }

        let feedback = ReviewerFeedback {
            decision: ReviewDecision::Modified,
            reviewer: reviewer.to_string(),
            notes,
            modified_payload: Some(new_payload.clone()),
        };
        let item = self.transition(id, ReviewStatus::Modified, feedback, Some(new_payload))?;
        info!(id = %id, reviewer, "review modified and approved");
        Ok(item)
    }

    /// The single transition point out of `pending`.
    fn transition(
        &self,
        id: &ReviewId,
        to: ReviewStatus,
        feedback: ReviewerFeedback,
        new_payload: Option<ArtifactPayload>,
    ) -> Result<ReviewItem, ReviewError> {
        let result = self.store.update_review(id, &mut |item| {
            if item.status != ReviewStatus::Pending {
                return Err(item.status.to_string());
            }
            item.status = to;
            item.updated_at = Utc::now();
            if let (Some(payload), Some(artifact)) = (&new_payload, item.artifact.as_mut()) {
                artifact.name = payload.name().to_string();
                artifact.payload = payload.clone();
            }
            item.feedback = Some(feedback.clone());
            Ok(())
        });

        match result {
            Ok(item) => Ok(item),
            Err(StorageError::ReviewNotFound(_)) => Err(ReviewError::NotFound(*id)),
            Err(StorageError::Conflict(_)) => {
                let status = self
                    .store
                    .get_review(id)?
                    .map(|i| i.status)
                    .unwrap_or(ReviewStatus::Expired);
                Err(ReviewError::InvalidState { id: *id, status })
            }
            Err(e) => Err(ReviewError::Storage(e)),
        }
    }

    // === Listing and statistics ===

    /// Pending items, ordered by priority (critical first) then by
    /// creation time (oldest first within a band).
    pub fn list_pending(&self) -> Result<Vec<ReviewItem>, ReviewError> {
        self.sweep_expired()?;
        let mut pending: Vec<ReviewItem> = self
            .store
            .list_reviews()?
            .into_iter()
            .filter(|i| i.status == ReviewStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(pending)
    }

    pub fn get(&self, id: &ReviewId) -> Result<Option<ReviewItem>, ReviewError> {
        Ok(self.store.get_review(id)?)
    }

    pub fn stats(&self) -> Result<ReviewStats, ReviewError> {
        self.sweep_expired()?;
        let items = self.store.list_reviews()?;
        let mut stats = ReviewStats {
            total: items.len(),
            ..Default::default()
        };
        for item in &items {
            *stats.by_status.entry(item.status).or_insert(0) += 1;
            *stats.by_priority.entry(item.priority).or_insert(0) += 1;
            if item.status == ReviewStatus::Pending {
                stats.pending += 1;
            }
        }
        Ok(stats)
    }

    // === Policies ===

    /// Expire pending items whose deadline has passed. Runs lazily before
    /// listings and statistics.
    fn sweep_expired(&self) -> Result<(), ReviewError> {
        let now = Utc::now();
        for item in self.store.list_reviews()? {
            if item.status != ReviewStatus::Pending || item.expires_at > now {
                continue;
            }
            // A concurrent decider may have won; that is fine.
            let swept = self.store.update_review(&item.id, &mut |it| {
                if it.status != ReviewStatus::Pending {
                    return Err(it.status.to_string());
                }
                it.status = ReviewStatus::Expired;
                it.updated_at = Utc::now();
                Ok(())
            });
            match swept {
                Ok(_) => info!(id = %item.id, "review expired by deadline sweep"),
                Err(StorageError::Conflict(_)) | Err(StorageError::ReviewNotFound(_)) => {}
                Err(e) => return Err(ReviewError::Storage(e)),
            }
        }
        Ok(())
    }

    /// Expire the oldest low-priority pending items once the pending count
    /// exceeds the configured maximum. Expiry is terminal and inspectable —
    /// items are never silently dropped.
    fn enforce_capacity(&self) -> Result<(), ReviewError> {
        let pending: Vec<ReviewItem> = self
            .store
            .list_reviews()?
            .into_iter()
            .filter(|i| i.status == ReviewStatus::Pending)
            .collect();
        if pending.len() <= self.config.max_pending {
            return Ok(());
        }

        let excess = pending.len() - self.config.max_pending;
        let mut lows: Vec<&ReviewItem> = pending
            .iter()
            .filter(|i| i.priority == Priority::Low)
            .collect();
        lows.sort_by_key(|i| i.created_at);

        for item in lows.into_iter().take(excess) {
            let expired = self.store.update_review(&item.id, &mut |it| {
                if it.status != ReviewStatus::Pending {
                    return Err(it.status.to_string());
                }
                it.status = ReviewStatus::Expired;
                it.updated_at = Utc::now();
                Ok(())
            });
            match expired {
                Ok(_) => info!(id = %item.id, "low-priority review expired by capacity policy"),
                Err(StorageError::Conflict(_)) | Err(StorageError::ReviewNotFound(_)) => {}
                Err(e) => return Err(ReviewError::Storage(e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Severity;
    use crate::storage::MemoryStore;
    use crate::taxonomy::AxiomId;

    fn workflow() -> ReviewWorkflow {
        ReviewWorkflow::new(Arc::new(MemoryStore::new()), Config::default())
    }

    fn workflow_with(config: Config) -> ReviewWorkflow {
        ReviewWorkflow::new(Arc::new(MemoryStore::new()), config)
    }

    fn gap(severity: Severity) -> Gap {
        Gap::new(
            GapType::DomainMisfit,
            severity,
            "test gap",
            SuggestedAction::ManualReview {
                reason: "look".into(),
            },
        )
    }

    fn tension_gap() -> Gap {
        Gap::new(
            GapType::RuleTension,
            Severity::Critical,
            "nesting broken",
            SuggestedAction::AxiomReview {
                axioms: vec![AxiomId::new("A3")],
                reason: "broken".into(),
            },
        )
    }

    // === Scenario: One-way state machine ===

    #[test]
    fn second_transition_fails_with_state_error() {
        let wf = workflow();
        let item = wf.add_gap_only_review(gap(Severity::Medium)).unwrap();

        wf.approve(&item.id, "ada", None).unwrap();
        let err = wf.reject(&item.id, "ada", "changed my mind").unwrap_err();
        assert!(matches!(
            err,
            ReviewError::InvalidState {
                status: ReviewStatus::Approved,
                ..
            }
        ));

        // The first decision stands untouched
        let stored = wf.get(&item.id).unwrap().unwrap();
        assert_eq!(stored.status, ReviewStatus::Approved);
        assert_eq!(
            stored.feedback.as_ref().unwrap().decision,
            ReviewDecision::Approved
        );
    }

    // === Scenario: Rule-tension gaps are queued at least high ===

    #[test]
    fn rule_tension_priority_floor() {
        let wf = workflow();
        let mut low_tension = tension_gap();
        low_tension.severity = Severity::Low;

        let item = wf.add_gap_only_review(low_tension).unwrap();
        assert_eq!(item.kind, ReviewKind::RuleTensionReview);
        assert_eq!(item.priority, Priority::High);

        let critical = wf.add_gap_only_review(tension_gap()).unwrap();
        assert_eq!(critical.priority, Priority::Critical);
    }

    // === Scenario: Pending list is ordered by priority then age ===

    #[test]
    fn list_pending_orders_by_priority_then_created() {
        let wf = workflow();
        let low = wf.add_gap_only_review(gap(Severity::Low)).unwrap();
        let critical = wf.add_gap_only_review(tension_gap()).unwrap();
        let medium_old = wf.add_gap_only_review(gap(Severity::Medium)).unwrap();
        let medium_new = wf.add_gap_only_review(gap(Severity::Medium)).unwrap();

        let pending = wf.list_pending().unwrap();
        let ids: Vec<ReviewId> = pending.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![critical.id, medium_old.id, medium_new.id, low.id]);
    }

    // === Scenario: Capacity policy expires the oldest low items ===

    #[test]
    fn capacity_expires_oldest_low_priority() {
        let wf = workflow_with(Config::default().with_max_pending(3));
        let oldest = wf.add_gap_only_review(gap(Severity::Low)).unwrap();
        let _second = wf.add_gap_only_review(gap(Severity::Low)).unwrap();
        let _third = wf.add_gap_only_review(gap(Severity::Low)).unwrap();
        // Fourth pushes the queue over capacity
        let fourth = wf.add_gap_only_review(gap(Severity::Low)).unwrap();

        let pending = wf.list_pending().unwrap();
        assert_eq!(pending.len(), 3);
        assert!(!pending.iter().any(|i| i.id == oldest.id));
        assert!(pending.iter().any(|i| i.id == fourth.id));

        let expired = wf.get(&oldest.id).unwrap().unwrap();
        assert_eq!(expired.status, ReviewStatus::Expired);
    }

    // === Scenario: Capacity policy never expires higher priorities ===

    #[test]
    fn capacity_spares_non_low_items() {
        let wf = workflow_with(Config::default().with_max_pending(2));
        let a = wf.add_gap_only_review(gap(Severity::High)).unwrap();
        let b = wf.add_gap_only_review(gap(Severity::High)).unwrap();
        let c = wf.add_gap_only_review(gap(Severity::High)).unwrap();

        // Over capacity but nothing is low-priority: everything stays
        let pending = wf.list_pending().unwrap();
        assert_eq!(pending.len(), 3);
        for item in [&a, &b, &c] {
            assert_eq!(
                wf.get(&item.id).unwrap().unwrap().status,
                ReviewStatus::Pending
            );
        }
    }

    // === Scenario: Deadline sweep expires overdue items lazily ===

    #[test]
    fn deadline_sweep_runs_before_listing() {
        let wf = workflow_with(Config::default().with_review_ttl_days(0));
        let item = wf.add_gap_only_review(gap(Severity::Medium)).unwrap();

        // TTL of zero days means the item is already past its deadline
        let pending = wf.list_pending().unwrap();
        assert!(pending.is_empty());
        assert_eq!(
            wf.get(&item.id).unwrap().unwrap().status,
            ReviewStatus::Expired
        );
    }

    // === Scenario: Modify-and-approve replaces the payload ===

    #[test]
    fn modify_and_approve_records_the_edit() {
        use crate::generation::{CandidateGenerator, DomainSpec};
        use crate::taxonomy::{AxiomTable, Stratum};
        use crate::validation::RuleValidator;
        use crate::taxonomy::NameRegistry;

        let axioms = Arc::new(AxiomTable::builtin());
        let generator = CandidateGenerator::new(axioms.clone());
        let validator = RuleValidator::new(axioms, Config::default());

        let source = Gap::new(
            GapType::DomainMisfit,
            Severity::Medium,
            "cluster",
            SuggestedAction::GenerateDomain {
                name_hint: "draft_domain".into(),
                characteristics: vec!["autonomous".into()],
            },
        );
        let artifact = generator.generate(&source).unwrap().unwrap();
        let validation = validator.validate(&artifact, &NameRegistry::seeded());

        let wf = workflow();
        let item = wf
            .add_artifact_review(source, artifact, validation)
            .unwrap();

        let edited = ArtifactPayload::Domain(DomainSpec {
            name: "refined_domain".into(),
            description: "human-refined".into(),
            typical_closure: 0.65,
            typical_scope: 0.45,
            compatible_strata: vec![Stratum::Matter, Stratum::Life],
        });
        let updated = wf
            .modify_and_approve(&item.id, "ada", edited.clone(), Some("tightened".into()))
            .unwrap();

        assert_eq!(updated.status, ReviewStatus::Modified);
        assert_eq!(updated.artifact.as_ref().unwrap().name, "refined_domain");
        assert_eq!(
            updated.feedback.unwrap().modified_payload.unwrap(),
            edited
        );
    }

    // === Scenario: Invalid artifacts queue as critical gap-only items ===

    #[test]
    fn invalid_artifact_becomes_critical_gap_only_item() {
        use crate::generation::CandidateGenerator;
        use crate::taxonomy::{AxiomTable, NameRegistry};
        use crate::validation::RuleValidator;

        let axioms = Arc::new(AxiomTable::builtin());
        let generator = CandidateGenerator::new(axioms.clone());
        let validator = RuleValidator::new(axioms, Config::default());

        let source = Gap::new(
            GapType::DomainMisfit,
            Severity::Low,
            "cluster",
            SuggestedAction::GenerateDomain {
                // Collides with the frozen domain "living"
                name_hint: "living".into(),
                characteristics: vec![],
            },
        );
        let artifact = generator.generate(&source).unwrap().unwrap();
        let validation = validator.validate(&artifact, &NameRegistry::seeded());
        assert!(!validation.valid);

        let wf = workflow();
        let item = wf
            .add_artifact_review(source, artifact, validation)
            .unwrap();
        assert_eq!(item.kind, ReviewKind::GapOnlyReview);
        assert_eq!(item.priority, Priority::Critical);
        assert!(item.artifact.is_some(), "artifact is retained for inspection");
    }
}
